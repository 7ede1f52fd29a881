//! Batch anchoring for the factory console
//!
//! CSV pre-flight validation, the NTAG export handed to tag programmers, a
//! disclosure view over the backend's Merkle tree, and the create/upload/poll
//! workflow that drives a batch to `completed`.

pub mod csv;
pub mod merkle;
pub mod ntag;
pub mod workflow;

pub use csv::{
    parse_csv, validate_csv, validate_csv_with, CsvRow, InvalidCounting, ValidationResult,
};
pub use merkle::{MerkleTreeView, NodePath, Rendering, MAX_LEAVES_FOR_FULL_TREE};
pub use ntag::{ntag_export, ntag_file_name, verification_url};
pub use workflow::{
    AnchorWorkflow, BatchBackend, PollOutcome, StatusLine, WorkflowEvent, WorkflowState,
};
