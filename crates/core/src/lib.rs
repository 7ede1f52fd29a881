//! Core domain types, errors, and constants for the `voketag` clients.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate.
//! - **`types`**: wire types for batches, anchors, Merkle trees, scans and the
//!   admin console.
//! - **`constants`**: default endpoints, header names and polling limits.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
