//! Shared utilities for the voketag workspace
//!
//! Small helpers that every crate needs: tracing setup, XDG paths, atomic
//! file writes and the delayed-retry helper used by the scan client.

pub mod atomic_file;
pub mod network;
pub mod tracing;
pub mod xdg;

pub use atomic_file::*;
pub use network::*;
pub use xdg::*;
