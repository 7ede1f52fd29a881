//! Network-related utilities.
//!
//! - **`retry`**: retry of async operations with a fixed pause between
//!   attempts.

pub mod retry;

pub use retry::{retry_async, RetryConfig};
