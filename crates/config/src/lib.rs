//! Configuration for the voketag clients
//!
//! Endpoints, polling and HTTP settings, merged from defaults, the JSON config
//! file, environment variables and CLI flags.

pub mod config;
pub mod loader;

pub use config::*;
pub use loader::*;
