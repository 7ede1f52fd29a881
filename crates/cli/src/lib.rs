//! `voketag` command-line console
//!
//! One binary for the three front ends: factory operators (CSV pre-flight,
//! batch anchoring, NTAG export), consumers (scan, report, verify) and
//! administrators (dashboard, users, audit, god mode).

pub mod cli;
pub mod commands;
pub mod context;
pub mod output;

pub use cli::Cli;
pub use commands::Commands;
pub use context::Context;
