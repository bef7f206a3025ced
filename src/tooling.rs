//! Command-line tooling
//!
//! The `switchyard` CLI and the terminal formatting it uses.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
