//! Tooling & Integration Layer
//!
//! The `sfstree` command line: argument parsing, command execution against a
//! tree store, and text or JSON rendering of the results.

pub mod cli;
pub mod format;

pub use cli::{load_config, Cli, CliContext, Commands};
