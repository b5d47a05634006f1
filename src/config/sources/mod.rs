//! Individual configuration sources.

pub mod config_file;
pub mod environment;
