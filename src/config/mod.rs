//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, then the user and
//! working-directory config files, then `SFS__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;
mod tree;

pub use facade::ConfigLoader;
pub use tree::TreeConfig;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_STORE_ROOT: &str = "serialization";

fn default_store_root() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_ROOT)
}

/// Top-level configuration for a store of trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory under which trees without an explicit physical root live
    #[serde(default = "default_store_root")]
    pub physical_root_path: PathBuf,

    #[serde(default)]
    pub trees: Vec<TreeConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            physical_root_path: default_store_root(),
            trees: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Make a relative store root absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.physical_root_path.is_relative() {
            self.physical_root_path = base.join(&self.physical_root_path);
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let mut names = HashSet::new();
        for tree in &self.trees {
            tree.validate()?;
            if !names.insert(tree.name.to_lowercase()) {
                return Err(ApiError::ConfigError(format!(
                    "Tree name '{}' is configured more than once",
                    tree.name
                )));
            }
        }
        Ok(())
    }
}
