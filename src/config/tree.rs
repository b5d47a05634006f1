//! Per-tree configuration

use crate::error::ApiError;
use crate::tree::{TreeSettings, DEFAULT_OS_PATH_CEILING, DEFAULT_PATH_SAFETY_MARGIN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_database_name() -> String {
    "master".to_string()
}

fn default_os_path_ceiling() -> usize {
    DEFAULT_OS_PATH_CEILING
}

fn default_path_safety_margin() -> usize {
    DEFAULT_PATH_SAFETY_MARGIN
}

/// One tree mapping a global root path onto a physical directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeConfig {
    pub name: String,

    /// Virtual path of the tree's root item, e.g. `/sitecore/templates`
    pub global_root_path: String,

    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Defaults to `<store root>/<name>`; relative paths resolve against the store root
    #[serde(default)]
    pub physical_root_path: Option<PathBuf>,

    #[serde(default = "default_os_path_ceiling")]
    pub os_path_ceiling: usize,

    /// Room left for the physical root's own absolute path
    #[serde(default = "default_path_safety_margin")]
    pub path_safety_margin: usize,

    /// Overrides `os_path_ceiling - path_safety_margin` when set
    #[serde(default)]
    pub max_relative_path_length: Option<usize>,

    /// 0 means unbounded
    #[serde(default)]
    pub max_item_name_length: usize,
}

impl TreeConfig {
    pub fn new(name: impl Into<String>, global_root_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            global_root_path: global_root_path.into(),
            database_name: default_database_name(),
            physical_root_path: None,
            os_path_ceiling: DEFAULT_OS_PATH_CEILING,
            path_safety_margin: DEFAULT_PATH_SAFETY_MARGIN,
            max_relative_path_length: None,
            max_item_name_length: 0,
        }
    }

    pub fn effective_max_relative_path_length(&self) -> usize {
        self.max_relative_path_length
            .unwrap_or_else(|| self.os_path_ceiling.saturating_sub(self.path_safety_margin))
    }

    pub fn physical_root(&self, store_root: &Path) -> PathBuf {
        match &self.physical_root_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => store_root.join(path),
            None => store_root.join(&self.name),
        }
    }

    pub fn to_settings(&self, store_root: &Path) -> TreeSettings {
        TreeSettings::new(
            &self.name,
            &self.global_root_path,
            &self.database_name,
            self.physical_root(store_root),
        )
        .with_max_relative_path_length(self.effective_max_relative_path_length())
        .with_max_item_name_length(self.max_item_name_length)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::ConfigError("Tree name cannot be empty".to_string()));
        }
        if !self.global_root_path.starts_with('/') {
            return Err(ApiError::ConfigError(format!(
                "Tree '{}': global root path '{}' must start with '/'",
                self.name, self.global_root_path
            )));
        }
        if self.global_root_path.trim_matches('/').is_empty() {
            return Err(ApiError::ConfigError(format!(
                "Tree '{}': global root path must name at least one item",
                self.name
            )));
        }
        if self.database_name.trim().is_empty() {
            return Err(ApiError::ConfigError(format!(
                "Tree '{}': database name cannot be empty",
                self.name
            )));
        }
        if self.effective_max_relative_path_length() == 0 {
            return Err(ApiError::ConfigError(format!(
                "Tree '{}': relative path budget is zero (ceiling {}, margin {})",
                self.name, self.os_path_ceiling, self.path_safety_margin
            )));
        }
        Ok(())
    }
}
