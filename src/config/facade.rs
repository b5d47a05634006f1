//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::StoreConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard files and environment, then validate it.
    ///
    /// A relative store root resolves against `working_dir`.
    pub fn load(working_dir: &Path) -> Result<StoreConfig, ApiError> {
        let mut config = MergeService::load(working_dir)?;
        config.resolve_paths(working_dir);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file with environment overlay.
    ///
    /// A relative store root resolves against the file's directory.
    pub fn load_from_file(path: &Path) -> Result<StoreConfig, ApiError> {
        let mut config = MergeService::load_from_file(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> StoreConfig {
        StoreConfig::default()
    }
}
