//! MergeService: orchestrates sources, applies merge policy, deserializes to StoreConfig.

use crate::config::sources::{config_file, environment};
use crate::config::StoreConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    /// Precedence: defaults (lowest) -> user file -> working-directory file -> environment (highest).
    pub fn load(working_dir: &Path) -> Result<StoreConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = config_file::add_user_file(builder)?;
        let builder = config_file::add_working_dir_file(builder, working_dir)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<StoreConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = config_file::add_explicit_file(builder, path)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
