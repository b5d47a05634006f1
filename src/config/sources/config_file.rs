//! File sources: user config directory, working directory, or an explicit path.

use crate::error::ApiError;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};

/// Base name searched for in the working directory, with any supported extension
pub const CONFIG_FILE_STEM: &str = "sfstree";

/// `<config dir>/sfstree/config` as given by the platform's project directories
pub fn user_config_stem() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "sfstree", "sfstree")
        .map(|dirs| dirs.config_dir().join("config"))
}

pub fn add_user_file(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match user_config_stem().as_deref().and_then(Path::to_str) {
        Some(stem) => Ok(builder.add_source(File::with_name(stem).required(false))),
        None => Ok(builder),
    }
}

pub fn add_working_dir_file(
    builder: ConfigBuilder<DefaultState>,
    working_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let stem = working_dir.join(CONFIG_FILE_STEM);
    let stem = stem.to_str().ok_or_else(|| non_utf8(&stem))?;
    Ok(builder.add_source(File::with_name(stem).required(false)))
}

/// The file must exist; its format follows its extension.
pub fn add_explicit_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    Ok(builder.add_source(File::from(path).required(true)))
}

fn non_utf8(path: &Path) -> ConfigError {
    ConfigError::Foreign(Box::new(ApiError::ConfigError(format!(
        "Config path is not valid UTF-8: {}",
        path.display()
    ))))
}
