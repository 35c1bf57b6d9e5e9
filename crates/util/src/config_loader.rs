use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

use crate::BoundaryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Loads a JSON boundary config. Missing fields fall back to their defaults.
pub fn load_config(path: &Path) -> Result<BoundaryConfig, ConfigError> {
    let config_str = read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BoundaryConfig =
        serde_json::from_str(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}
