// src/config/loader.rs

//! # Configuration Loader
//!
//! Finds and parses the optional TOML file. Lookup order: an explicit path,
//! then `rpmsg-bind.toml` next to the executable, then built-in defaults.

use crate::config::model::{Config, ConfigError};
use crate::rpmsg_log;
use log::Level;
use std::{fs, path::Path};

/// File looked up next to the executable.
pub const DEFAULT_CONFIG_FILE: &str = "rpmsg-bind.toml";

/// Load and parse the configuration at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    rpmsg_log!(Level::Debug, "config", "Reading config from {}", path.display());
    let txt = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = toml::from_str(&txt)?;
    rpmsg_log!(Level::Debug, "config", "Loaded config from {}", path.display());
    Ok(cfg)
}

/// Resolve the configuration to use.
///
/// An explicit path must exist; the file next to the executable is only
/// read when present.
pub fn locate(explicit: Option<&Path>, exe_dir: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load(path);
    }
    if let Some(dir) = exe_dir {
        let beside = dir.join(DEFAULT_CONFIG_FILE);
        if beside.is_file() {
            return load(&beside);
        }
    }
    Ok(Config::default())
}
