//! Public API for configuration

pub mod loader;
pub mod model;

pub use loader::{load, locate, DEFAULT_CONFIG_FILE};
pub use model::{BindConfig, BusConfig, Config, ConfigError, LoggingConfig};
