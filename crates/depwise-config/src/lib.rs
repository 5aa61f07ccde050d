//! Depwise configuration, stored as TOML in `~/.depwise/config.toml`.

pub mod manager;
pub mod types;

pub use manager::{ConfigError, ConfigManager, CONFIG_DIR, CONFIG_FILE};
pub use types::{DefaultPackageManager, DepwiseConfig, CONFIG_VERSION};
