use crate::types::DepwiseConfig;
use depwise_fs::{FileSystem, NativeFileSystem};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the home directory holding depwise state.
pub const CONFIG_DIR: &str = ".depwise";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Manager for the depwise config file.
///
/// File access goes through a [`NativeFileSystem`] scoped to the config
/// directory, so the manager cannot touch anything outside it.
pub struct ConfigManager {
    fs: NativeFileSystem,
    config_path: PathBuf,
    config: DepwiseConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.depwise/config.toml)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from the default location
    pub async fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path).await
    }

    /// Load config from a specific path
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path = &std::path::absolute(path)?;
        let config_dir = parent_dir(path);
        if !tokio::fs::try_exists(config_dir).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let fs = NativeFileSystem::new(config_dir)?;

        if !fs.exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs.read_to_string(path).await?;
        let config: DepwiseConfig = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded config");

        Ok(Self {
            fs,
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// The config at `path`, or the defaults when no file exists there.
    ///
    /// Nothing is written. A file that exists but does not parse is still an
    /// error.
    pub async fn load_or_default(path: &Path) -> Result<DepwiseConfig, ConfigError> {
        match Self::load_from(path).await {
            Ok(manager) => Ok(manager.config),
            Err(ConfigError::ConfigNotFound(_)) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(DepwiseConfig::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Initialize a new config file at the default location
    pub async fn init() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path).await
    }

    /// Write a default config at `path`, creating its directory.
    ///
    /// An existing file is overwritten.
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        let path = &std::path::absolute(path)?;
        let config_dir = parent_dir(path);
        tokio::fs::create_dir_all(config_dir).await?;

        let manager = Self {
            fs: NativeFileSystem::new(config_dir)?,
            config_path: path.to_path_buf(),
            config: DepwiseConfig::default(),
        };
        manager.save().await?;
        tracing::info!(path = %path.display(), "Initialized config");

        Ok(manager)
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;

        let temp_path = self.config_path.with_extension("toml.tmp");
        self.fs.write(&temp_path, &toml_str).await?;
        set_config_permissions(&temp_path)?;
        self.fs.rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    /// Where this manager reads and writes.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &DepwiseConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut DepwiseConfig {
        &mut self.config
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Restrict the config file to its owner (Unix only)
#[cfg(unix)]
fn set_config_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_config_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DefaultPackageManager;
    use depwise_core::Severity;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_DIR).join(CONFIG_FILE);

        let manager = ConfigManager::init_at(&config_path).await.unwrap();
        assert_eq!(manager.config().version, "1.0");
        assert!(config_path.exists());
        assert!(!config_path.with_extension("toml.tmp").exists());

        let loaded = ConfigManager::load_from(&config_path).await.unwrap();
        assert_eq!(loaded.config(), &DepwiseConfig::default());
    }

    #[tokio::test]
    async fn test_save_persists_changes() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let mut manager = ConfigManager::init_at(&config_path).await.unwrap();
        manager.config_mut().default_package_manager = DefaultPackageManager::Bun;
        manager.config_mut().blocked_licenses = vec!["AGPL-3.0".to_string()];
        manager.config_mut().severity_threshold = Severity::Critical;
        manager.save().await.unwrap();

        let loaded = ConfigManager::load_from(&config_path).await.unwrap();
        assert_eq!(loaded.config().default_package_manager, DefaultPackageManager::Bun);
        assert_eq!(loaded.config().blocked_licenses, vec!["AGPL-3.0"]);
        assert_eq!(loaded.config().severity_threshold, Severity::Critical);
    }

    #[tokio::test]
    async fn test_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nowhere").join(CONFIG_FILE);

        let result = ConfigManager::load_from(&config_path).await;
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));

        let config = ConfigManager::load_or_default(&config_path).await.unwrap();
        assert_eq!(config, DepwiseConfig::default());
        assert!(!config_path.exists());
    }

    #[tokio::test]
    async fn test_relative_path_with_directory() {
        let temp_dir = TempDir::new_in(".").unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);
        assert!(config_path.is_relative());

        let mut manager = ConfigManager::init_at(&config_path).await.unwrap();
        assert!(config_path.exists());
        assert!(manager.path().is_absolute());

        manager.config_mut().offline_mode = true;
        manager.save().await.unwrap();

        let config = ConfigManager::load_or_default(&config_path).await.unwrap();
        assert!(config.offline_mode);
    }

    #[tokio::test]
    async fn test_malformed_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "offline_mode = \"sometimes\"").unwrap();

        let result = ConfigManager::load_or_default(&config_path).await;
        assert!(matches!(result, Err(ConfigError::TomlDe(_))));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);
        ConfigManager::init_at(&config_path).await.unwrap();

        let mode = std::fs::metadata(&config_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
