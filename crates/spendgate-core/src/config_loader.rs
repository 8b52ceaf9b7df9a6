//! Configuration loader for `SpendGate`.
//!
//! Reads and writes `config.toml` under the `SpendGate` base directory
//! (`~/.spendgate` by default) and resolves paths named in the configuration.
//!
//! # Examples
//!
//! ```no_run
//! use spendgate_core::config_loader::ConfigLoader;
//!
//! let loader = ConfigLoader::new().expect("failed to create loader");
//! if !loader.exists() {
//!     loader.write_default().expect("failed to write default config");
//! }
//! let config = loader.load().expect("failed to load config");
//! println!("daily limit: {}", config.governor.daily_limit);
//! ```

use crate::config::Config;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// The configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// The base directory name within the home directory.
const BASE_DIR_NAME: &str = ".spendgate";

/// Reads and writes the `SpendGate` configuration file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for `SpendGate` files (default: ~/.spendgate).
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader rooted at `~/.spendgate`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] if the home directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let base_dir = default_base_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a loader rooted at a custom base directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use spendgate_core::config_loader::ConfigLoader;
    /// use std::path::PathBuf;
    ///
    /// let loader = ConfigLoader::with_base_dir(PathBuf::from("/srv/spendgate"));
    /// assert_eq!(loader.config_path(), PathBuf::from("/srv/spendgate/config.toml"));
    /// ```
    #[must_use]
    pub const fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Path to `config.toml`.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// The base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Loads the configuration, falling back to defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseFailed`] if the file contains invalid TOML.
    /// Returns [`ConfigError::Io`] if the file cannot be read.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(Config::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Loads the configuration, failing if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if the configuration file doesn't exist,
    /// otherwise the same errors as [`load`](Self::load).
    pub fn load_required(&self) -> Result<Config, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Err(ConfigError::file_not_found(
                config_path.display().to_string(),
            ));
        }

        Self::load_from_path(&config_path)
    }

    /// Serializes `config` to `config.toml`, creating the base directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure and
    /// [`ConfigError::ParseFailed`] if serialization fails.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        self.ensure_base_dir()?;

        let config_path = self.config_path();

        let toml_str = toml::to_string_pretty(config).map_err(|e| {
            ConfigError::parse_failed(format!("failed to serialize configuration: {e}"))
        })?;

        fs::write(&config_path, toml_str).map_err(|e| {
            ConfigError::io(
                format!("failed to write configuration to {}", config_path.display()),
                e,
            )
        })
    }

    /// Writes the commented default configuration from [`Config::default_toml`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file or base directory cannot be written.
    pub fn write_default(&self) -> Result<(), ConfigError> {
        self.ensure_base_dir()?;

        let config_path = self.config_path();

        fs::write(&config_path, Config::default_toml()).map_err(|e| {
            ConfigError::io(
                format!(
                    "failed to write default configuration to {}",
                    config_path.display()
                ),
                e,
            )
        })
    }

    /// Returns `true` if `config.toml` exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.config_path().exists()
    }

    /// Resolves a path named in the configuration.
    ///
    /// `~` is expanded to the home directory; any other relative path is
    /// joined onto the base directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] if `~` cannot be expanded.
    pub fn resolve_path(&self, path: &str) -> Result<PathBuf, ConfigError> {
        let expanded = expand_path(path)?;
        if expanded.is_absolute() {
            Ok(expanded)
        } else {
            Ok(self.base_dir.join(expanded))
        }
    }

    /// Resolved location of the history database for `config`.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_path`](Self::resolve_path).
    pub fn history_path(&self, config: &Config) -> Result<PathBuf, ConfigError> {
        self.resolve_path(&config.history.path)
    }

    /// Creates the base directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory cannot be created.
    pub fn ensure_base_dir(&self) -> Result<(), ConfigError> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).map_err(|e| {
                ConfigError::io(
                    format!(
                        "failed to create base directory {}",
                        self.base_dir.display()
                    ),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(format!("failed to read {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| {
            ConfigError::parse_failed(format!("invalid TOML in {}: {e}", path.display()))
        })
    }
}

/// Expands a leading `~` to the home directory.
///
/// Any other path is returned unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if the path starts with `~` and
/// the home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use spendgate_core::config_loader::expand_path;
///
/// let path = expand_path("/etc/spendgate/config.toml").expect("absolute path");
/// assert_eq!(path.to_string_lossy(), "/etc/spendgate/config.toml");
/// ```
pub fn expand_path(path: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(ConfigError::no_home_directory)?;
        Ok(home.join(rest))
    } else if path == "~" {
        dirs::home_dir().ok_or_else(ConfigError::no_home_directory)
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Returns `~/.spendgate`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if the home directory cannot be determined.
pub fn default_base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(ConfigError::no_home_directory)?;
    Ok(home.join(BASE_DIR_NAME))
}
