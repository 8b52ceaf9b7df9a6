//! # Config Command
//!
//! - `spendgate config` - Print the configuration as TOML
//! - `spendgate config path` - Print the configuration file path

use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::error::ConfigError;

use crate::cli::args::ConfigAction;

/// Errors that can occur while showing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigCommandError {
    /// No configuration file yet.
    #[error("SpendGate is not initialized. Run 'spendgate init' first.")]
    NotInitialized,

    /// Failed to load or serialize configuration.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
}

/// The `spendgate config` command handler.
#[derive(Debug, Clone)]
pub struct ConfigCommand {
    loader: ConfigLoader,
    /// What to print; the configuration itself when `None`.
    pub action: Option<ConfigAction>,
}

impl ConfigCommand {
    /// Create a new `ConfigCommand`.
    #[must_use]
    pub const fn new(loader: ConfigLoader, action: Option<ConfigAction>) -> Self {
        Self { loader, action }
    }

    /// Renders the text this command prints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigCommandError::NotInitialized`] when showing a
    /// configuration that does not exist, or [`ConfigCommandError::Load`] if
    /// it cannot be read or serialized.
    pub fn render(&self) -> Result<String, ConfigCommandError> {
        match self.action {
            Some(ConfigAction::Path) => Ok(self.loader.config_path().display().to_string()),
            None => {
                if !self.loader.exists() {
                    return Err(ConfigCommandError::NotInitialized);
                }
                let config = self.loader.load_required()?;
                toml::to_string_pretty(&config).map_err(|e| {
                    ConfigError::parse_failed(format!("failed to serialize configuration: {e}"))
                        .into()
                })
            }
        }
    }

    /// Run the config command.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn run(&self) -> Result<(), ConfigCommandError> {
        println!("{}", self.render()?.trim_end());
        Ok(())
    }
}
