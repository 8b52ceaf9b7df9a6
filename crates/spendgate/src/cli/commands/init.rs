//! # Init Command
//!
//! `spendgate init [--force] [--daily-limit <AMOUNT>]` writes
//! `config.toml` into the base directory.
//!
//! Without `--daily-limit` the commented default file is written. With it, the
//! default configuration is serialized with the given limit.

use std::path::PathBuf;

use spendgate_core::config::Config;
use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::error::ConfigError;

/// Errors that can occur during initialization.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A configuration file already exists.
    #[error("SpendGate is already initialized at {0}. Use --force to overwrite.")]
    AlreadyInitialized(PathBuf),

    /// The requested limit is invalid, or the file could not be written.
    #[error("Failed to write config: {0}")]
    ConfigWrite(#[from] ConfigError),
}

/// The `spendgate init` command handler.
#[derive(Debug, Clone)]
pub struct InitCommand {
    loader: ConfigLoader,
    /// Overwrite an existing configuration.
    pub force: bool,
    /// Limit to write instead of the default.
    pub daily_limit: Option<f64>,
}

impl InitCommand {
    /// Create a new `InitCommand`.
    #[must_use]
    pub const fn new(loader: ConfigLoader, force: bool, daily_limit: Option<f64>) -> Self {
        Self {
            loader,
            force,
            daily_limit,
        }
    }

    /// Writes the configuration and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::AlreadyInitialized`] if a configuration exists and
    /// `force` is not set, or [`InitError::ConfigWrite`] if the limit is invalid
    /// or the file cannot be written.
    pub fn execute(&self) -> Result<PathBuf, InitError> {
        let config_path = self.loader.config_path();

        if !self.force && self.loader.exists() {
            return Err(InitError::AlreadyInitialized(config_path));
        }

        match self.daily_limit {
            Some(limit) => {
                let config = Config::builder().daily_limit(limit).build();
                config.validate()?;
                self.loader.save(&config)?;
            }
            None => self.loader.write_default()?,
        }

        tracing::info!(path = %config_path.display(), "Wrote configuration");
        Ok(config_path)
    }

    /// Run the init command and print where the configuration went.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), InitError> {
        let path = self.execute()?;

        println!("SpendGate initialized.");
        println!("  Config: {}", path.display());
        println!();
        println!("Next steps:");
        println!("  spendgate status");
        println!("  spendgate spend <AMOUNT> <TARGET>");
        Ok(())
    }
}
