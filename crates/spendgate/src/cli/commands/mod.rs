//! # CLI Command Handlers
//!
//! - [`init`] - Write a default configuration
//! - [`status`] - Show the limit, window spend, and remaining budget
//! - [`config`] - Print the configuration or its path
//! - [`spend`] - Run a governed transaction
//! - [`history`] - List recorded transactions
//! - [`exit_codes`] - Process exit codes
//!
//! Every handler takes a [`ConfigLoader`] so the base directory can be
//! redirected with `--base-dir`. Handlers return their own error enum; `main`
//! maps errors to exit codes and messages.

pub mod config;
pub mod exit_codes;
pub mod history;
pub mod init;
pub mod spend;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use spendgate_core::config::Config;
use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::error::{ConfigError, StoreError};
use spendgate_policy::history::SqliteHistory;

pub use config::{ConfigCommand, ConfigCommandError};
pub use history::{HistoryCommand, HistoryError, HistoryEntry};
pub use init::{InitCommand, InitError};
pub use spend::{SpendCommand, SpendCommandError, SpendOutput};
pub use status::{StatusCommand, StatusError, StatusReport};

/// Builds a loader for `--base-dir`, or for `~/.spendgate` when not given.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if no base directory was given and
/// the home directory cannot be determined.
pub fn loader_for(base_dir: Option<PathBuf>) -> Result<ConfigLoader, ConfigError> {
    base_dir.map_or_else(ConfigLoader::new, |dir| Ok(ConfigLoader::with_base_dir(dir)))
}

/// Loads and validates the configuration, or `None` if it has not been written yet.
fn load_validated(loader: &ConfigLoader) -> Result<Option<Config>, ConfigError> {
    if !loader.exists() {
        return Ok(None);
    }

    let config = loader.load_required()?;
    config.validate()?;
    Ok(Some(config))
}

/// Resolved history database path, or `None` if history is disabled.
fn history_location(
    loader: &ConfigLoader,
    config: &Config,
) -> Result<Option<PathBuf>, ConfigError> {
    if !config.history.enabled {
        return Ok(None);
    }
    loader.history_path(config).map(Some)
}

/// Opens the history database at `path`, creating its directory if needed.
fn open_history(path: &Path) -> Result<Arc<SqliteHistory>, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let history = SqliteHistory::new(path)?;
    tracing::debug!(path = %path.display(), "Opened history database");
    Ok(Arc::new(history))
}
