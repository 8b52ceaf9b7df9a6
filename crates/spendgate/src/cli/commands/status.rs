//! # Status Command
//!
//! `spendgate status` shows the configured limit and how much of it the
//! current 24h window has used.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use spendgate_core::broadcast::NoopBroadcaster;
use spendgate_core::config::EnforcementMode;
use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::error::{ConfigError, StoreError};
use spendgate_policy::governor::SpendGovernor;

use super::{history_location, load_validated, open_history};

/// Errors that can occur while reporting status.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// No configuration file yet.
    #[error("SpendGate is not initialized. Run 'spendgate init' first.")]
    NotInitialized,

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The history database could not be read.
    #[error("History error: {0}")]
    History(#[from] StoreError),
}

/// Snapshot of the governor state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Configuration file in use.
    pub config_path: PathBuf,
    /// Configured limit.
    pub daily_limit: f64,
    /// Enforcement mode.
    pub enforcement: EnforcementMode,
    /// History database, if history is enabled.
    pub history_path: Option<PathBuf>,
    /// Number of recorded transactions.
    pub recorded: usize,
    /// Spend in the current window.
    pub spent_in_window: f64,
    /// Budget left in the current window.
    pub remaining: f64,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SpendGate Status")?;
        writeln!(f, "================")?;
        writeln!(f, "Config: {}", self.config_path.display())?;
        writeln!(f, "Daily limit: {}", self.daily_limit)?;
        writeln!(f, "Enforcement: {}", self.enforcement)?;
        match &self.history_path {
            Some(path) => writeln!(f, "History: {}", path.display())?,
            None => writeln!(f, "History: disabled")?,
        }
        writeln!(f, "Recorded transactions: {}", self.recorded)?;
        writeln!(f, "Spent (last 24h): {}", self.spent_in_window)?;
        write!(f, "Remaining: {}", self.remaining)
    }
}

/// The `spendgate status` command handler.
#[derive(Debug, Clone)]
pub struct StatusCommand {
    loader: ConfigLoader,
}

impl StatusCommand {
    /// Create a new `StatusCommand`.
    #[must_use]
    pub const fn new(loader: ConfigLoader) -> Self {
        Self { loader }
    }

    /// Builds the status report for the window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::NotInitialized`] without a configuration,
    /// [`StatusError::Config`] if it is invalid, or [`StatusError::History`]
    /// if the history database cannot be read.
    pub fn collect(&self, now: DateTime<Utc>) -> Result<StatusReport, StatusError> {
        let config = load_validated(&self.loader)?.ok_or(StatusError::NotInitialized)?;

        let mut governor =
            SpendGovernor::with_broadcaster(config.governor_config()?, NoopBroadcaster);

        let history_path = history_location(&self.loader, &config)?;
        // A missing database means nothing recorded yet; status never creates it
        if let Some(path) = history_path.as_ref().filter(|p| p.exists()) {
            governor = governor.with_store(open_history(path)?)?;
        }

        Ok(StatusReport {
            config_path: self.loader.config_path(),
            daily_limit: governor.daily_limit(),
            enforcement: governor.enforcement(),
            history_path,
            recorded: governor.len(),
            spent_in_window: governor.spent_in_window(now),
            remaining: governor.remaining_in_window(now),
        })
    }

    /// Run the status command.
    ///
    /// # Errors
    ///
    /// See [`collect`](Self::collect).
    pub fn run(&self) -> Result<(), StatusError> {
        println!("{}", self.collect(Utc::now())?);
        Ok(())
    }
}
