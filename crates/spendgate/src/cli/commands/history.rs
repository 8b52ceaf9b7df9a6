//! # History Command
//!
//! `spendgate history [--limit N] [--format text|json]` lists the most recent
//! recorded transactions, newest first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::error::{ConfigError, StoreError};
use spendgate_policy::history::HistoryRecord;

use super::{history_location, load_validated, open_history};
use crate::cli::args::OutputFormat;

/// Errors that can occur while listing history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// No configuration file yet.
    #[error("SpendGate is not initialized. Run 'spendgate init' first.")]
    NotInitialized,

    /// History is turned off in the configuration.
    #[error("History is disabled. Set history.enabled = true in config.toml.")]
    Disabled,

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The history database could not be read.
    #[error("History error: {0}")]
    Store(#[from] StoreError),
}

/// One listed transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Row id.
    pub id: i64,
    /// Amount spent.
    pub amount: f64,
    /// Spending target.
    pub target: String,
    /// When the transaction was accepted.
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            amount: record.transaction.amount(),
            target: record.transaction.target().to_string(),
            created_at: record.transaction.created_at(),
        }
    }
}

/// The `spendgate history` command handler.
#[derive(Debug, Clone)]
pub struct HistoryCommand {
    loader: ConfigLoader,
    /// Maximum number of entries.
    pub limit: usize,
    /// Output format.
    pub format: OutputFormat,
}

impl HistoryCommand {
    /// Create a new `HistoryCommand`.
    #[must_use]
    pub const fn new(loader: ConfigLoader, limit: usize, format: OutputFormat) -> Self {
        Self {
            loader,
            limit,
            format,
        }
    }

    /// Reads up to `limit` entries, newest first.
    ///
    /// A history database that has not been created yet lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotInitialized`] without a configuration,
    /// [`HistoryError::Disabled`] if history is off, or a config or store
    /// error if either cannot be read.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let config = load_validated(&self.loader)?.ok_or(HistoryError::NotInitialized)?;
        let path = history_location(&self.loader, &config)?.ok_or(HistoryError::Disabled)?;

        if !path.exists() {
            return Ok(Vec::new());
        }

        let history = open_history(&path)?;
        Ok(history
            .recent(self.limit)?
            .into_iter()
            .map(HistoryEntry::from)
            .collect())
    }

    /// Run the history command.
    ///
    /// # Errors
    ///
    /// See [`entries`](Self::entries).
    pub fn run(&self) -> Result<(), HistoryError> {
        let entries = self.entries()?;
        println!("{}", format_entries(&entries, self.format));
        Ok(())
    }
}

/// Renders history entries in the requested format.
#[must_use]
pub fn format_entries(entries: &[HistoryEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(entries)
            .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
        OutputFormat::Text => {
            if entries.is_empty() {
                return "No transactions recorded.".to_string();
            }
            entries
                .iter()
                .map(|e| {
                    format!(
                        "#{:<5} {:>12} -> {} at {}",
                        e.id,
                        e.amount,
                        e.target,
                        e.created_at.to_rfc3339()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
