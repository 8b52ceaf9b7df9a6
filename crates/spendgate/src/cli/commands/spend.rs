//! # Spend Command
//!
//! `spendgate spend <AMOUNT> <TARGET> [--format text|json]` runs one
//! transaction through the governor.
//!
//! The governor is built from `config.toml`. When history is enabled, prior
//! transactions are replayed from the history database so the rolling window
//! survives between invocations, and the new transaction is persisted before
//! it is broadcast.
//!
//! ## Exit Codes
//!
//! - `0` - Accepted and broadcast
//! - `1` - Denied by the spend limit
//! - `2` - Any other error, including a broadcast failure after recording

use chrono::{DateTime, Utc};
use serde::Serialize;
use spendgate_core::broadcast::Broadcaster;
use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::error::{ConfigError, GovernorError, StoreError};
use spendgate_core::types::Transaction;
use spendgate_policy::governor::SpendGovernor;

use super::exit_codes::{EXIT_ERROR, EXIT_POLICY_DENIED};
use super::{history_location, load_validated, open_history};
use crate::broadcast::LoggingBroadcaster;
use crate::cli::args::OutputFormat;
use crate::logging::new_correlation_id;

/// Errors that can occur while spending.
#[derive(Debug, thiserror::Error)]
pub enum SpendCommandError {
    /// No configuration file yet.
    #[error("SpendGate is not initialized. Run 'spendgate init' first.")]
    NotInitialized,

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The history database could not be opened or replayed.
    #[error("History error: {0}")]
    History(#[from] StoreError),

    /// The governor rejected or failed the transaction.
    #[error(transparent)]
    Governor(#[from] GovernorError),
}

impl SpendCommandError {
    /// Returns `true` if the spend limit denied the transaction.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Governor(err) if err.is_denied())
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.is_denied() {
            EXIT_POLICY_DENIED
        } else {
            EXIT_ERROR
        }
    }
}

/// Result of an accepted spend.
#[derive(Debug, Clone, Serialize)]
pub struct SpendOutput {
    /// The recorded transaction.
    pub transaction: Transaction,
    /// The configured limit.
    pub daily_limit: f64,
    /// Spend in the window after this transaction.
    pub spent_in_window: f64,
    /// Budget left in the window, never negative.
    pub remaining: f64,
    /// Correlation ID attached to this invocation's log events.
    pub correlation_id: String,
}

/// The `spendgate spend` command handler.
#[derive(Debug, Clone)]
pub struct SpendCommand {
    loader: ConfigLoader,
    /// Amount to spend.
    pub amount: f64,
    /// Spending target.
    pub target: String,
    /// Output format.
    pub format: OutputFormat,
}

impl SpendCommand {
    /// Create a new `SpendCommand`.
    #[must_use]
    pub const fn new(
        loader: ConfigLoader,
        amount: f64,
        target: String,
        format: OutputFormat,
    ) -> Self {
        Self {
            loader,
            amount,
            target,
            format,
        }
    }

    /// Runs the transaction at the current time with the logging broadcaster.
    ///
    /// # Errors
    ///
    /// See [`execute_with`](Self::execute_with).
    pub fn execute(&self) -> Result<SpendOutput, SpendCommandError> {
        self.execute_with(LoggingBroadcaster::new(), Utc::now())
    }

    /// Runs the transaction stamped `now`, delegating to `broadcaster`.
    ///
    /// # Errors
    ///
    /// Returns [`SpendCommandError::NotInitialized`] without a configuration,
    /// [`SpendCommandError::Config`] or [`SpendCommandError::History`] if the
    /// governor cannot be built, and [`SpendCommandError::Governor`] for any
    /// governed failure.
    pub fn execute_with<B: Broadcaster>(
        &self,
        broadcaster: B,
        now: DateTime<Utc>,
    ) -> Result<SpendOutput, SpendCommandError> {
        let correlation_id = new_correlation_id();
        let span = tracing::info_span!("spend", correlation_id = %correlation_id);
        let _entered = span.enter();

        let config = load_validated(&self.loader)?.ok_or(SpendCommandError::NotInitialized)?;

        let mut governor = SpendGovernor::with_broadcaster(config.governor_config()?, broadcaster);
        if let Some(path) = history_location(&self.loader, &config)? {
            governor = governor.with_store(open_history(&path)?)?;
        }

        let transaction = governor.execute_at(self.amount, &self.target, now)?;

        Ok(SpendOutput {
            transaction,
            daily_limit: governor.daily_limit(),
            spent_in_window: governor.spent_in_window(now),
            remaining: governor.remaining_in_window(now),
            correlation_id,
        })
    }

    /// Run the spend command and print the outcome.
    ///
    /// # Errors
    ///
    /// See [`execute_with`](Self::execute_with).
    pub fn run(&self) -> Result<(), SpendCommandError> {
        let output = self.execute()?;
        println!("{}", format_output(&output, self.format));
        Ok(())
    }
}

/// Renders a spend result in the requested format.
#[must_use]
pub fn format_output(output: &SpendOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
        }
        OutputFormat::Text => {
            let tx = &output.transaction;
            format!(
                "Accepted: {} -> {}\n  Created at: {}\n  Spent in window: {} / {}\n  Remaining: {}",
                tx.amount(),
                tx.target(),
                tx.created_at().to_rfc3339(),
                output.spent_in_window,
                output.daily_limit,
                output.remaining,
            )
        }
    }
}
