//! Broadcaster used by the `spendgate` binary.
//!
//! The binary has no payment network of its own, so accepted transactions are
//! reported as structured log events and otherwise left to the host.

use spendgate_core::broadcast::{BroadcastError, Broadcaster};
use spendgate_core::types::Transaction;

/// Broadcaster that emits one `info` event per accepted transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBroadcaster;

impl LoggingBroadcaster {
    /// Creates a new `LoggingBroadcaster`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Broadcaster for LoggingBroadcaster {
    fn broadcast(&self, tx: &Transaction) -> Result<(), BroadcastError> {
        tracing::info!(
            target: "spendgate::broadcast",
            amount = tx.amount(),
            spend_target = tx.target(),
            created_at = %tx.created_at().to_rfc3339(),
            "Broadcasting transaction"
        );
        Ok(())
    }
}
