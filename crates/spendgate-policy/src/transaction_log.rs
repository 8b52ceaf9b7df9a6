//! Append-only log of accepted transactions.

use chrono::{DateTime, Duration, Utc};
use spendgate_core::types::Transaction;

/// Length of the rolling spend window.
pub const WINDOW_HOURS: i64 = 24;

/// Insertion-ordered, append-only sequence of accepted transactions.
///
/// Entries are never reordered or removed. Entries that fall out of the
/// rolling window are filtered at query time, not pruned.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a transaction.
    pub fn append(&mut self, tx: Transaction) {
        self.entries.push(tx);
    }

    /// Number of logged transactions, including ones outside the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    /// Sum of amounts created within `[now - 24h, now]`.
    ///
    /// Both bounds are inclusive. Entries stamped after `now` are ignored.
    #[must_use]
    pub fn spent_in_window(&self, now: DateTime<Utc>) -> f64 {
        let window_start = now - Duration::hours(WINDOW_HOURS);

        self.entries
            .iter()
            .filter(|tx| tx.created_at() >= window_start && tx.created_at() <= now)
            .map(Transaction::amount)
            .sum()
    }
}

impl Extend<Transaction> for TransactionLog {
    fn extend<I: IntoIterator<Item = Transaction>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<Transaction> for TransactionLog {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
