//! The spend-limit governor.
//!
//! [`SpendGovernor`] gates every transaction request against a rolling 24-hour
//! spend policy before it reaches the [`Broadcaster`].
//!
//! # Execution Order
//!
//! Each [`execute`](SpendGovernor::execute) call runs these steps and stops at
//! the first failure:
//!
//! 1. **Validate** - Build a [`Transaction`]. Nothing is recorded on failure.
//! 2. **Check** - Compare against the daily limit. Nothing is recorded on denial.
//! 3. **Record** - Persist to the history store (if attached), then append to the log.
//! 4. **Broadcast** - Hand the recorded transaction to the broadcaster exactly once.
//!
//! A broadcast failure leaves the transaction recorded: callers must treat it
//! as "recorded locally, not confirmed downstream".
//!
//! # Thread Safety
//!
//! [`SpendGovernor`] is `Send + Sync`. Steps 2 and 3 run under one lock, so
//! concurrent calls cannot both pass a cumulative check against the same
//! window total. With a history store attached they also run inside
//! [`HistoryStore::append_exclusive`]: rows other processes wrote since the
//! last sync are merged into the log before the check, and the store's write
//! lock is held until the new row is in. The broadcaster runs after both locks
//! are released.
//!
//! # Example
//!
//! ```
//! use spendgate_policy::governor::SpendGovernor;
//!
//! let governor = SpendGovernor::new(5.0).expect("positive limit");
//!
//! assert!(governor.execute(10.0, "API_CREDITS").is_err());
//! assert!(governor.is_empty());
//!
//! let tx = governor.execute(3.0, "API_CREDITS").expect("within limit");
//! assert_eq!(tx.target(), "API_CREDITS");
//! assert!((governor.spent_last_24h() - 3.0).abs() < f64::EPSILON);
//! ```

use crate::history::HistoryStore;
use crate::transaction_log::TransactionLog;
use chrono::{DateTime, Utc};
use spendgate_core::broadcast::{Broadcaster, NoopBroadcaster};
use spendgate_core::config::{EnforcementMode, GovernorConfig};
use spendgate_core::error::{ConfigError, GovernorError, StoreError};
use spendgate_core::types::Transaction;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Tracing target for limit denials.
pub const POLICY_TARGET: &str = "spendgate::policy";

/// Relative slack for cumulative checks, absorbing binary rounding in window sums.
///
/// Without it, `0.1 + 0.2` would overrun a `0.3` limit.
pub const LIMIT_TOLERANCE: f64 = 1e-9;

/// Validates transactions, tracks spend, and enforces the daily limit.
pub struct SpendGovernor<B = NoopBroadcaster> {
    config: GovernorConfig,
    log: Mutex<TransactionLog>,
    broadcaster: B,
    store: Option<AttachedStore>,
}

/// A history store plus how many of its rows the log already mirrors.
struct AttachedStore {
    store: Arc<dyn HistoryStore>,
    // Only touched while the log lock is held
    synced: AtomicUsize,
}

impl<B> std::fmt::Debug for SpendGovernor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpendGovernor")
            .field("config", &self.config)
            .field("logged", &self.lock_log().len())
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl SpendGovernor<NoopBroadcaster> {
    /// Creates a per-transaction governor with an empty log and a no-op broadcaster.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `daily_limit` is not a positive,
    /// finite number.
    pub fn new(daily_limit: f64) -> Result<Self, ConfigError> {
        Ok(Self::with_broadcaster(
            GovernorConfig::new(daily_limit)?,
            NoopBroadcaster,
        ))
    }
}

impl<B: Broadcaster> SpendGovernor<B> {
    /// Creates a governor that delegates accepted transactions to `broadcaster`.
    #[must_use]
    pub fn with_broadcaster(config: GovernorConfig, broadcaster: B) -> Self {
        Self {
            config,
            log: Mutex::new(TransactionLog::new()),
            broadcaster,
            store: None,
        }
    }

    /// Attaches a history store and replays its transactions into the log.
    ///
    /// Replayed transactions keep their stored order and count toward the
    /// window like any other entry. From now on every accepted transaction is
    /// persisted before it is logged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the stored history cannot be loaded.
    pub fn with_store(mut self, store: Arc<dyn HistoryStore>) -> Result<Self, StoreError> {
        let stored = store.load()?;
        tracing::debug!(replayed = stored.len(), "Loaded transaction history");

        let synced = AtomicUsize::new(stored.len());
        self.log
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(stored);
        self.store = Some(AttachedStore { store, synced });
        Ok(self)
    }

    /// Validates, checks, records, and broadcasts a transaction stamped now.
    ///
    /// # Errors
    ///
    /// See [`execute_at`](Self::execute_at).
    pub fn execute(&self, amount: f64, target: &str) -> Result<Transaction, GovernorError> {
        self.execute_at(amount, target, Utc::now())
    }

    /// Validates, checks, records, and broadcasts a transaction stamped `now`.
    ///
    /// Returns the recorded transaction.
    ///
    /// # Errors
    ///
    /// In the order they are checked:
    ///
    /// - [`GovernorError::Validation`] - Bad amount or empty target. Nothing recorded.
    /// - [`GovernorError::LimitExceeded`] - Policy denial. Nothing recorded.
    /// - [`GovernorError::Store`] - The history store failed. Nothing recorded.
    /// - [`GovernorError::BroadcastFailure`] - The transaction **is** recorded.
    pub fn execute_at(
        &self,
        amount: f64,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, GovernorError> {
        let tx = Transaction::new(amount, target, now)?;

        {
            let mut log = self.lock_log();

            match &self.store {
                None => self.admit(&log, &tx, now)?,
                Some(attached) => {
                    let known = attached.synced.load(Ordering::Relaxed);
                    attached
                        .store
                        .append_exclusive(&tx, known, &mut |newer| {
                            if !newer.is_empty() {
                                tracing::debug!(
                                    merged = newer.len(),
                                    "Merged transactions written by other processes"
                                );
                            }
                            attached.synced.fetch_add(newer.len(), Ordering::Relaxed);
                            log.extend(newer);
                            self.admit(&log, &tx, now)
                        })
                        .inspect_err(|e| {
                            if let GovernorError::Store(inner) = e {
                                tracing::error!(
                                    error = %inner,
                                    spend_target = tx.target(),
                                    "Failed to persist transaction"
                                );
                            }
                        })?;
                    attached.synced.fetch_add(1, Ordering::Relaxed);
                }
            }

            log.append(tx.clone());
        }

        tracing::debug!(
            amount = tx.amount(),
            spend_target = tx.target(),
            "Transaction recorded"
        );

        self.broadcaster.broadcast(&tx).map_err(|source| {
            tracing::error!(
                error = %source,
                amount = tx.amount(),
                spend_target = tx.target(),
                "Broadcast failed; transaction remains recorded"
            );
            GovernorError::BroadcastFailure { source }
        })?;

        Ok(tx)
    }

    /// Sum of amounts recorded within `[now - 24h, now]`.
    #[must_use]
    pub fn spent_in_window(&self, now: DateTime<Utc>) -> f64 {
        self.lock_log().spent_in_window(now)
    }

    /// Sum of amounts recorded in the 24 hours up to the current time.
    #[must_use]
    pub fn spent_last_24h(&self) -> f64 {
        self.spent_in_window(Utc::now())
    }

    /// Budget left in the window ending at `now`, never negative.
    #[must_use]
    pub fn remaining_in_window(&self, now: DateTime<Utc>) -> f64 {
        (self.config.daily_limit() - self.spent_in_window(now)).max(0.0)
    }

    /// The configured limit.
    #[must_use]
    pub const fn daily_limit(&self) -> f64 {
        self.config.daily_limit()
    }

    /// The full configuration.
    #[must_use]
    pub const fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// The configured enforcement mode.
    #[must_use]
    pub const fn enforcement(&self) -> EnforcementMode {
        self.config.enforcement()
    }

    /// Number of recorded transactions, including ones outside the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_log().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_log().is_empty()
    }

    /// Snapshot of the log in insertion order.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock_log().iter().cloned().collect()
    }

    /// Checks `tx` against the window ending at `now`, logging a denial.
    fn admit(
        &self,
        log: &TransactionLog,
        tx: &Transaction,
        now: DateTime<Utc>,
    ) -> Result<(), GovernorError> {
        let window_total = log.spent_in_window(now);

        self.check_limit(tx.amount(), window_total).inspect_err(|_| {
            tracing::warn!(
                target: POLICY_TARGET,
                event_type = "policy_denial",
                amount = tx.amount(),
                spend_target = tx.target(),
                limit = self.config.daily_limit(),
                window_total,
                mode = %self.config.enforcement(),
                "Transaction denied: daily limit exceeded"
            );
        })
    }

    fn check_limit(&self, amount: f64, window_total: f64) -> Result<(), GovernorError> {
        let limit = self.config.daily_limit();
        let mode = self.config.enforcement();

        let exceeded = match mode {
            EnforcementMode::PerTransaction => amount > limit,
            EnforcementMode::Cumulative => {
                window_total + amount > limit + limit * LIMIT_TOLERANCE
            }
        };

        if exceeded {
            return Err(GovernorError::limit_exceeded(
                amount,
                limit,
                window_total,
                mode,
            ));
        }

        Ok(())
    }
}

impl<B> SpendGovernor<B> {
    fn lock_log(&self) -> MutexGuard<'_, TransactionLog> {
        // The log is append-only, so a panic elsewhere cannot leave it half-written.
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
