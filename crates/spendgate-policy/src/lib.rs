//! # spendgate-policy
//!
//! Rolling-window spend enforcement for `SpendGate`.
//!
//! ## Modules
//!
//! - [`governor`] - [`SpendGovernor`], the accept/reject gate
//! - [`transaction_log`] - The append-only [`TransactionLog`]
//! - [`history`] - The [`HistoryStore`] persistence collaborator and its
//!   `SQLite` implementation
//!
//! ## Example
//!
//! ```
//! use spendgate_policy::{GovernorError, SpendGovernor};
//!
//! let governor = SpendGovernor::new(5.0).expect("positive limit");
//!
//! let err = governor.execute(10.0, "API_CREDITS").unwrap_err();
//! assert!(matches!(err, GovernorError::LimitExceeded { .. }));
//! assert_eq!(governor.len(), 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod governor;
pub mod history;
pub mod transaction_log;

pub use governor::{SpendGovernor, LIMIT_TOLERANCE, POLICY_TARGET};
pub use history::{HistoryRecord, HistoryStore, SqliteHistory};
pub use transaction_log::{TransactionLog, WINDOW_HOURS};

// Re-exported so hosts can depend on this crate alone
pub use spendgate_core::{
    BroadcastError, Broadcaster, EnforcementMode, GovernorConfig, GovernorError,
    NoopBroadcaster, Transaction, ValidationError,
};
