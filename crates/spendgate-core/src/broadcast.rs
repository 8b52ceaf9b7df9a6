//! The broadcaster collaborator.
//!
//! A [`Broadcaster`] commits an accepted transaction downstream: to a ledger,
//! a payment network, or a signing service. The governor calls it exactly once
//! per accepted transaction, after the transaction has been recorded, and
//! does not care about transport, signing, or retries.
//!
//! # Example
//!
//! ```
//! use spendgate_core::broadcast::{BroadcastError, Broadcaster};
//! use spendgate_core::types::Transaction;
//!
//! struct Rejecting;
//!
//! impl Broadcaster for Rejecting {
//!     fn broadcast(&self, _tx: &Transaction) -> Result<(), BroadcastError> {
//!         Err("payment network unavailable".into())
//!     }
//! }
//!
//! let tx = Transaction::now(1.0, "API_CREDITS").expect("valid");
//! assert!(Rejecting.broadcast(&tx).is_err());
//! ```

use crate::types::Transaction;
use std::sync::Arc;

/// Error raised by a [`Broadcaster`]. Any error type can be boxed into it.
pub type BroadcastError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Commits an accepted transaction downstream.
///
/// Implementations must be `Send + Sync` so a governor can be shared across
/// threads. Cancellation and timeouts are the implementation's concern.
pub trait Broadcaster: Send + Sync {
    /// Broadcasts `tx`.
    ///
    /// # Errors
    ///
    /// Any failure; the governor reports it as a broadcast failure.
    fn broadcast(&self, tx: &Transaction) -> Result<(), BroadcastError>;
}

impl<B: Broadcaster + ?Sized> Broadcaster for &B {
    fn broadcast(&self, tx: &Transaction) -> Result<(), BroadcastError> {
        (**self).broadcast(tx)
    }
}

impl<B: Broadcaster + ?Sized> Broadcaster for Arc<B> {
    fn broadcast(&self, tx: &Transaction) -> Result<(), BroadcastError> {
        (**self).broadcast(tx)
    }
}

impl<B: Broadcaster + ?Sized> Broadcaster for Box<B> {
    fn broadcast(&self, tx: &Transaction) -> Result<(), BroadcastError> {
        (**self).broadcast(tx)
    }
}

/// Broadcaster that accepts every transaction and does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast(&self, _tx: &Transaction) -> Result<(), BroadcastError> {
        Ok(())
    }
}
