//! Core value types for the `SpendGate` spend governor.
//!
//! - [`Transaction`] - A validated, immutable spend request
//!
//! # Examples
//!
//! ```
//! use spendgate_core::types::Transaction;
//!
//! let tx = Transaction::now(3.0, "  API_CREDITS ").expect("valid transaction");
//! assert_eq!(tx.target(), "API_CREDITS");
//! assert!((tx.amount() - 3.0).abs() < f64::EPSILON);
//! ```

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A validated spend request.
///
/// A `Transaction` can only be built through [`Transaction::new`] or
/// [`Transaction::now`], so every instance satisfies:
///
/// - `amount` is finite and strictly positive
/// - `target` is non-empty and carries no surrounding whitespace
///
/// Transactions have no identity beyond their fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    amount: f64,
    target: String,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a transaction stamped with `created_at`.
    ///
    /// The amount is checked before the target.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAmount`] if `amount` is zero, negative,
    /// NaN or infinite, and [`ValidationError::EmptyTarget`] if `target` is empty
    /// after trimming.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use spendgate_core::error::ValidationError;
    /// use spendgate_core::types::Transaction;
    ///
    /// let err = Transaction::new(0.0, "API_CREDITS", Utc::now()).unwrap_err();
    /// assert!(matches!(err, ValidationError::InvalidAmount { .. }));
    ///
    /// let err = Transaction::new(1.0, "   ", Utc::now()).unwrap_err();
    /// assert_eq!(err, ValidationError::EmptyTarget);
    /// ```
    pub fn new(
        amount: f64,
        target: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        // NaN fails `> 0.0`, infinities fail `is_finite`
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::invalid_amount(amount));
        }

        let target = target.trim();
        if target.is_empty() {
            return Err(ValidationError::EmptyTarget);
        }

        Ok(Self {
            amount,
            target: target.to_string(),
            created_at,
        })
    }

    /// Builds a transaction stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// Same as [`Transaction::new`].
    pub fn now(amount: f64, target: &str) -> Result<Self, ValidationError> {
        Self::new(amount, target, Utc::now())
    }

    /// The amount to spend, in the governor's unit of account.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        self.amount
    }

    /// The trimmed spending target, e.g. `API_CREDITS`.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// When the transaction was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} at {}",
            self.amount,
            self.target,
            self.created_at.to_rfc3339()
        )
    }
}
