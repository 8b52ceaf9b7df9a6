//! Error types for the `SpendGate` spend governor.
//!
//! Errors are organized by where they arise:
//!
//! - [`ValidationError`] - A proposed transaction violates its invariants
//! - [`ConfigError`] - Governor or file configuration is invalid
//! - [`StoreError`] - The transaction history store failed
//! - [`GovernorError`] - Failure of a governed `execute` call
//! - [`SpendGateError`] - Top-level error that wraps all error types
//!
//! # Caller Semantics
//!
//! [`GovernorError::Validation`] and [`GovernorError::LimitExceeded`] mean the
//! transaction never happened. [`GovernorError::BroadcastFailure`] means the
//! transaction was recorded locally but not confirmed downstream. Use
//! [`GovernorError::is_recorded`] to tell the two apart.
//!
//! # Example
//!
//! ```rust
//! use spendgate_core::error::{GovernorError, ValidationError};
//!
//! let err: GovernorError = ValidationError::EmptyTarget.into();
//! assert_eq!(err.kind(), "validation");
//! assert!(!err.is_recorded());
//! ```

use crate::broadcast::BroadcastError;
use crate::config::EnforcementMode;

/// Top-level error type for `SpendGate` hosts.
///
/// Wraps every domain error with automatic conversion via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum SpendGateError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A governed transaction failed.
    #[error("Governor error: {0}")]
    Governor(#[from] GovernorError),

    /// History storage failed outside of a governed transaction.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl SpendGateError {
    /// Returns `true` if this error is a policy denial.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Governor(err) if err.is_denied())
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A proposed transaction violates its construction invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The amount is zero, negative, or not a finite number.
    #[error("amount must be a positive, finite number: {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: f64,
    },

    /// The target is empty after trimming surrounding whitespace.
    #[error("target must be a non-empty string")]
    EmptyTarget,
}

impl ValidationError {
    /// Create an `InvalidAmount` error.
    #[must_use]
    pub const fn invalid_amount(amount: f64) -> Self {
        Self::InvalidAmount { amount }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors that can occur while building or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {context}")]
    ParseFailed {
        /// Context about the parsing failure.
        context: String,
    },

    /// A configuration value is invalid.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// The field name with the invalid value.
        field: String,
        /// The invalid value.
        value: String,
    },

    /// I/O failure while reading or writing configuration.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

impl ConfigError {
    /// Create a `FileNotFound` error.
    #[must_use]
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a `ParseFailed` error.
    #[must_use]
    pub fn parse_failed(context: impl Into<String>) -> Self {
        Self::ParseFailed {
            context: context.into(),
        }
    }

    /// Create an `InvalidValue` error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an `Io` error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a `NoHomeDirectory` error.
    #[must_use]
    pub const fn no_home_directory() -> Self {
        Self::NoHomeDirectory
    }
}

// ============================================================================
// StoreError
// ============================================================================

/// Errors raised by a transaction history store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing database rejected an operation.
    #[error("database error: {context}")]
    Database {
        /// Context about the failed operation.
        context: String,
    },

    /// A stored row could not be turned back into a valid transaction.
    #[error("corrupted history entry: {context}")]
    Corrupted {
        /// Which entry and why.
        context: String,
    },

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create a `Database` error.
    #[must_use]
    pub fn database(context: impl Into<String>) -> Self {
        Self::Database {
            context: context.into(),
        }
    }

    /// Create a `Corrupted` error.
    #[must_use]
    pub fn corrupted(context: impl Into<String>) -> Self {
        Self::Corrupted {
            context: context.into(),
        }
    }
}

// ============================================================================
// GovernorError
// ============================================================================

/// Failure of a governed `execute` call.
///
/// Variants are listed in the order they are checked.
#[derive(Debug, thiserror::Error)]
pub enum GovernorError {
    /// The proposed transaction is invalid. Nothing was recorded.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// The transaction exceeds the configured limit. Nothing was recorded.
    #[error(
        "daily limit exceeded: amount={amount}, limit={limit}, window_total={window_total} ({mode})"
    )]
    LimitExceeded {
        /// The requested amount.
        amount: f64,
        /// The configured daily limit.
        limit: f64,
        /// Spend already recorded in the current window.
        window_total: f64,
        /// The enforcement mode that rejected the transaction.
        mode: EnforcementMode,
    },

    /// The history store could not persist the transaction. Nothing was recorded.
    #[error("failed to persist transaction: {0}")]
    Store(#[from] StoreError),

    /// The broadcaster failed. The transaction remains recorded.
    #[error("broadcast failed: {source}")]
    BroadcastFailure {
        /// The error raised by the broadcaster.
        #[source]
        source: BroadcastError,
    },
}

impl GovernorError {
    /// Create a `LimitExceeded` error.
    #[must_use]
    pub const fn limit_exceeded(
        amount: f64,
        limit: f64,
        window_total: f64,
        mode: EnforcementMode,
    ) -> Self {
        Self::LimitExceeded {
            amount,
            limit,
            window_total,
            mode,
        }
    }

    /// Wrap a broadcaster error.
    #[must_use]
    pub fn broadcast_failure(source: impl Into<BroadcastError>) -> Self {
        Self::BroadcastFailure {
            source: source.into(),
        }
    }

    /// Short machine-readable name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::Store(_) => "store",
            Self::BroadcastFailure { .. } => "broadcast_failure",
        }
    }

    /// Returns `true` if the spend policy rejected the transaction.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }

    /// Returns `true` if the transaction was recorded despite the failure.
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        matches!(self, Self::BroadcastFailure { .. })
    }
}

// ============================================================================
// Result type aliases
// ============================================================================

/// A `Result` type alias using [`SpendGateError`] as the error type.
pub type Result<T> = std::result::Result<T, SpendGateError>;

// ============================================================================
// Unit Tests
// ============================================================================
