//! # spendgate-core
//!
//! Core types, configuration, and error definitions for the `SpendGate`
//! spend governor.
//!
//! ## Modules
//!
//! - [`types`] - The validated [`Transaction`] value
//! - [`config`] - [`GovernorConfig`] and the on-disk [`Config`] file format
//! - [`config_loader`] - Reading and writing `~/.spendgate/config.toml`
//! - [`broadcast`] - The [`Broadcaster`] collaborator trait
//! - [`error`] - Error types and result aliases
//!
//! ## Error Handling
//!
//! Every governed call reports exactly one [`GovernorError`]. Validation and
//! limit failures mean the transaction never happened; a broadcast failure
//! means it was recorded but not confirmed downstream:
//!
//! ```rust
//! use spendgate_core::{EnforcementMode, GovernorError, SpendGateError};
//!
//! let err: SpendGateError =
//!     GovernorError::limit_exceeded(10.0, 5.0, 0.0, EnforcementMode::PerTransaction).into();
//! assert!(err.is_denied());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod broadcast;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod types;

// Re-export commonly used error types at crate root for convenience
pub use error::{
    ConfigError, GovernorError, Result, SpendGateError, StoreError, ValidationError,
};

// Re-export config types at crate root for convenience
pub use config::{
    Config, ConfigBuilder, EnforcementMode, GovernorConfig, GovernorSettings, HistoryConfig,
};

// Re-export config loader types at crate root for convenience
pub use config_loader::{expand_path, ConfigLoader};

pub use broadcast::{BroadcastError, Broadcaster, NoopBroadcaster};
pub use types::Transaction;
