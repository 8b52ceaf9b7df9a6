//! # `SpendGate` Library
//!
//! Transaction governance gate that enforces a rolling 24h spend limit.
//!
//! The governor itself lives in `spendgate-policy`; this crate wires it to a
//! configuration directory, a history database, and structured logging, and
//! exposes the `spendgate` command line.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions and handlers
//! - [`logging`] - Logging setup and correlation IDs
//! - [`broadcast`] - Broadcaster used by the binary
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use spendgate::cli::Cli;
//!
//! let cli = Cli::parse();
//! println!("Verbose level: {}", cli.verbose);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod broadcast;
pub mod cli;
pub mod logging;

pub use broadcast::LoggingBroadcaster;
pub use logging::{
    init_logging, new_correlation_id, verbosity_to_level, LogConfig, LogError, LogFormat, LogGuard,
    LogLevel,
};

pub use spendgate_core::{
    Broadcaster, Config, EnforcementMode, GovernorConfig, GovernorError, Transaction,
};
pub use spendgate_policy::{HistoryStore, SpendGovernor, SqliteHistory};
