//! # CLI Module
//!
//! Command-line interface for `SpendGate`.
//!
//! - [`args`] - Argument parsing and CLI structure definitions
//! - [`commands`] - Command handler implementations
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use spendgate::cli::{Cli, Commands};
//!
//! let cli = Cli::parse();
//!
//! match cli.command {
//!     Commands::Status => {
//!         // Handle status command
//!     }
//!     _ => {}
//! }
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigAction, OutputFormat, DEFAULT_HISTORY_LIMIT};
