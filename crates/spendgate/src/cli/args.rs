//! # CLI Argument Definitions
//!
//! Command-line structure for `spendgate`, built with clap derive macros.
//!
//! - `spendgate init` - Write a default configuration
//! - `spendgate status` - Show limit, window spend, and remaining budget
//! - `spendgate config [path]` - Print the configuration or its location
//! - `spendgate spend <AMOUNT> <TARGET>` - Run a governed transaction
//! - `spendgate history` - List recorded transactions
//!
//! ## Global Options
//!
//! - `-v, --verbose` - Increase verbosity level
//! - `--base-dir <DIR>` - Use a directory other than `~/.spendgate`
//! - `--log-format <FORMAT>` - pretty, json, or compact log output
//! - `--log-file <PATH>` - Also write logs to a daily-rotated file

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

/// Default number of entries shown by `spendgate history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// `SpendGate` - spend-limit governor for outgoing transactions.
#[derive(Debug, Parser)]
#[command(name = "spendgate")]
#[command(version, about = "Transaction governance gate with a rolling 24h spend limit")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base directory for configuration and history (default: ~/.spendgate)
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "pretty", value_name = "FORMAT")]
    pub log_format: LogFormat,

    /// Also write logs to this file, rotated daily
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,

        /// Daily limit to write instead of the default
        #[arg(long, value_name = "AMOUNT")]
        daily_limit: Option<f64>,
    },

    /// Show the configured limit, window spend, and remaining budget
    Status,

    /// Print the configuration
    Config {
        /// What to print
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Run a transaction through the governor
    Spend {
        /// Amount to spend
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: f64,

        /// Spending target, e.g. API_CREDITS
        #[arg(value_name = "TARGET")]
        target: String,

        /// Output format
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// List recorded transactions, newest first
    History {
        /// Maximum number of entries to show
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT, value_name = "N")]
        limit: usize,

        /// Output format
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,
    },
}

/// `spendgate config` actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Print the path to the configuration file
    Path,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}
