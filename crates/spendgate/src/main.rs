//! # `SpendGate`
//!
//! Transaction governance gate with a rolling 24h spend limit.
//!
//! ## Usage
//!
//! ```bash
//! # Initialize configuration
//! spendgate init --daily-limit 5
//!
//! # Spend against the limit
//! spendgate spend 3.0 API_CREDITS
//!
//! # Show the window spend and remaining budget
//! spendgate status
//!
//! # List recent transactions
//! spendgate history --limit 10 --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::path::PathBuf;

use clap::Parser;
use spendgate::cli::commands::exit_codes::{EXIT_ERROR, EXIT_POLICY_DENIED};
use spendgate::cli::commands::{
    loader_for, ConfigCommand, HistoryCommand, InitCommand, SpendCommand, SpendCommandError,
    StatusCommand,
};
use spendgate::cli::{Cli, Commands};
use spendgate::logging::{init_logging, verbosity_to_level, LogConfig, LogError, LogFormat, LogGuard};
use spendgate_core::error::GovernorError;

/// Set up logging based on verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
/// * `format` - Log output format
/// * `file_path` - Optional daily-rotated log file
///
/// # Errors
///
/// Returns [`LogError`] if logging initialization fails.
fn setup_logging(
    verbose: u8,
    format: LogFormat,
    file_path: Option<PathBuf>,
) -> Result<LogGuard, LogError> {
    let config = LogConfig {
        level: verbosity_to_level(verbose),
        format,
        file_path,
    };
    init_logging(&config)
}

/// Main entry point for the `SpendGate` application.
fn main() {
    let cli = Cli::parse();

    let _guard = match setup_logging(cli.verbose, cli.log_format, cli.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    let loader = match loader_for(cli.base_dir) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Init { force, daily_limit } => {
            let cmd = InitCommand::new(loader, force, daily_limit);
            cmd.run().map_err(|e| e.to_string())
        }
        Commands::Status => {
            let cmd = StatusCommand::new(loader);
            cmd.run().map_err(|e| e.to_string())
        }
        Commands::Config { action } => {
            let cmd = ConfigCommand::new(loader, action);
            cmd.run().map_err(|e| e.to_string())
        }
        Commands::Spend {
            amount,
            target,
            format,
        } => handle_spend(&SpendCommand::new(loader, amount, target, format)),
        Commands::History { limit, format } => {
            let cmd = HistoryCommand::new(loader, limit, format);
            cmd.run().map_err(|e| e.to_string())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(EXIT_ERROR);
    }
}

/// Handle the spend command.
///
/// # Exit Codes
///
/// This function may call `std::process::exit` directly:
/// - Exit code 1: Spend limit denied the transaction
/// - Exit code 2: Other error
fn handle_spend(cmd: &SpendCommand) -> Result<(), String> {
    match cmd.run() {
        Ok(()) => Ok(()),
        Err(e) if e.is_denied() => {
            eprintln!("Denied: {e}");
            std::process::exit(EXIT_POLICY_DENIED);
        }
        Err(SpendCommandError::Governor(e @ GovernorError::BroadcastFailure { .. })) => {
            eprintln!("Error: {e}");
            eprintln!("The transaction was recorded and counts against the limit.");
            std::process::exit(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
