//! Error handling and conversion tests.
//!
//! These tests verify that error types implement the correct traits,
//! have useful Display implementations, and map to the right exit codes.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::doc_markdown,
    clippy::io_other_error
)]

use std::error::Error;
use std::path::PathBuf;

use spendgate::cli::commands::exit_codes::{EXIT_ERROR, EXIT_POLICY_DENIED};
use spendgate::cli::commands::{
    ConfigCommandError, HistoryError, InitError, SpendCommandError, StatusError,
};
use spendgate::logging::LogError;
use spendgate_core::config::EnforcementMode;
use spendgate_core::error::{
    ConfigError, GovernorError, SpendGateError, StoreError, ValidationError,
};

/// Test that all error types implement the Error trait.
#[test]
fn test_error_trait_implementation() {
    let err = LogError::FileCreation("test".to_string());
    assert!(err.source().is_none());

    let err = InitError::AlreadyInitialized(PathBuf::from("/tmp/config.toml"));
    assert!(err.source().is_none());

    let err = StatusError::NotInitialized;
    assert!(err.source().is_none());

    let err = HistoryError::Disabled;
    assert!(err.source().is_none());

    let err = SpendCommandError::NotInitialized;
    assert!(err.source().is_none());

    let err = ConfigCommandError::NotInitialized;
    assert!(err.source().is_none());

    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = ConfigError::io("failed to read config", io_err);
    assert!(err.source().is_some());
}

/// Test error Display implementations.
#[test]
fn test_error_display() {
    let err = InitError::AlreadyInitialized(PathBuf::from("/tmp/config.toml"));
    assert!(err.to_string().contains("already initialized"));
    assert!(err.to_string().contains("--force"));

    let err = HistoryError::Disabled;
    assert!(err.to_string().contains("history.enabled"));

    let err = SpendCommandError::NotInitialized;
    assert!(err.to_string().contains("spendgate init"));

    let err = GovernorError::limit_exceeded(10.0, 5.0, 0.0, EnforcementMode::PerTransaction);
    let msg = err.to_string();
    assert!(msg.contains("amount=10"));
    assert!(msg.contains("limit=5"));
    assert!(msg.contains("per_transaction"));
}

/// Test that a broadcast failure keeps its source chain.
#[test]
fn test_broadcast_failure_source_chain() {
    let io_err = std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "AGENTKIT_TRANSACTION_FAILED",
    );
    let err = SpendCommandError::from(GovernorError::broadcast_failure(io_err));

    // Transparent wrapper: the governor error is displayed directly
    assert!(err.to_string().starts_with("broadcast failed"));

    let source = err.source().unwrap();
    assert_eq!(source.to_string(), "AGENTKIT_TRANSACTION_FAILED");
}

/// Test conversions into the top-level error.
#[test]
fn test_top_level_conversions() {
    let err: SpendGateError = ConfigError::invalid_value("daily_limit", "0").into();
    assert!(matches!(err, SpendGateError::Config(_)));
    assert!(!err.is_denied());

    let err: SpendGateError =
        GovernorError::limit_exceeded(6.0, 5.0, 0.0, EnforcementMode::PerTransaction).into();
    assert!(err.is_denied());

    let err: SpendGateError = StoreError::database("locked").into();
    assert!(matches!(err, SpendGateError::Store(_)));

    let err: GovernorError = ValidationError::EmptyTarget.into();
    assert_eq!(err.kind(), "validation");
}

/// Test exit code mapping for the spend command.
#[test]
fn test_spend_exit_codes() {
    let denied = SpendCommandError::from(GovernorError::limit_exceeded(
        6.0,
        5.0,
        0.0,
        EnforcementMode::PerTransaction,
    ));
    assert_eq!(denied.exit_code(), EXIT_POLICY_DENIED);

    let invalid = SpendCommandError::from(GovernorError::from(ValidationError::invalid_amount(
        -1.0,
    )));
    assert_eq!(invalid.exit_code(), EXIT_ERROR);

    let store = SpendCommandError::from(StoreError::database("disk full"));
    assert_eq!(store.exit_code(), EXIT_ERROR);

    assert_eq!(SpendCommandError::NotInitialized.exit_code(), EXIT_ERROR);
}
