//! End-to-end tests for history persistence and the command handlers.
//!
//! Each test runs against its own temporary base directory.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::float_cmp,
    clippy::doc_markdown
)]

use std::sync::Arc;

use chrono::Duration;
use spendgate::cli::commands::exit_codes::{EXIT_ERROR, EXIT_POLICY_DENIED};
use spendgate::cli::commands::{
    ConfigCommand, HistoryCommand, InitCommand, SpendCommand, SpendCommandError, StatusCommand,
};
use spendgate::cli::{ConfigAction, OutputFormat};
use spendgate_core::broadcast::NoopBroadcaster;
use spendgate_core::config::{Config, EnforcementMode, GovernorConfig};
use spendgate_core::config_loader::ConfigLoader;
use spendgate_core::types::Transaction;
use spendgate_policy::governor::SpendGovernor;
use spendgate_policy::history::{HistoryStore, SqliteHistory};

use crate::common::{fixed_now, initialized_loader, temp_data_dir};

fn cumulative_config() -> GovernorConfig {
    GovernorConfig::new(5.0)
        .unwrap()
        .with_enforcement(EnforcementMode::Cumulative)
}

// ============================================================================
// Store replay
// ============================================================================

#[test]
fn test_new_governor_replays_persisted_spend() {
    let dir = temp_data_dir();
    let db = dir.path().join("history.db");
    let now = fixed_now();

    {
        let store = Arc::new(SqliteHistory::new(&db).unwrap());
        let gov = SpendGovernor::with_broadcaster(cumulative_config(), NoopBroadcaster)
            .with_store(store)
            .unwrap();
        gov.execute_at(3.0, "API_CREDITS", now - Duration::hours(2))
            .unwrap();
    }

    let store = Arc::new(SqliteHistory::new(&db).unwrap());
    let gov = SpendGovernor::with_broadcaster(cumulative_config(), NoopBroadcaster)
        .with_store(store)
        .unwrap();

    assert_eq!(gov.len(), 1);
    assert_eq!(gov.spent_in_window(now), 3.0);
    assert!(gov.execute_at(3.0, "API_CREDITS", now).unwrap_err().is_denied());
}

#[test]
fn test_denied_spend_is_not_persisted() {
    let store = Arc::new(SqliteHistory::in_memory().unwrap());
    let gov = SpendGovernor::with_broadcaster(cumulative_config(), NoopBroadcaster)
        .with_store(Arc::clone(&store) as Arc<dyn HistoryStore>)
        .unwrap();

    gov.execute_at(4.0, "a", fixed_now()).unwrap();
    gov.execute_at(4.0, "b", fixed_now()).unwrap_err();
    gov.execute_at(-1.0, "c", fixed_now()).unwrap_err();

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.load().unwrap()[0].target(), "a");
}

#[test]
fn test_expired_history_does_not_count() {
    let dir = temp_data_dir();
    let db = dir.path().join("history.db");
    let now = fixed_now();

    let store = SqliteHistory::new(&db).unwrap();
    store
        .append(&Transaction::new(5.0, "old", now - Duration::hours(30)).unwrap())
        .unwrap();

    let gov = SpendGovernor::with_broadcaster(cumulative_config(), NoopBroadcaster)
        .with_store(Arc::new(store))
        .unwrap();

    assert_eq!(gov.len(), 1);
    assert_eq!(gov.spent_in_window(now), 0.0);
    assert!(gov.execute_at(5.0, "API_CREDITS", now).is_ok());
}

#[test]
fn test_two_governors_on_one_database_share_the_budget() {
    let dir = temp_data_dir();
    let db = dir.path().join("history.db");
    let now = fixed_now();
    let attach = || {
        SpendGovernor::with_broadcaster(cumulative_config(), NoopBroadcaster)
            .with_store(Arc::new(SqliteHistory::new(&db).unwrap()))
            .unwrap()
    };

    // Both attached before either spends, like two concurrent CLI processes
    let first = attach();
    let second = attach();

    first.execute_at(4.0, "API_CREDITS", now).unwrap();
    let err = second.execute_at(4.0, "COMPUTE", now).unwrap_err();

    assert!(err.is_denied());
    assert_eq!(second.spent_in_window(now), 4.0);
    assert_eq!(SqliteHistory::new(&db).unwrap().count().unwrap(), 1);
}

#[test]
fn test_concurrent_spend_commands_share_the_budget() {
    let config = Config::builder()
        .enforcement(EnforcementMode::Cumulative)
        .build();
    let (_dir, loader) = initialized_loader(&config);
    let now = fixed_now();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let loader = loader.clone();
            std::thread::spawn(move || {
                SpendCommand::new(loader, 1.0, "API_CREDITS".to_string(), OutputFormat::Json)
                    .execute_with(NoopBroadcaster, now)
                    .is_ok()
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 5);
    let report = StatusCommand::new(loader).collect(now).unwrap();
    assert_eq!(report.recorded, 5);
    assert_eq!(report.spent_in_window, 5.0);
}

// ============================================================================
// Command handlers
// ============================================================================

#[test]
fn test_init_then_status() {
    let dir = temp_data_dir();
    let loader = ConfigLoader::with_base_dir(dir.path().join(".spendgate"));

    InitCommand::new(loader.clone(), false, Some(12.5))
        .execute()
        .unwrap();
    let report = StatusCommand::new(loader).collect(fixed_now()).unwrap();

    assert_eq!(report.daily_limit, 12.5);
    assert_eq!(report.remaining, 12.5);
    assert_eq!(report.recorded, 0);
}

#[test]
fn test_spend_status_and_history_agree() {
    let config = Config::builder()
        .enforcement(EnforcementMode::Cumulative)
        .build();
    let (_dir, loader) = initialized_loader(&config);
    let now = fixed_now();

    let spend = |amount: f64, target: &str| {
        SpendCommand::new(loader.clone(), amount, target.to_string(), OutputFormat::Json)
            .execute_with(NoopBroadcaster, now)
    };

    spend(1.5, "API_CREDITS").unwrap();
    spend(2.0, "COMPUTE").unwrap();
    let denied = spend(2.0, "STORAGE").unwrap_err();
    assert_eq!(denied.exit_code(), EXIT_POLICY_DENIED);

    let report = StatusCommand::new(loader.clone()).collect(now).unwrap();
    assert_eq!(report.recorded, 2);
    assert_eq!(report.spent_in_window, 3.5);
    assert_eq!(report.remaining, 1.5);

    let entries = HistoryCommand::new(loader, 10, OutputFormat::Text)
        .entries()
        .unwrap();
    let targets: Vec<_> = entries.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(targets, ["COMPUTE", "API_CREDITS"]);
}

#[test]
fn test_spend_validation_error_exit_code() {
    let (_dir, loader) = initialized_loader(&Config::default());

    let err = SpendCommand::new(loader, 1.0, "   ".to_string(), OutputFormat::Text)
        .execute_with(NoopBroadcaster, fixed_now())
        .unwrap_err();

    assert!(matches!(err, SpendCommandError::Governor(_)));
    assert_eq!(err.exit_code(), EXIT_ERROR);
}

#[test]
fn test_custom_history_path() {
    let dir = temp_data_dir();
    let config = Config::builder().history_path("data/spend.db").build();
    let loader = ConfigLoader::with_base_dir(dir.path().to_path_buf());
    loader.save(&config).unwrap();

    SpendCommand::new(loader.clone(), 1.0, "API_CREDITS".to_string(), OutputFormat::Text)
        .execute_with(NoopBroadcaster, fixed_now())
        .unwrap();

    assert!(dir.path().join("data").join("spend.db").exists());
    let report = StatusCommand::new(loader).collect(fixed_now()).unwrap();
    assert_eq!(
        report.history_path.unwrap(),
        dir.path().join("data").join("spend.db")
    );
}

#[test]
fn test_config_command_round_trip() {
    let config = Config::builder()
        .daily_limit(7.5)
        .enforcement(EnforcementMode::Cumulative)
        .build();
    let (_dir, loader) = initialized_loader(&config);

    let rendered = ConfigCommand::new(loader.clone(), None).render().unwrap();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, config);

    let path = ConfigCommand::new(loader.clone(), Some(ConfigAction::Path))
        .render()
        .unwrap();
    assert_eq!(path, loader.config_path().display().to_string());
}
