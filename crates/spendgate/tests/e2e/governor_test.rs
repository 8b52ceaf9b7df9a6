//! End-to-end tests for spend limit enforcement.
//!
//! - Acceptance below and at the limit
//! - Denial above the limit with no side effects
//! - Validation failures with no side effects
//! - Rolling window boundaries
//! - Broadcast failure after recording

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::float_cmp,
    clippy::doc_markdown
)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;
use spendgate_core::broadcast::{BroadcastError, Broadcaster};
use spendgate_core::config::{EnforcementMode, GovernorConfig};
use spendgate_core::error::{GovernorError, ValidationError};
use spendgate_core::types::Transaction;
use spendgate_policy::governor::{SpendGovernor, LIMIT_TOLERANCE};

use crate::common::{
    amount_above, amount_within, blank_target, fixed_now, non_positive_amount, target,
};

// ============================================================================
// Mock Components
// ============================================================================

/// Counts broadcasts.
#[derive(Default)]
struct CountingBroadcaster {
    count: AtomicU32,
}

impl CountingBroadcaster {
    fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Broadcaster for CountingBroadcaster {
    fn broadcast(&self, _tx: &Transaction) -> Result<(), BroadcastError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Always fails like an unreachable payment network.
struct DownBroadcaster;

impl Broadcaster for DownBroadcaster {
    fn broadcast(&self, _tx: &Transaction) -> Result<(), BroadcastError> {
        Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "AGENTKIT_TRANSACTION_FAILED",
        )))
    }
}

fn governor(limit: f64) -> SpendGovernor {
    SpendGovernor::new(limit).unwrap()
}

fn cumulative(limit: f64) -> SpendGovernor<Arc<CountingBroadcaster>> {
    let config = GovernorConfig::new(limit)
        .unwrap()
        .with_enforcement(EnforcementMode::Cumulative);
    SpendGovernor::with_broadcaster(config, Arc::new(CountingBroadcaster::default()))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_over_limit_is_denied_and_log_stays_empty() {
    let gov = governor(5.0);

    let err = gov
        .execute_at(10.0, "API_CREDITS", fixed_now())
        .unwrap_err();

    match err {
        GovernorError::LimitExceeded {
            amount,
            limit,
            window_total,
            mode,
        } => {
            assert_eq!(amount, 10.0);
            assert_eq!(limit, 5.0);
            assert_eq!(window_total, 0.0);
            assert_eq!(mode, EnforcementMode::PerTransaction);
        }
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
    assert!(gov.is_empty());
}

#[test]
fn test_within_limit_is_recorded() {
    let gov = governor(5.0);

    let tx = gov.execute_at(3.0, "API_CREDITS", fixed_now()).unwrap();

    assert_eq!(tx.amount(), 3.0);
    assert_eq!(tx.target(), "API_CREDITS");
    assert_eq!(gov.spent_in_window(fixed_now()), 3.0);
}

#[test]
fn test_failed_broadcast_stays_recorded() {
    let config = GovernorConfig::new(5.0).unwrap();
    let gov = SpendGovernor::with_broadcaster(config, DownBroadcaster);

    let err = gov.execute_at(1.0, "x", fixed_now()).unwrap_err();

    assert!(matches!(err, GovernorError::BroadcastFailure { .. }));
    assert!(err.is_recorded());
    assert!(err.to_string().contains("AGENTKIT_TRANSACTION_FAILED"));
    assert_eq!(gov.spent_in_window(fixed_now()), 1.0);
    assert_eq!(gov.len(), 1);
}

#[test]
fn test_amount_equal_to_limit_is_accepted() {
    let gov = governor(5.0);
    assert!(gov.execute_at(5.0, "API_CREDITS", fixed_now()).is_ok());
}

#[test]
fn test_per_transaction_mode_ignores_window_total() {
    let gov = governor(5.0);
    for _ in 0..4 {
        gov.execute_at(4.0, "API_CREDITS", fixed_now()).unwrap();
    }
    assert_eq!(gov.spent_in_window(fixed_now()), 16.0);
}

#[test]
fn test_cumulative_mode_denies_second_spend() {
    let gov = cumulative(5.0);
    let now = fixed_now();

    gov.execute_at(3.0, "API_CREDITS", now).unwrap();
    let err = gov.execute_at(3.0, "API_CREDITS", now).unwrap_err();

    assert!(matches!(
        err,
        GovernorError::LimitExceeded { window_total, .. } if window_total == 3.0
    ));
    assert_eq!(gov.len(), 1);
    assert_eq!(gov.remaining_in_window(now), 2.0);
}

#[test]
fn test_cumulative_decimal_spends_reach_limit() {
    let gov = cumulative(0.3);
    let now = fixed_now();

    gov.execute_at(0.1, "API_CREDITS", now).unwrap();
    gov.execute_at(0.2, "COMPUTE", now).unwrap();

    assert_eq!(gov.len(), 2);
    assert!(gov.execute_at(0.1, "STORAGE", now).unwrap_err().is_denied());
}

#[test]
fn test_cumulative_budget_frees_up_after_window() {
    let gov = cumulative(5.0);
    let now = fixed_now();

    gov.execute_at(5.0, "API_CREDITS", now - Duration::hours(25))
        .unwrap();
    assert!(gov.execute_at(5.0, "API_CREDITS", now).is_ok());
}

#[test]
fn test_window_counts_only_recent_entries() {
    let gov = governor(5.0);
    let now = fixed_now();

    gov.execute_at(2.0, "old", now - Duration::hours(25)).unwrap();
    gov.execute_at(1.0, "recent", now - Duration::hours(1))
        .unwrap();

    assert_eq!(gov.spent_in_window(now), 1.0);
    assert_eq!(gov.len(), 2);
}

#[test]
fn test_window_boundary_is_inclusive() {
    let gov = governor(5.0);
    let now = fixed_now();

    gov.execute_at(2.0, "edge", now - Duration::hours(24)).unwrap();

    assert_eq!(gov.spent_in_window(now), 2.0);
    assert_eq!(gov.spent_in_window(now + Duration::nanoseconds(1)), 0.0);
}

#[test]
fn test_denied_spend_is_not_broadcast() {
    let config = GovernorConfig::new(5.0)
        .unwrap()
        .with_enforcement(EnforcementMode::Cumulative);
    let broadcaster = Arc::new(CountingBroadcaster::default());
    let gov = SpendGovernor::with_broadcaster(config, Arc::clone(&broadcaster));

    gov.execute_at(4.0, "a", fixed_now()).unwrap();
    gov.execute_at(4.0, "b", fixed_now()).unwrap_err();
    gov.execute_at(0.0, "c", fixed_now()).unwrap_err();

    assert_eq!(broadcaster.count(), 1);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_valid_spend_is_counted(amount in amount_within(5.0), t in target()) {
        let gov = governor(5.0);
        let now = fixed_now();

        let tx = gov.execute_at(amount, &t, now).unwrap();

        prop_assert_eq!(tx.target(), t.trim());
        prop_assert_eq!(gov.spent_in_window(now), amount);
    }

    #[test]
    fn prop_over_limit_has_no_side_effect(amount in amount_above(5.0), t in target()) {
        let gov = governor(5.0);

        let err = gov.execute_at(amount, &t, fixed_now()).unwrap_err();

        prop_assert!(err.is_denied());
        prop_assert!(gov.is_empty());
    }

    #[test]
    fn prop_non_positive_amount_is_invalid(amount in non_positive_amount()) {
        let gov = governor(5.0);

        let err = gov.execute_at(amount, "API_CREDITS", fixed_now()).unwrap_err();

        prop_assert!(
            matches!(
                err,
                GovernorError::Validation(ValidationError::InvalidAmount { .. })
            ),
            "unexpected error: {:?}",
            err
        );
        prop_assert!(gov.is_empty());
    }

    #[test]
    fn prop_blank_target_is_invalid(t in blank_target()) {
        let gov = governor(5.0);

        let err = gov.execute_at(1.0, &t, fixed_now()).unwrap_err();

        prop_assert!(matches!(
            err,
            GovernorError::Validation(ValidationError::EmptyTarget)
        ));
        prop_assert!(gov.is_empty());
    }

    #[test]
    fn prop_repeated_rejections_never_mutate(
        rejected in prop::collection::vec(amount_above(5.0), 1..20)
    ) {
        let gov = governor(5.0);

        for amount in rejected {
            prop_assert!(gov.execute_at(amount, "API_CREDITS", fixed_now()).is_err());
            prop_assert!(gov.execute_at(-amount, "API_CREDITS", fixed_now()).is_err());
            prop_assert!(gov.execute_at(1.0, "  ", fixed_now()).is_err());
        }

        prop_assert_eq!(gov.len(), 0);
    }

    #[test]
    fn prop_cumulative_window_never_exceeds_limit(
        amounts in prop::collection::vec(amount_within(5.0), 1..30)
    ) {
        let gov = cumulative(5.0);
        let now = fixed_now();

        for amount in amounts {
            let _ = gov.execute_at(amount, "API_CREDITS", now);
        }

        prop_assert!(gov.spent_in_window(now) <= 5.0 * (1.0 + LIMIT_TOLERANCE));
    }
}
