//! End-to-end tests for the governor and the command handlers.

pub mod governor_test;
pub mod persistence_test;
