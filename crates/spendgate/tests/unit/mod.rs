//! Unit tests for `spendgate` binary crate components.

pub mod error_handling_test;
