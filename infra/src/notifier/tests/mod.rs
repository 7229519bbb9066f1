//! Unit tests for notifier module

#[cfg(test)]
pub mod failover_tests;
