//! Shared types for the Stardust migration workspace.
//!
//! This crate provides the wire-level types used across the transport and
//! migration crates, keeping both free of each other's internals.
//!
//! ## Object Payloads
//!
//! The [`object`] module mirrors the JSON-RPC object and dynamic-field shapes:
//! - [`ObjectData`](object::ObjectData) - Object with its parsed content
//! - [`DynamicFieldPage`](object::DynamicFieldPage) - One page of bag entries
//!
//! ## Transaction Types
//!
//! The [`transaction`] module contains the serialisable programmable
//! transaction handed to a signer:
//! - [`ProgrammableTransaction`](transaction::ProgrammableTransaction)
//! - [`PtbCommand`](transaction::PtbCommand) / [`PtbArgument`](transaction::PtbArgument)

pub mod encoding;
pub mod env_utils;
pub mod framework;
pub mod object;
pub mod transaction;

// Re-export commonly used types at crate root
pub use object::{
    DynamicFieldInfo, DynamicFieldName, DynamicFieldPage, ObjectContent, ObjectData, ObjectID,
    ObjectResponse, OwnedObjectsPage,
};
pub use transaction::{ProgrammableTransaction, PtbArgument, PtbCommand, TransactionInput};

use std::time::Duration;

/// Configuration for retry behavior on network operations.
#[derive(Debug, Copy, Clone)]
pub struct RetryConfig {
    /// Number of retry attempts.
    pub retries: usize,
    /// Initial backoff duration between retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
}

impl RetryConfig {
    /// Create a new RetryConfig with the specified parameters.
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// No retries at all; the first failure is returned.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Backoff to wait before retry number `attempt` (0-based), doubling
    /// from `initial_backoff` and capped at `max_backoff`.
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryConfig::new(5, 100, 1000);
        assert_eq!(retry.backoff_for(0), Duration::from_millis(100));
        assert_eq!(retry.backoff_for(1), Duration::from_millis(200));
        assert_eq!(retry.backoff_for(3), Duration::from_millis(800));
        assert_eq!(retry.backoff_for(4), Duration::from_millis(1000));
        assert_eq!(retry.backoff_for(64), Duration::from_millis(1000));
    }

    #[test]
    fn test_none_has_no_retries() {
        assert_eq!(RetryConfig::none().retries, 0);
    }
}
