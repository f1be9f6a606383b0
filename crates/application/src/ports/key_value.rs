//! Key-value storage port
//!
//! The session core persists its small pieces of state (token pair,
//! remember-me preference) through this minimal capability, so the same
//! code runs against an in-memory map in tests and durable storage in
//! production.

use async_trait::async_trait;

/// Minimal persistent key-value capability.
///
/// The contract is infallible: adapters that can fail (file I/O)
/// degrade gracefully and log, the way browser local storage behaves.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str);

    /// Removes `key` and its value.
    async fn remove(&self, key: &str);
}
