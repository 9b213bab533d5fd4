use async_trait::async_trait;

use crate::error::StoreError;

/// Minimal key-value capability the vault builds on.
///
/// Semantics mirror browser storage: `set` replaces any previous value
/// (last-write-wins), `get` on an absent key is `None`, and `remove` is
/// idempotent. Implementations must be safe to share across tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure; an absent key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, fully replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the key is invalid or the backend fails.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Removes the value under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns [`StoreError`] on backend failure.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
