//! Storage backend trait abstraction.

use async_trait::async_trait;

use crate::error::StorageError;

/// String-valued key-value medium, in the spirit of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `None` when the key was never written or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Returns `true` if a value was removed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys starting with `prefix`, sorted ascending.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
