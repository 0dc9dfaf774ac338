//! Async trait implementation for `SqliteStore` via `spawn_blocking`.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::sqlite::SqliteStore;
use crate::traits::KeyValueStore;

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is `.to_owned()` from `&str` and passed back as `&arg`.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:ident)*) => {{
        let s = $self.clone();
        $(let $arg = $arg.to_owned();)*
        blocking(move || s.$method($(&$arg),*)).await
    }};
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        delegate!(self, get_value, key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        delegate!(self, set_value, key, value)
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        delegate!(self, remove_value, key)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        delegate!(self, list_keys, prefix)
    }
}
