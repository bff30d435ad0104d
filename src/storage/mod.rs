//! Storage abstractions for engine state.
//!
//! The engine persists two kinds of records through a plain key-value
//! store:
//!
//! ```text
//! {store}/
//! ├── last-item                          # Cursor: highest scanned id
//! └── sent-items-<subject>               # Dedup markers (never deleted)
//! ```
//!
//! Backends only move bytes; `StateStore` owns the key layout.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;
pub mod state;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use state::StateStore;

/// Trait for key-value storage backends.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value for `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite the value for `key`.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Read and decode a JSON value.
pub async fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    store.put(key, &bytes).await
}
