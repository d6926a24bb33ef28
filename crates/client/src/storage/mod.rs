//! Key-value persistence collaborator.
//!
//! The session store mirrors its token and user into a [`KeyValueStore`].
//! The medium is up to the embedding app; two adapters ship here:
//!
//! - [`MemoryStore`] - process-local map with failure injection for tests
//! - [`FileStore`] - a single JSON object on disk, used by the CLI

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
///
/// Implementations must not assume exclusive access: the persisted data may
/// change between a read and a later write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is not durable.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deletion is not durable.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    async fn clear(&self) -> Result<(), StorageError>;
}
