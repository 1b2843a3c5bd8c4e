//! Durable key/value backends and the typed store built on them.

pub mod json_backend;
pub mod memory;
pub mod store;

use crate::errors::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over durable media capable of holding UTF-8 documents under stable keys.
pub trait StorageBackend: Send + Sync {
    /// Returns the stored document, or `None` when nothing has been written for `key`.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the document stored under `key`.
    fn write(&self, key: &str, contents: &str) -> Result<()>;

    /// Deletes the document stored under `key`, returning whether one existed.
    fn remove(&self, key: &str) -> Result<bool>;
}

pub use json_backend::JsonFileBackend;
pub use memory::MemoryBackend;
pub use store::{PersistentStore, Subscription};
