use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use super::{Result, StorageBackend};

/// In-process backend. Documents live only as long as the backend itself.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `key`, e.g. with a document written by an earlier session.
    pub fn with_document(self, key: impl Into<String>, contents: impl Into<String>) -> Self {
        self.documents().insert(key.into(), contents.into());
        self
    }

    /// Raw contents currently stored under `key`.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.documents().get(key).cloned()
    }

    /// Number of successful writes since construction.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.snapshot(key))
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        self.documents().insert(key.to_string(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.documents().remove(key).is_some())
    }
}
