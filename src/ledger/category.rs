use std::sync::Arc;

use tracing::debug;

use crate::{
    domain::validation,
    errors::ValidationError,
    storage::{PersistentStore, StorageBackend, Subscription},
};

/// Ordered set of category labels. Labels are display hints; transactions keep their label
/// even after it is removed here.
pub struct CategoryRegistry {
    store: PersistentStore<Vec<String>>,
}

impl CategoryRegistry {
    /// Opens the registry, seeding it with `defaults` only when nothing has been stored yet.
    pub fn open(
        key: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        defaults: Vec<String>,
    ) -> Self {
        Self {
            store: PersistentStore::open(key, backend, defaults),
        }
    }

    /// Appends a trimmed label. Returns `Ok(false)` when the label is already present.
    pub fn add(&mut self, name: &str) -> Result<bool, ValidationError> {
        let name = validation::normalize_category(name)?;
        if self.contains(&name) {
            return Ok(false);
        }
        debug!(category = %name, "category added");
        self.store.modify(|labels| labels.push(name));
        Ok(true)
    }

    /// Removes an exact-match label. Returns `false` when it is absent.
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.store.modify(|labels| labels.retain(|label| label != name));
        debug!(category = %name, "category removed");
        true
    }

    pub fn list(&self) -> &[String] {
        self.store.get()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.list().iter().any(|label| label == name)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&Vec<String>) + Send + 'static,
    {
        self.store.subscribe(listener)
    }
}
