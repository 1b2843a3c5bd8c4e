use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::{NewRecurringTemplate, RecurringTemplate},
    errors::ValidationError,
    storage::{PersistentStore, StorageBackend, Subscription},
    time::Clock,
};

/// Ordered collection of recurring templates, newest first.
pub struct RecurringTemplateStore {
    store: PersistentStore<Vec<RecurringTemplate>>,
    clock: Arc<dyn Clock>,
}

impl RecurringTemplateStore {
    pub fn open(
        key: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: PersistentStore::open(key, backend, Vec::new()),
            clock,
        }
    }

    /// Validates the draft, assigns identity and creation time, and prepends it.
    pub fn add(
        &mut self,
        draft: NewRecurringTemplate,
    ) -> Result<RecurringTemplate, ValidationError> {
        let template = RecurringTemplate::from_draft(draft, self.clock.timestamp())?;
        let stored = template.clone();
        self.store.modify(|templates| templates.insert(0, stored));
        debug!(id = %template.id, category = %template.category, "recurring template added");
        Ok(template)
    }

    /// Removes the template with `id`. Transactions already realized from it are untouched.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.store
            .modify(|templates| templates.retain(|template| template.id != id));
        debug!(%id, "recurring template removed");
        true
    }

    pub fn list(&self) -> &[RecurringTemplate] {
        self.store.get()
    }

    pub fn get(&self, id: Uuid) -> Option<&RecurringTemplate> {
        self.list().iter().find(|template| template.id == id)
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&Vec<RecurringTemplate>) + Send + 'static,
    {
        self.store.subscribe(listener)
    }
}
