//! A typed, observable value mirrored into a [`StorageBackend`] document.

use std::{
    fmt, mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::StorageBackend;
use crate::errors::StorageError;

type Listener<T> = Box<dyn FnMut(&T) + Send>;

struct ListenerSet<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
    /// Ids of listeners checked out for the running notification round.
    in_flight: Vec<u64>,
    /// In-flight ids unsubscribed during the round, dropped once it ends.
    detached: Vec<u64>,
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
            in_flight: Vec::new(),
            detached: Vec::new(),
        }
    }
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
}

impl<T> Detach for Mutex<ListenerSet<T>> {
    fn detach(&self, id: u64) -> bool {
        let mut set = self.lock().unwrap_or_else(PoisonError::into_inner);
        let before = set.entries.len();
        set.entries.retain(|(entry, _)| *entry != id);
        if set.entries.len() != before {
            return true;
        }
        if set.in_flight.contains(&id) && !set.detached.contains(&id) {
            set.detached.push(id);
            return true;
        }
        false
    }
}

/// Handle returned by [`PersistentStore::subscribe`].
///
/// Dropping the handle does not remove the listener; call [`Subscription::unsubscribe`]
/// on teardown.
#[must_use = "the listener stays registered until `unsubscribe` is called"]
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    /// Removes the listener. Returns `false` if it was already gone or the store was dropped.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.detach(self.id),
            None => false,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Holds one named value in memory and mirrors every change into a backend document.
///
/// In-memory state is authoritative for the running session. Reads from the backend happen
/// once at construction; writes happen after every mutation and their failures are logged and
/// swallowed, leaving the store session-only until a later write succeeds.
pub struct PersistentStore<T> {
    key: String,
    backend: Arc<dyn StorageBackend>,
    value: T,
    durable: bool,
    listeners: Arc<Mutex<ListenerSet<T>>>,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Loads the document stored under `key`, falling back to `default` when it is absent,
    /// unreadable or malformed. The fallback is not written back until the next mutation.
    pub fn open(key: impl Into<String>, backend: Arc<dyn StorageBackend>, default: T) -> Self {
        let key = key.into();
        let mut durable = true;
        let value = match backend.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(key = %key, bytes = raw.len(), "document loaded");
                    value
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "stored document is malformed; using default");
                    default
                }
            },
            Ok(None) => {
                debug!(key = %key, "no stored document; using default");
                default
            }
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read stored document; using default");
                durable = false;
                default
            }
        };
        Self {
            key,
            backend,
            value,
            durable,
            listeners: Arc::new(Mutex::new(ListenerSet::default())),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current in-memory value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Whether the last interaction with the backend succeeded.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Replaces the value outright.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.changed();
    }

    /// Replaces the value with `f(latest)`.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    /// Mutates the value in place and returns whatever `f` returns.
    pub fn modify<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = f(&mut self.value);
        self.changed();
        result
    }

    /// Writes the current value, reporting failure instead of swallowing it.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        let outcome = serde_json::to_string(&self.value)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.write(&self.key, &json));
        self.durable = outcome.is_ok();
        outcome
    }

    /// Registers `listener`, which then sees every new value after it is applied in memory.
    ///
    /// A listener may unsubscribe from inside its own callback; it is removed once the
    /// current notification round completes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        let mut set = self.listener_set();
        let id = set.next_id;
        set.next_id += 1;
        set.entries.push((id, Box::new(listener)));
        let registry: Arc<dyn Detach> = self.listeners.clone();
        Subscription {
            id,
            registry: Arc::downgrade(&registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        let set = self.listener_set();
        set.entries.len() + set.in_flight.len() - set.detached.len()
    }

    fn changed(&mut self) {
        if let Err(err) = self.flush() {
            warn!(
                key = %self.key,
                error = %err,
                "failed to persist document; keeping in-memory state"
            );
        }
        // Listeners run outside the lock so they may unsubscribe themselves.
        let mut active = {
            let mut set = self.listener_set();
            let active = mem::take(&mut set.entries);
            set.in_flight = active.iter().map(|(id, _)| *id).collect();
            active
        };
        for (_, listener) in active.iter_mut() {
            listener(&self.value);
        }
        let mut set = self.listener_set();
        set.in_flight.clear();
        let detached = mem::take(&mut set.detached);
        active.retain(|(id, _)| !detached.contains(id));
        active.append(&mut set.entries);
        set.entries = active;
    }

    fn listener_set(&self) -> MutexGuard<'_, ListenerSet<T>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStore")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("durable", &self.durable)
            .finish_non_exhaustive()
    }
}
