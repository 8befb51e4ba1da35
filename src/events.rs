//! Subscription plumbing for selection and connectivity events.
//!
//! `Listeners<T>` is a small callback registry. Subscribing returns a
//! `Subscription`; dropping it (or calling `unsubscribe`) removes the
//! callback, so teardown is deterministic. Callbacks run outside the registry
//! lock and may subscribe or unsubscribe re-entrantly.
//!
//! `ConnectivityMonitor` is the connectivity signal source: a `watch` channel
//! holding the latest online flag, fed by whatever platform probe the host has.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self { registry: Arc::new(Mutex::new(Registry { next_id: 0, entries: Vec::new() })) }
    }
}

impl<T: 'static> Listeners<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered until the handle goes away.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };
        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
                    registry.entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Invoke every registered callback with `value`.
    pub fn emit(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entries.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for callback in callbacks {
            callback(value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for a registered callback. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}

// =============================================================================
// CONNECTIVITY
// =============================================================================

#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    /// Publish the current connectivity. Returns `true` if it changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        })
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
