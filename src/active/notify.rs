//! Change notification
//!
//! Synchronous broadcast to the subscribers registered at dispatch time.
//! Callbacks run on the thread that saved, after the configuration lock has
//! been released. Work that performs I/O belongs on a runtime: see
//! [`spawn_on_change`].
//!
//! A subscriber must not call `save()` on the configuration it is reacting to;
//! each save broadcasts again.

use crate::provider::ProviderKind;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// What caused a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    Saved,
    Reloaded,
    ProfileApplied,
}

/// Payload handed to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationChange {
    pub reason: ChangeReason,
    /// Selected kind after the change.
    pub selected: ProviderKind,
    /// Monotonic per-configuration counter.
    pub sequence: u64,
}

type Callback = Arc<dyn Fn(&ConfigurationChange) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, Callback)>>,
}

impl Registry {
    fn remove(&self, id: u64) {
        self.subscribers.lock().retain(|(sid, _)| *sid != id);
    }
}

#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Registry>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. Dropping the returned handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConfigurationChange) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.subscribers.lock().push((id, Arc::new(callback)));
        tracing::debug!(subscription = id, "Subscribed to configuration changes");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.subscribers.lock().len()
    }

    /// Invoke every current subscriber with `change`.
    ///
    /// The subscriber list is copied first, so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self, change: &ConfigurationChange) {
        let callbacks: Vec<Callback> = self
            .registry
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        tracing::debug!(
            reason = ?change.reason,
            selected = %change.selected,
            subscribers = callbacks.len(),
            "Broadcasting configuration change"
        );
        for callback in callbacks {
            callback(change);
        }
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(self) {}

    /// Keep the callback registered for the notifier's whole lifetime.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
            tracing::debug!(subscription = self.id, "Unsubscribed from configuration changes");
        }
    }
}

/// Subscribe an async reaction: every change spawns `reaction` on `handle`,
/// so the broadcasting thread only pays for the spawn.
pub fn spawn_on_change<F, Fut>(
    notifier: &ChangeNotifier,
    handle: tokio::runtime::Handle,
    reaction: F,
) -> Subscription
where
    F: Fn(ConfigurationChange) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    notifier.subscribe(move |change| {
        handle.spawn(reaction(change.clone()));
    })
}
