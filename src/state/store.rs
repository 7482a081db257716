//! DeviceStateStore - physical and preview snapshots with subscription support
//!
//! Holds the two device snapshots and notifies subscribers when the physical
//! snapshot changes. Readers always receive owned copies.

use super::patch::DeviceStatePatch;
use super::types::DeviceState;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

type SubscriberFn = Arc<dyn Fn(&DeviceState) + Send + Sync>;

struct Snapshots {
    physical: DeviceState,
    preview: DeviceState,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    /// Registration order is notification order
    subscribers: Mutex<Vec<(u64, SubscriberFn)>>,
}

impl Registry {
    fn remove(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }
}

/// Stores the physical and preview snapshots and notifies subscribers on
/// physical updates
#[derive(Clone)]
pub struct DeviceStateStore {
    snapshots: Arc<RwLock<Snapshots>>,
    registry: Arc<Registry>,
}

impl DeviceStateStore {
    /// Create a store with both snapshots set to the default state
    pub fn new() -> Self {
        Self::with_initial(DeviceState::default())
    }

    /// Create a store with both snapshots set to `initial`
    pub fn with_initial(initial: DeviceState) -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(Snapshots {
                physical: initial.clone(),
                preview: initial,
            })),
            registry: Arc::new(Registry::default()),
        }
    }

    /// Copy of what the device currently reports
    pub fn physical_state(&self) -> DeviceState {
        self.snapshots.read().physical.clone()
    }

    /// Whether the physical snapshot reports a live link
    pub fn is_connected(&self) -> bool {
        self.snapshots.read().physical.is_connected
    }

    /// Copy of the user's in-progress edits
    pub fn preview_state(&self) -> DeviceState {
        self.snapshots.read().preview.clone()
    }

    /// Mutate the physical snapshot; `f` may also touch the preview to
    /// propagate the same fields
    ///
    /// Does not notify; callers decide when a change is complete.
    pub fn update_physical<R>(&self, f: impl FnOnce(&mut DeviceState, &mut DeviceState) -> R) -> R {
        let mut guard = self.snapshots.write();
        let Snapshots { physical, preview } = &mut *guard;
        f(physical, preview)
    }

    /// Mutate the preview snapshot only
    pub fn update_preview<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        f(&mut self.snapshots.write().preview)
    }

    /// Shallow-merge `patch` into the physical snapshot only
    ///
    /// Returns the snapshot as it stood right after this merge.
    pub fn merge_physical(&self, patch: DeviceStatePatch) -> DeviceState {
        debug!(fields = ?patch.field_names(), "Merging into physical state");
        let mut guard = self.snapshots.write();
        guard.physical.merge(patch);
        guard.physical.clone()
    }

    /// Shallow-merge `patch` into the preview snapshot only
    pub fn merge_preview(&self, patch: DeviceStatePatch) {
        debug!(fields = ?patch.field_names(), "Merging into preview state");
        self.snapshots.write().preview.merge(patch);
    }

    /// Subscribe to physical state updates
    ///
    /// The callback stays registered until the returned handle is dropped or
    /// `unsubscribe` is called.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.subscribers.lock().push((id, Arc::new(listener)));
        debug!(subscriber_id = id, "Added subscriber");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry.subscribers.lock().len()
    }

    /// Invoke every subscriber with `state`
    ///
    /// `state` is the snapshot captured under the write lock of the change
    /// being announced. The subscriber list is copied before the first call,
    /// so callbacks can (un)subscribe or read the store without affecting
    /// this pass.
    pub fn notify_all(&self, state: &DeviceState) {
        let subscribers: Vec<SubscriberFn> = self
            .registry
            .subscribers
            .lock()
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();

        trace!(count = subscribers.len(), "Notifying subscribers");
        for subscriber in &subscribers {
            subscriber(state);
        }
    }
}

impl Default for DeviceStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`DeviceStateStore::subscribe`]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the callback; returns false if it was already removed
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let removed = registry.remove(self.id);
                if removed {
                    debug!(subscriber_id = self.id, "Removed subscriber");
                }
                removed
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
