use std::sync::{Mutex, MutexGuard, PoisonError};

use gallery_core::{
    update, DomainUpdate, Effect, EventBus, Msg, ResponseStore, StatusSnapshot, SubscriptionId,
    SyncState,
};
use gallery_logging::gallery_trace;
use serde_json::Value;
use tokio::sync::watch;

/// Owner of the response store, status tracker and event bus.
///
/// Locks are never held across an await or while handlers run, so handlers
/// may read the store or subscribe again.
pub(crate) struct SyncHub {
    state: Mutex<SyncState>,
    bus: Mutex<EventBus>,
    status_tx: watch::Sender<StatusSnapshot>,
}

impl SyncHub {
    pub(crate) fn new() -> Self {
        let (status_tx, _) = watch::channel(StatusSnapshot::default());
        Self {
            state: Mutex::new(SyncState::new()),
            bus: Mutex::new(EventBus::new()),
            status_tx,
        }
    }

    pub(crate) fn apply(&self, msg: Msg) {
        let effects = {
            let mut guard = lock(&self.state);
            let state = std::mem::take(&mut *guard);
            let (state, effects) = update(state, msg);
            // Published under the lock so snapshots never arrive out of order.
            if effects.contains(&Effect::StatusChanged) {
                self.status_tx.send_replace(state.status());
            }
            *guard = state;
            effects
        };

        for effect in effects {
            if let Effect::Publish(update) = effect {
                self.publish(&update);
            }
        }
    }

    fn publish(&self, update: &DomainUpdate) {
        let handlers = lock(&self.bus).handlers_for(&update.key);
        gallery_trace!(
            "Publishing {} to {} subscriber(s)",
            update.key,
            handlers.len()
        );
        for handler in handlers {
            handler(update);
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        lock(&self.state).get(key).cloned()
    }

    pub(crate) fn store(&self) -> ResponseStore {
        lock(&self.state).store().clone()
    }

    pub(crate) fn status(&self) -> StatusSnapshot {
        lock(&self.state).status()
    }

    pub(crate) fn watch_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status_tx.subscribe()
    }

    pub(crate) fn subscribe<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&DomainUpdate) + Send + Sync + 'static,
    {
        lock(&self.bus).subscribe(event, handler)
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.bus).unsubscribe(id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
