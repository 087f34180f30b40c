use serde_json::Value;

use crate::{ResponseStore, StatusSnapshot, StatusTracker};

/// Everything the sync engine remembers between network events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    store: ResponseStore,
    tracker: StatusTracker,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn status(&self) -> StatusSnapshot {
        self.tracker.snapshot()
    }

    pub(crate) fn store_mut(&mut self) -> &mut ResponseStore {
        &mut self.store
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut StatusTracker {
        &mut self.tracker
    }
}
