use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A domain key received a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainUpdate {
    pub key: String,
    pub value: Value,
}

pub type EventHandler = Arc<dyn Fn(&DomainUpdate) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Synchronous, in-process fan-out of domain updates keyed by event name.
///
/// Handlers for one event run in registration order. Late subscribers do
/// not see earlier values; they should read the store on registration.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<String, Vec<(SubscriptionId, EventHandler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, event: impl AsRef<str>, handler: F) -> SubscriptionId
    where
        F: Fn(&DomainUpdate) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers
            .entry(event.as_ref().to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for handlers in self.handlers.values_mut() {
            let before = handlers.len();
            handlers.retain(|(existing, _)| *existing != id);
            removed |= handlers.len() != before;
        }
        self.handlers.retain(|_, handlers| !handlers.is_empty());
        removed
    }

    /// Handlers for `event`, cloned so they can run without borrowing the bus.
    pub fn handlers_for(&self, event: &str) -> Vec<EventHandler> {
        self.handlers
            .get(event)
            .map(|handlers| handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    /// Delivers `update` to every handler registered for its key.
    pub fn publish(&self, update: &DomainUpdate) -> usize {
        let handlers = self.handlers_for(&update.key);
        for handler in &handlers {
            handler(update);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .handlers
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
