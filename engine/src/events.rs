use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use chainsweeper_protocol::{EventEnvelope, EventId, GameEvent};

/// Callback invoked for every delivered event.
pub type EventHandler = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// How many recent event ids a deduplicating handler remembers.
pub const DEDUP_WINDOW: usize = 256;

#[derive(Debug, Default)]
struct RecentIds {
    order: VecDeque<EventId>,
    seen: HashSet<EventId>,
}

impl RecentIds {
    fn insert(&mut self, id: EventId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > DEDUP_WINDOW
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        true
    }
}

/// Wraps `handler` so repeated deliveries of the same event id are dropped.
pub fn deduplicated(handler: EventHandler) -> EventHandler {
    let recent = Mutex::new(RecentIds::default());
    Arc::new(move |envelope: &EventEnvelope| {
        let fresh = recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(envelope.id);
        if fresh {
            handler(envelope);
        } else {
            log::debug!("Dropping duplicate event {:?}", envelope.id);
        }
    })
}

/// Subscriber registry that also numbers emitted events.
#[derive(Clone, Default)]
pub struct Listeners {
    next_subscription: u64,
    next_sequence: u64,
    handlers: Vec<(SubscriptionId, EventHandler)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: EventHandler) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.handlers.push((id, handler));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        self.handlers.len() != before
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Assigns the next sequence number to `event` and delivers it.
    pub fn emit(&mut self, event: GameEvent) {
        self.next_sequence += 1;
        let envelope = EventEnvelope {
            id: EventId::new(self.next_sequence, 0),
            event,
        };
        self.dispatch(&envelope);
    }

    /// Delivers an already numbered event to every handler.
    pub fn dispatch(&self, envelope: &EventEnvelope) {
        log::debug!("Event {:?}: {:?}", envelope.id, envelope.event);
        for (_, handler) in &self.handlers {
            handler(envelope);
        }
    }
}
