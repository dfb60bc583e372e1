//! Change notification for event-store mutations.
//!
//! Subscribers are notified synchronously, in registration order, on every
//! create/update/delete and on detected duplicates. A failing subscriber
//! is logged and skipped; it never prevents delivery to the remaining
//! subscribers and never aborts the underlying mutation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::StandardizedEvent;

/// Kind of store mutation being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A new event was persisted.
    Created,
    /// An existing event was updated in place.
    Updated,
    /// An event was deleted.
    Deleted,
    /// An insert was short-circuited into an existing duplicate.
    DuplicateDetected,
}

impl ChangeKind {
    /// Get the kind as a dotted event string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "event.created",
            Self::Updated => "event.updated",
            Self::Deleted => "event.deleted",
            Self::DuplicateDetected => "event.duplicate_detected",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A change notice delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// What happened.
    pub kind: ChangeKind,
    /// The affected event; for duplicates, the surviving record.
    pub event: StandardizedEvent,
}

/// Handle returned from `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A subscriber callback. Returning an error marks the delivery failed for
/// this subscriber only.
pub type Subscriber = Box<dyn Fn(&ChangeNotice) -> Result<(), String> + Send + Sync>;

/// Registry of change subscribers.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; delivery order is registration order.
    pub fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .expect("subscriber lock poisoned")
            .push((id, subscriber));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write().expect("subscriber lock poisoned");
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers
            .read()
            .expect("subscriber lock poisoned")
            .len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a notice to every subscriber, in order. Failures are logged
    /// and skipped.
    pub fn notify(&self, notice: &ChangeNotice) {
        let subscribers = self.subscribers.read().expect("subscriber lock poisoned");
        for (id, subscriber) in subscribers.iter() {
            if let Err(err) = subscriber(notice) {
                warn!(
                    subscription = id.0,
                    kind = %notice.kind,
                    error = %err,
                    "subscriber failed; continuing delivery"
                );
            }
        }
    }
}
