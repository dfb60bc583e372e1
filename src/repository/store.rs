//! Event storage trait and the in-memory implementation.
//!
//! The trait is the boundary to the external document store; the in-memory
//! implementation backs tests and single-process deployments. Records are
//! keyed by `universal_id`, with per-family and per-signature indexes for
//! the lookups the dedup engine needs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use crate::error::{Result, StorageError};
use crate::event::StandardizedEvent;

// ============================================================================
// EventStore Trait
// ============================================================================

/// Storage backend for standardized events.
///
/// Implementations must key records by `universal_id` and keep the
/// signature lookup cheap; the dedup engine calls it on every insert.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event. Fails if the universal id already exists.
    async fn insert(&self, event: StandardizedEvent) -> Result<StandardizedEvent>;

    /// Get an event by universal id.
    async fn get(&self, universal_id: &str) -> Result<Option<StandardizedEvent>>;

    /// Replace an existing event. Fails if the event is missing or was
    /// deleted — a deleted event cannot re-enter the updated state.
    async fn put(&self, event: StandardizedEvent) -> Result<StandardizedEvent>;

    /// Delete an event by universal id.
    async fn delete(&self, universal_id: &str) -> Result<()>;

    /// All events of a family sharing a signature.
    async fn find_by_signature(
        &self,
        family_id: &str,
        signature: &str,
    ) -> Result<Vec<StandardizedEvent>>;

    /// All events of a family, sorted by start time.
    async fn list_family(&self, family_id: &str) -> Result<Vec<StandardizedEvent>>;

    /// A family's events with a start instant inside `[from, to)`.
    async fn list_range(
        &self,
        family_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<StandardizedEvent>>;

    /// Remove all data.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Internal indexed data.
#[derive(Debug, Default)]
struct EventData {
    /// Events keyed by universal id.
    events: HashMap<String, StandardizedEvent>,
    /// Index: family id -> universal ids.
    by_family: HashMap<String, Vec<String>>,
    /// Index: (family id, signature) -> universal ids.
    by_signature: HashMap<(String, String), Vec<String>>,
    /// Tombstones for ids that were explicitly deleted.
    deleted: HashSet<String>,
}

impl EventData {
    fn index(&mut self, event: &StandardizedEvent) {
        self.by_family
            .entry(event.family_id.clone())
            .or_default()
            .push(event.universal_id.clone());
        self.by_signature
            .entry((event.family_id.clone(), event.event_signature.clone()))
            .or_default()
            .push(event.universal_id.clone());
    }

    fn unindex(&mut self, event: &StandardizedEvent) {
        if let Some(ids) = self.by_family.get_mut(&event.family_id) {
            ids.retain(|id| id != &event.universal_id);
        }
        if let Some(ids) = self
            .by_signature
            .get_mut(&(event.family_id.clone(), event.event_signature.clone()))
        {
            ids.retain(|id| id != &event.universal_id);
        }
    }
}

/// In-memory event store.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    data: RwLock<EventData>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: StandardizedEvent) -> Result<StandardizedEvent> {
        let mut data = self.data.write().await;
        if data.events.contains_key(&event.universal_id) {
            return Err(StorageError::InvalidOperation(format!(
                "event already exists: {}",
                event.universal_id
            ))
            .into());
        }
        data.deleted.remove(&event.universal_id);
        data.index(&event);
        data.events.insert(event.universal_id.clone(), event.clone());
        Ok(event)
    }

    async fn get(&self, universal_id: &str) -> Result<Option<StandardizedEvent>> {
        let data = self.data.read().await;
        Ok(data.events.get(universal_id).cloned())
    }

    async fn put(&self, event: StandardizedEvent) -> Result<StandardizedEvent> {
        let mut data = self.data.write().await;
        if data.deleted.contains(&event.universal_id) {
            return Err(StorageError::AlreadyDeleted(event.universal_id.clone()).into());
        }
        let Some(existing) = data.events.remove(&event.universal_id) else {
            return Err(StorageError::NotFound(event.universal_id.clone()).into());
        };
        // Re-index: the signature may have changed with the update.
        data.unindex(&existing);
        data.index(&event);
        data.events.insert(event.universal_id.clone(), event.clone());
        Ok(event)
    }

    async fn delete(&self, universal_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        if data.deleted.contains(universal_id) {
            return Err(StorageError::AlreadyDeleted(universal_id.to_string()).into());
        }
        let Some(event) = data.events.remove(universal_id) else {
            return Err(StorageError::NotFound(universal_id.to_string()).into());
        };
        data.unindex(&event);
        data.deleted.insert(universal_id.to_string());
        Ok(())
    }

    async fn find_by_signature(
        &self,
        family_id: &str,
        signature: &str,
    ) -> Result<Vec<StandardizedEvent>> {
        let data = self.data.read().await;
        let key = (family_id.to_string(), signature.to_string());
        let events = data
            .by_signature
            .get(&key)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| data.events.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(events)
    }

    async fn list_family(&self, family_id: &str) -> Result<Vec<StandardizedEvent>> {
        let data = self.data.read().await;
        let mut events: Vec<StandardizedEvent> = data
            .by_family
            .get(family_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| data.events.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by_key(|e| e.start.date_time);
        Ok(events)
    }

    async fn list_range(
        &self,
        family_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<StandardizedEvent>> {
        let events = self.list_family(family_id).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.start.date_time >= from && e.start.date_time < to)
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut data = self.data.write().await;
        *data = EventData::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, EventStandardizer};
    use crate::extraction::EventType;
    use chrono::NaiveDate;

    fn event(title: &str, hour: u32) -> StandardizedEvent {
        EventStandardizer::default().standardize(EventDraft {
            family_id: Some("fam-1".to_string()),
            title: Some(title.to_string()),
            event_type: Some(EventType::Sports),
            date_time: NaiveDate::from_ymd_opt(2026, 4, 12)
                .unwrap()
                .and_hms_opt(hour, 0, 0),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryEventStore::new();
        let e = store.insert(event("Practice", 16)).await.unwrap();
        let fetched = store.get(&e.universal_id).await.unwrap();
        assert_eq!(fetched.unwrap().title, "Practice");
    }

    #[tokio::test]
    async fn test_double_insert_rejected() {
        let store = MemoryEventStore::new();
        let e = store.insert(event("Practice", 16)).await.unwrap();
        assert!(store.insert(e).await.is_err());
    }

    #[tokio::test]
    async fn test_update_deleted_event_rejected() {
        let store = MemoryEventStore::new();
        let e = store.insert(event("Practice", 16)).await.unwrap();
        store.delete(&e.universal_id).await.unwrap();

        let err = store.put(e).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::HearthError::Storage(StorageError::AlreadyDeleted(_))
        ));
    }

    #[tokio::test]
    async fn test_double_delete_rejected() {
        let store = MemoryEventStore::new();
        let e = store.insert(event("Practice", 16)).await.unwrap();
        store.delete(&e.universal_id).await.unwrap();
        assert!(store.delete(&e.universal_id).await.is_err());
    }

    #[tokio::test]
    async fn test_signature_index() {
        let store = MemoryEventStore::new();
        let e = store.insert(event("Practice", 16)).await.unwrap();
        store.insert(event("Recital", 18)).await.unwrap();

        let found = store
            .find_by_signature("fam-1", &e.event_signature)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Practice");
    }

    #[tokio::test]
    async fn test_list_family_sorted_by_start() {
        let store = MemoryEventStore::new();
        store.insert(event("Late", 18)).await.unwrap();
        store.insert(event("Early", 9)).await.unwrap();

        let events = store.list_family("fam-1").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Early");
    }

    #[tokio::test]
    async fn test_list_range_is_half_open() {
        let store = MemoryEventStore::new();
        store.insert(event("Nine", 9)).await.unwrap();
        store.insert(event("Noon", 12)).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 4, 12).unwrap();
        let events = store
            .list_range(
                "fam-1",
                day.and_hms_opt(9, 0, 0).unwrap(),
                day.and_hms_opt(12, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Nine");
    }
}
