//! Event repository: persistence, advisory cache, and change notification.
//!
//! The repository is the single write path for canonical events. Every
//! insert is dedup-gated, every mutation is written through the cache and
//! announced to subscribers synchronously in registration order.

mod cache;
mod notify;
mod store;

pub use cache::{CacheStats, EventCache};
pub use notify::{ChangeKind, ChangeNotice, Subscriber, SubscriberRegistry, SubscriptionId};
pub use store::{EventStore, MemoryEventStore};

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::event::{
    DedupResult, DeduplicationEngine, EventDraft, EventStandardizer, EventUpdate,
    StandardizedEvent,
};

/// Repository over an event store.
pub struct EventRepository<S: EventStore> {
    store: Arc<S>,
    cache: EventCache,
    standardizer: EventStandardizer,
    dedup: DeduplicationEngine,
    dedup_enabled: bool,
    subscribers: SubscriberRegistry,
}

impl<S: EventStore> EventRepository<S> {
    /// Create a repository from configuration.
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            cache: EventCache::new(&config.cache),
            standardizer: EventStandardizer::new(config.timezone.clone()),
            dedup: DeduplicationEngine::new(config.dedup.proximity_hours),
            dedup_enabled: config.dedup.enabled,
            subscribers: SubscriberRegistry::new(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Standardize and persist a draft, with the duplicate check in front.
    ///
    /// A true duplicate short-circuits the insert and returns the existing
    /// record flagged `is_duplicate`.
    ///
    /// The signature query and the insert are two separate store calls
    /// with no lock held across them: two concurrent inserts with the same
    /// signature can both pass the check and both persist. The leftover
    /// pair is collapsed by [`Self::sweep_duplicates`] on a later pass.
    pub async fn create(&self, draft: EventDraft) -> Result<DedupResult> {
        let event = self.standardizer.standardize(draft);

        if self.dedup_enabled {
            let candidates = self
                .store
                .find_by_signature(&event.family_id, &event.event_signature)
                .await?;
            if let Some(existing) = self.dedup.find_duplicate(&event, &candidates) {
                info!(
                    universal_id = %existing.universal_id,
                    "duplicate insert short-circuited"
                );
                let existing = existing.clone();
                self.cache.insert(&existing).await;
                self.subscribers.notify(&ChangeNotice {
                    kind: ChangeKind::DuplicateDetected,
                    event: existing.clone(),
                });
                return Ok(DedupResult {
                    event: existing,
                    is_duplicate: true,
                });
            }
        }

        let event = self.store.insert(event).await?;
        self.cache.insert(&event).await;
        self.subscribers.notify(&ChangeNotice {
            kind: ChangeKind::Created,
            event: event.clone(),
        });
        debug!(universal_id = %event.universal_id, title = %event.title, "event created");

        Ok(DedupResult {
            event,
            is_duplicate: false,
        })
    }

    /// Apply an update to a persisted event.
    ///
    /// The record is re-standardized afterwards so the signature and the
    /// legacy date/time fields track the new content. Updating a deleted
    /// event is an error.
    pub async fn update(
        &self,
        universal_id: &str,
        update: EventUpdate,
    ) -> Result<StandardizedEvent> {
        let mut event = self
            .store
            .get(universal_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(universal_id.to_string()))?;

        update.apply_to(&mut event);
        let event = self.standardizer.standardize(event.into_draft());

        let event = self.store.put(event).await?;
        self.cache.insert(&event).await;
        self.subscribers.notify(&ChangeNotice {
            kind: ChangeKind::Updated,
            event: event.clone(),
        });
        debug!(universal_id = %event.universal_id, "event updated");

        Ok(event)
    }

    /// Delete a persisted event.
    pub async fn delete(&self, universal_id: &str) -> Result<()> {
        let existing = self.store.get(universal_id).await?;
        self.store.delete(universal_id).await?;
        self.cache.invalidate(universal_id).await;

        if let Some(event) = existing {
            self.subscribers.notify(&ChangeNotice {
                kind: ChangeKind::Deleted,
                event,
            });
        }
        debug!(universal_id, "event deleted");
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get an event, cache first.
    pub async fn get(&self, universal_id: &str) -> Result<Option<StandardizedEvent>> {
        if let Some(cached) = self.cache.get(universal_id).await {
            return Ok(Some((*cached).clone()));
        }

        let event = self.store.get(universal_id).await?;
        if let Some(ref event) = event {
            self.cache.insert(event).await;
        }
        Ok(event)
    }

    /// All events of a family, sorted by start.
    pub async fn list_family(&self, family_id: &str) -> Result<Vec<StandardizedEvent>> {
        self.store.list_family(family_id).await
    }

    /// A family's events starting within `[from, to)`.
    pub async fn list_range(
        &self,
        family_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<StandardizedEvent>> {
        self.store.list_range(family_id, from, to).await
    }

    /// Events of a family sharing a signature.
    pub async fn find_by_signature(
        &self,
        family_id: &str,
        signature: &str,
    ) -> Result<Vec<StandardizedEvent>> {
        self.store.find_by_signature(family_id, signature).await
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Read-time corrective pass for duplicates that slipped past the
    /// insert check (see [`Self::create`]). The earliest-created record in
    /// each duplicate cluster survives. Returns how many were removed.
    pub async fn sweep_duplicates(&self, family_id: &str) -> Result<usize> {
        let mut events = self.store.list_family(family_id).await?;
        events.sort_by_key(|e| e.created_at);

        let mut kept: Vec<StandardizedEvent> = Vec::new();
        let mut removed = 0;

        for event in events {
            if self.dedup.find_duplicate(&event, &kept).is_some() {
                self.delete(&event.universal_id).await?;
                removed += 1;
            } else {
                kept.push(event);
            }
        }

        if removed > 0 {
            info!(family_id, removed, "duplicate sweep collapsed events");
        }
        Ok(removed)
    }

    /// Drop every cache entry; the store is untouched.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Cache hit/miss counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Register a change subscriber.
    pub fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        self.subscribers.subscribe(subscriber)
    }

    /// Remove a change subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
