//! Event standardization.
//!
//! A pure function from any event-like draft to the canonical
//! `StandardizedEvent` shape. Missing fields are substituted with the
//! documented invariants, and standardizing an already-standardized event
//! returns an equivalent value.

use chrono::{Duration, NaiveDateTime, Utc};

use crate::config::TimezoneConfig;
use crate::extraction::Region;

use super::signature::event_signature;
use super::types::{EventDateTime, EventDraft, StandardizedEvent};

/// Standardizer for event records.
///
/// Every entry path — pipeline output, user edits, legacy payloads — goes
/// through the same instance so canonical records are shaped identically
/// regardless of source.
#[derive(Debug, Clone)]
pub struct EventStandardizer {
    timezones: TimezoneConfig,
}

impl Default for EventStandardizer {
    fn default() -> Self {
        Self::new(TimezoneConfig::default())
    }
}

impl EventStandardizer {
    /// Create a standardizer with the given per-region timezones.
    pub fn new(timezones: TimezoneConfig) -> Self {
        Self { timezones }
    }

    /// Standardize a draft into the canonical shape.
    pub fn standardize(&self, draft: EventDraft) -> StandardizedEvent {
        let region = draft.region.unwrap_or_default();
        let event_type = draft.event_type.unwrap_or_default();

        let title = match draft.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => "New Event".to_string(),
        };

        // The extractor contract guarantees a concrete instant, but the
        // standardizer still tolerates its absence.
        let start_dt = draft.date_time.unwrap_or_else(default_instant);

        // end > start, defaulting to one hour after start.
        let end_dt = match draft.end_date_time {
            Some(end) if end > start_dt => end,
            _ => start_dt + Duration::hours(1),
        };

        let time_zone = draft.time_zone.unwrap_or_else(|| match region {
            Region::Se => self.timezones.se.clone(),
            Region::Us => self.timezones.us.clone(),
        });

        // Universal id is minted exactly once and never changes after.
        let universal_id = draft
            .universal_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let id = draft.id.unwrap_or_else(|| universal_id.clone());

        let signature = event_signature(
            &title,
            start_dt.date(),
            draft.child_ref.as_ref(),
            event_type,
        );

        let created_at = draft.created_at.unwrap_or_else(Utc::now);
        let updated_at = draft.updated_at.unwrap_or(created_at);

        StandardizedEvent {
            id,
            universal_id,
            event_signature: signature,
            family_id: draft.family_id.unwrap_or_default(),
            title,
            description: draft.description,
            event_type,
            start: EventDateTime {
                date_time: start_dt,
                time_zone: time_zone.clone(),
            },
            end: EventDateTime {
                date_time: end_dt,
                time_zone,
            },
            location: draft.location,
            child_ref: draft.child_ref,
            host_ref: draft.host_ref,
            attending_parent_id: draft.attending_parent_id,
            extra_details: draft.extra_details,
            recurrence: draft.recurrence,
            region,
            confidence: draft.confidence.unwrap_or(1.0),
            original_text: draft.original_text,
            date: start_dt.date().format("%Y-%m-%d").to_string(),
            time: start_dt.time().format("%H:%M").to_string(),
            created_at,
            updated_at,
        }
    }
}

/// Fallback instant for drafts with no date at all: today at noon.
fn default_instant() -> NaiveDateTime {
    Utc::now()
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .expect("valid noon")
}
