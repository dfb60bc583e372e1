//! Canonical event types.
//!
//! `StandardizedEvent` is the one persisted shape every entry path funnels
//! into. `EventDraft` is the loose, all-optional input the standardizer
//! accepts; `CalendarEventOutput` is what downstream consumers receive.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::extraction::{ChildRef, EventType, ExtractedEvent, HostRef, Recurrence, Region};

// ============================================================================
// Standardized Event
// ============================================================================

/// An instant with its timezone name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EventDateTime {
    /// Local wall-clock date and time.
    pub date_time: NaiveDateTime,
    /// IANA timezone name, e.g. "Europe/Stockholm".
    pub time_zone: String,
}

/// The canonical, persisted event shape.
///
/// Invariants: `end.date_time > start.date_time`; `universal_id` is
/// immutable once assigned; `event_signature` is a pure function of the
/// normalized title, the calendar date, the child reference, and the event
/// type. The legacy `date`/`time` fields duplicate the start instant for
/// older callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StandardizedEvent {
    /// Storage document key.
    pub id: String,
    /// Stable identity independent of the storage key.
    pub universal_id: String,
    /// Content signature used for duplicate candidate lookup.
    pub event_signature: String,
    /// Owning family.
    pub family_id: String,
    /// Event title.
    pub title: String,
    /// Longer description, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Event category.
    pub event_type: EventType,
    /// Start instant.
    pub start: EventDateTime,
    /// End instant; defaults to start + 1 hour.
    pub end: EventDateTime,
    /// Event location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// The household child this event is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_ref: Option<ChildRef>,
    /// The event host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ref: Option<HostRef>,
    /// Attending parent, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attending_parent_id: Option<String>,
    /// Free-form extras carried through from extraction.
    #[serde(default)]
    pub extra_details: HashMap<String, serde_json::Value>,
    /// Recurrence rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Writing-convention region the event was extracted under.
    #[serde(default)]
    pub region: Region,
    /// Extraction confidence, 1.0 for manually entered events.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Raw input preserved for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// Legacy duplicate of the start date, "YYYY-MM-DD".
    pub date: String,
    /// Legacy duplicate of the start time, "HH:MM".
    pub time: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

fn default_confidence() -> f32 {
    1.0
}

impl StandardizedEvent {
    /// The start calendar date.
    pub fn start_date(&self) -> chrono::NaiveDate {
        self.start.date_time.date()
    }

    /// Loosen this event back into a draft (used for re-standardization
    /// and by update paths).
    pub fn into_draft(self) -> EventDraft {
        EventDraft {
            id: Some(self.id),
            universal_id: Some(self.universal_id),
            family_id: Some(self.family_id),
            title: Some(self.title),
            description: self.description,
            event_type: Some(self.event_type),
            date_time: Some(self.start.date_time),
            end_date_time: Some(self.end.date_time),
            time_zone: Some(self.start.time_zone),
            location: self.location,
            child_ref: self.child_ref,
            host_ref: self.host_ref,
            attending_parent_id: self.attending_parent_id,
            extra_details: self.extra_details,
            recurrence: self.recurrence,
            region: Some(self.region),
            confidence: Some(self.confidence),
            original_text: self.original_text,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

// ============================================================================
// Event Draft
// ============================================================================

/// A loosely-shaped event-like record: every field optional.
///
/// Any entry path — the extraction pipeline, a user confirmation edit, an
/// older caller with a partial payload — can produce one; the standardizer
/// fills in the invariants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    pub id: Option<String>,
    pub universal_id: Option<String>,
    pub family_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub date_time: Option<NaiveDateTime>,
    pub end_date_time: Option<NaiveDateTime>,
    pub time_zone: Option<String>,
    pub location: Option<String>,
    pub child_ref: Option<ChildRef>,
    pub host_ref: Option<HostRef>,
    pub attending_parent_id: Option<String>,
    #[serde(default)]
    pub extra_details: HashMap<String, serde_json::Value>,
    pub recurrence: Option<Recurrence>,
    pub region: Option<Region>,
    pub confidence: Option<f32>,
    pub original_text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventDraft {
    /// Draft from a pipeline extraction, scoped to a family.
    pub fn from_extracted(event: ExtractedEvent, family_id: impl Into<String>) -> Self {
        let attending_parent_id = event
            .detail_str(ExtractedEvent::DETAIL_ATTENDING_PARENT_ID)
            .map(|s| s.to_string());
        Self {
            family_id: Some(family_id.into()),
            title: Some(event.title),
            event_type: Some(event.event_type),
            date_time: Some(event.date_time),
            location: event.location,
            child_ref: event.child_ref,
            host_ref: event.host_ref,
            attending_parent_id,
            extra_details: event.extra_details,
            recurrence: event.recurrence,
            region: Some(event.region),
            confidence: Some(event.confidence),
            original_text: Some(event.original_text),
            ..Default::default()
        }
    }
}

impl From<ExtractedEvent> for EventDraft {
    fn from(event: ExtractedEvent) -> Self {
        Self::from_extracted(event, "")
    }
}

impl From<StandardizedEvent> for EventDraft {
    fn from(event: StandardizedEvent) -> Self {
        event.into_draft()
    }
}

// ============================================================================
// Event Update
// ============================================================================

/// Field-wise update applied to a persisted event during the confirmation
/// step or by explicit update calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_ref: Option<ChildRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attending_parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Clear any recurrence rule.
    #[serde(default)]
    pub clear_recurrence: bool,
}

impl EventUpdate {
    /// Apply this update to an event. The signature and legacy fields are
    /// recomputed by the standardizer afterwards, not here.
    pub fn apply_to(&self, event: &mut StandardizedEvent) {
        if let Some(ref title) = self.title {
            event.title = title.clone();
        }
        if let Some(ref description) = self.description {
            event.description = Some(description.clone());
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(start) = self.start {
            event.start.date_time = start;
        }
        if let Some(end) = self.end {
            event.end.date_time = end;
        }
        if let Some(ref location) = self.location {
            event.location = Some(location.clone());
        }
        if let Some(ref child_ref) = self.child_ref {
            event.child_ref = Some(child_ref.clone());
        }
        if let Some(ref parent) = self.attending_parent_id {
            event.attending_parent_id = Some(parent.clone());
        }
        if let Some(ref recurrence) = self.recurrence {
            event.recurrence = Some(recurrence.clone());
        }
        if self.clear_recurrence {
            event.recurrence = None;
        }
        event.updated_at = Utc::now();
    }
}

// ============================================================================
// Calendar Output Schema
// ============================================================================

/// The wire shape downstream calendar consumers receive.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalendarEventOutput {
    /// Duplicate of `title` for consumers that expect a summary field.
    pub summary: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attending_parent_id: Option<String>,
    #[serde(default)]
    pub extra_details: HashMap<String, serde_json::Value>,
}

impl From<&StandardizedEvent> for CalendarEventOutput {
    fn from(event: &StandardizedEvent) -> Self {
        Self {
            summary: event.title.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            start: event.start.clone(),
            end: event.end.clone(),
            event_type: event.event_type,
            child_id: event.child_ref.as_ref().map(|c| c.id.clone()),
            child_name: event.child_ref.as_ref().map(|c| c.name.clone()),
            attending_parent_id: event.attending_parent_id.clone(),
            extra_details: event.extra_details.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> StandardizedEvent {
        let start = NaiveDate::from_ymd_opt(2026, 4, 12)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        StandardizedEvent {
            id: "evt-1".to_string(),
            universal_id: "u-1".to_string(),
            event_signature: "sig".to_string(),
            family_id: "fam-1".to_string(),
            title: "Emma's 7th Birthday".to_string(),
            description: None,
            event_type: EventType::Birthday,
            start: EventDateTime {
                date_time: start,
                time_zone: "America/New_York".to_string(),
            },
            end: EventDateTime {
                date_time: start + chrono::Duration::hours(1),
                time_zone: "America/New_York".to_string(),
            },
            location: Some("Pizza Palace".to_string()),
            child_ref: Some(ChildRef {
                id: "c1".to_string(),
                name: "Emma".to_string(),
            }),
            host_ref: None,
            attending_parent_id: None,
            extra_details: HashMap::new(),
            recurrence: None,
            region: Region::Us,
            confidence: 1.0,
            original_text: None,
            date: "2026-04-12".to_string(),
            time: "14:00".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_output_schema_mirrors_event() {
        let event = sample();
        let output = CalendarEventOutput::from(&event);
        assert_eq!(output.summary, output.title);
        assert_eq!(output.child_id.as_deref(), Some("c1"));
        assert_eq!(output.child_name.as_deref(), Some("Emma"));
        assert_eq!(output.start, event.start);
    }

    #[test]
    fn test_update_apply() {
        let mut event = sample();
        let update = EventUpdate {
            title: Some("Emma's Party".to_string()),
            location: Some("Home".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut event);
        assert_eq!(event.title, "Emma's Party");
        assert_eq!(event.location.as_deref(), Some("Home"));
    }

    #[test]
    fn test_draft_roundtrip_keeps_identity() {
        let event = sample();
        let universal_id = event.universal_id.clone();
        let draft: EventDraft = event.into();
        assert_eq!(draft.universal_id.as_deref(), Some(universal_id.as_str()));
        assert!(draft.created_at.is_some());
    }
}
