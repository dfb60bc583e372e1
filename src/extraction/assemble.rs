//! Event assembly.
//!
//! Combines the classifier, date/time, and entity outputs into one
//! `ExtractedEvent` and synthesizes a title when none is explicit. This is
//! the single title-generation policy; every entry path routes through it
//! so titles are consistent regardless of source.

use std::collections::HashMap;

use super::classify::TypeClassification;
use super::datetime::ResolvedDateTime;
use super::entities::ExtractedEntities;
use super::types::{EventType, ExtractedEvent, HostRef, Region};

/// Assembler for extracted event records.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventAssembler;

impl EventAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self
    }

    /// Combine pipeline outputs into one record.
    ///
    /// The confidence field is left at zero; the scorer fills it in.
    pub fn assemble(
        &self,
        classification: &TypeClassification,
        resolved: &ResolvedDateTime,
        entities: &ExtractedEntities,
        region: Region,
        original_text: &str,
    ) -> ExtractedEvent {
        let event_type = classification.event_type;
        let title = self.generate_title(event_type, entities);

        let mut extra_details: HashMap<String, serde_json::Value> = HashMap::new();
        if let Some(ref birthday) = entities.birthday {
            extra_details.insert(
                ExtractedEvent::DETAIL_BIRTHDAY_CHILD_NAME.to_string(),
                serde_json::json!(birthday.name),
            );
            if let Some(age) = birthday.age {
                extra_details.insert(
                    ExtractedEvent::DETAIL_BIRTHDAY_CHILD_AGE.to_string(),
                    serde_json::json!(age),
                );
            }
        }
        if let Some(ref parent) = entities.attending_parent {
            if let Some(ref id) = parent.id {
                extra_details.insert(
                    ExtractedEvent::DETAIL_ATTENDING_PARENT_ID.to_string(),
                    serde_json::json!(id),
                );
            }
            extra_details.insert(
                ExtractedEvent::DETAIL_ATTENDING_PARENT_NAME.to_string(),
                serde_json::json!(parent.name),
            );
        }
        if let Some(ref notes) = entities.notes {
            extra_details.insert(
                ExtractedEvent::DETAIL_NOTES.to_string(),
                serde_json::json!(notes),
            );
        }

        let host_ref = entities.birthday.as_ref().map(|b| HostRef {
            name: b.name.clone(),
        });

        ExtractedEvent {
            event_type,
            title,
            date_time: resolved.date_time,
            date_found: resolved.date_found,
            time_found: resolved.time_found,
            location: entities.location.clone(),
            child_ref: entities.child_ref.clone(),
            host_ref,
            extra_details,
            recurrence: entities.recurrence.clone(),
            region,
            confidence: 0.0,
            original_text: original_text.to_string(),
        }
    }

    /// Title policy:
    /// - birthday with a known birthday child: `"<Name>'s [Nth] Birthday"`
    /// - otherwise `"<Name>'s <EventTypeLabel>"` using the household child
    ///   or the host
    /// - `"New Event"` when neither could be identified
    fn generate_title(&self, event_type: EventType, entities: &ExtractedEntities) -> String {
        if event_type == EventType::Birthday {
            if let Some(ref birthday) = entities.birthday {
                return match birthday.age {
                    Some(age) => format!("{}'s {} Birthday", birthday.name, ordinal(age)),
                    None => format!("{}'s Birthday", birthday.name),
                };
            }
        }

        let name = entities
            .child_ref
            .as_ref()
            .map(|c| c.name.as_str())
            .or_else(|| entities.birthday.as_ref().map(|b| b.name.as_str()));

        match name {
            Some(name) => format!("{}'s {}", name, event_type.display_name()),
            None => "New Event".to_string(),
        }
    }
}

/// English ordinal suffix: 1st, 2nd, 3rd, 4th, ... 11th, 12th, 13th.
fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
