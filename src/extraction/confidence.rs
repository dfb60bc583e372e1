//! Completeness scoring for extracted events.
//!
//! A weighted checklist over the extracted fields, normalized by the sum of
//! the weights that were applicable. The score is purely a routing signal:
//! below a caller-chosen threshold the record should be surfaced for human
//! confirmation rather than silently committed.

use super::types::{EventType, ExtractedEvent};

/// One scoring rule: a weight plus what earns it.
struct Rule {
    name: &'static str,
    weight: f32,
    earned: fn(&ExtractedEvent) -> bool,
    applicable: fn(&ExtractedEvent) -> bool,
}

fn always(_: &ExtractedEvent) -> bool {
    true
}

/// Scoring table. The host/birthday-child weight only applies where such a
/// reference could have been extracted at all: birthday events, or a
/// context that supplied known children.
const RULES: [Rule; 5] = [
    Rule {
        name: "event_type",
        weight: 0.2,
        earned: |e| e.event_type != EventType::Event,
        applicable: always,
    },
    Rule {
        name: "title",
        weight: 0.2,
        earned: |e| !e.title.is_empty() && e.title != "New Event",
        applicable: always,
    },
    Rule {
        name: "date_time_found",
        weight: 0.3,
        earned: |e| e.date_found,
        applicable: always,
    },
    Rule {
        name: "location",
        weight: 0.15,
        earned: |e| e.location.is_some(),
        applicable: always,
    },
    Rule {
        name: "person",
        weight: 0.15,
        earned: |e| e.host_ref.is_some() || e.child_ref.is_some(),
        applicable: |e| {
            e.event_type == EventType::Birthday || e.child_ref.is_some() || e.host_ref.is_some()
        },
    },
];

/// Completeness scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    /// Create a new scorer.
    pub fn new() -> Self {
        Self
    }

    /// Score an assembled event into 0..=1.
    pub fn score(&self, event: &ExtractedEvent) -> f32 {
        let mut earned = 0.0;
        let mut applicable = 0.0;

        for rule in &RULES {
            if (rule.applicable)(event) {
                applicable += rule.weight;
                if (rule.earned)(event) {
                    earned += rule.weight;
                    tracing::trace!(rule = rule.name, weight = rule.weight, "confidence earned");
                }
            }
        }

        if applicable == 0.0 {
            0.0
        } else {
            earned / applicable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::types::{ChildRef, HostRef, Region};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn event() -> ExtractedEvent {
        ExtractedEvent {
            event_type: EventType::Event,
            title: "New Event".to_string(),
            date_time: NaiveDate::from_ymd_opt(2026, 4, 12)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            date_found: false,
            time_found: false,
            location: None,
            child_ref: None,
            host_ref: None,
            extra_details: HashMap::new(),
            recurrence: None,
            region: Region::Us,
            confidence: 0.0,
            original_text: String::new(),
        }
    }

    #[test]
    fn test_empty_extraction_scores_zero() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&event()), 0.0);
    }

    #[test]
    fn test_complete_birthday_scores_one() {
        let scorer = ConfidenceScorer::new();
        let mut e = event();
        e.event_type = EventType::Birthday;
        e.title = "Emma's 7th Birthday".to_string();
        e.date_found = true;
        e.location = Some("Pizza Palace".to_string());
        e.host_ref = Some(HostRef {
            name: "Emma".to_string(),
        });
        assert!((scorer.score(&e) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_defaulted_date_earns_nothing() {
        let scorer = ConfidenceScorer::new();
        let mut with_date = event();
        with_date.event_type = EventType::Sports;
        with_date.title = "Practice".to_string();
        with_date.date_found = true;

        let mut without_date = with_date.clone();
        without_date.date_found = false;

        assert!(scorer.score(&with_date) > scorer.score(&without_date));
    }

    #[test]
    fn test_person_weight_not_applicable_without_context() {
        // A non-birthday event with no child or host reference is scored
        // out of the remaining 0.85 weight, not penalized for the person
        // slot it never could have filled.
        let scorer = ConfidenceScorer::new();
        let mut e = event();
        e.event_type = EventType::Sports;
        e.title = "Practice".to_string();
        e.date_found = true;
        e.location = Some("Field 2".to_string());
        // earned 0.85 of applicable 0.85
        assert!((scorer.score(&e) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_person_weight_applicable_for_birthday() {
        // A birthday without an identified child is penalized for the
        // missing person slot.
        let scorer = ConfidenceScorer::new();
        let mut e = event();
        e.event_type = EventType::Birthday;
        e.title = "Birthday".to_string();
        e.date_found = true;
        e.location = Some("Home".to_string());
        let score = scorer.score(&e);
        assert!((score - 0.85).abs() < 0.001);
    }
}
