//! Event deduplication.
//!
//! Two-stage duplicate check: a cheap signature filter, then a
//! time-proximity refinement. The signature alone over-matches — it is
//! day-granular, so a re-entered event with a slightly different time
//! still matches, but so do legitimately distinct occurrences on the same
//! day. Only signature matches whose start times fall within the proximity
//! window count as true duplicates; a weekly recurring event's occurrences
//! land on different dates and never share a signature at all.

use chrono::Duration;

use super::types::StandardizedEvent;

/// Outcome of a dedup-gated insert.
#[derive(Debug, Clone)]
pub struct DedupResult {
    /// The persisted record: the existing event when a duplicate was
    /// found, otherwise the newly inserted one.
    pub event: StandardizedEvent,
    /// True when the insert was short-circuited by an existing duplicate.
    pub is_duplicate: bool,
}

/// The duplicate-detection engine.
#[derive(Debug, Clone, Copy)]
pub struct DeduplicationEngine {
    /// Signature matches with start times within this window of the
    /// candidate are true duplicates.
    proximity: Duration,
}

impl Default for DeduplicationEngine {
    fn default() -> Self {
        Self::new(3)
    }
}

impl DeduplicationEngine {
    /// Create an engine with the given proximity window in hours.
    pub fn new(proximity_hours: u32) -> Self {
        Self {
            proximity: Duration::hours(proximity_hours as i64),
        }
    }

    /// Find the true duplicate of `candidate` among `existing`, if any.
    ///
    /// `existing` is expected to be same-family events; signature equality
    /// is re-checked here regardless. Among several true duplicates the one
    /// closest in time to the candidate is selected.
    pub fn find_duplicate<'a>(
        &self,
        candidate: &StandardizedEvent,
        existing: &'a [StandardizedEvent],
    ) -> Option<&'a StandardizedEvent> {
        existing
            .iter()
            .filter(|e| e.universal_id != candidate.universal_id)
            .filter(|e| e.family_id == candidate.family_id)
            .filter(|e| e.event_signature == candidate.event_signature)
            .filter(|e| self.distance(candidate, e) <= self.proximity)
            .min_by_key(|e| self.distance(candidate, e))
    }

    fn distance(&self, a: &StandardizedEvent, b: &StandardizedEvent) -> Duration {
        let delta = a.start.date_time - b.start.date_time;
        if delta < Duration::zero() {
            -delta
        } else {
            delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimezoneConfig;
    use crate::event::standardize::EventStandardizer;
    use crate::event::types::EventDraft;
    use crate::extraction::{ChildRef, EventType, Region};
    use chrono::{NaiveDate, NaiveDateTime};

    fn instant(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 12)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn event_at(date_time: NaiveDateTime) -> StandardizedEvent {
        let standardizer = EventStandardizer::new(TimezoneConfig::default());
        standardizer.standardize(EventDraft {
            family_id: Some("fam-1".to_string()),
            title: Some("Emma's Birthday".to_string()),
            event_type: Some(EventType::Birthday),
            date_time: Some(date_time),
            child_ref: Some(ChildRef {
                id: "c1".to_string(),
                name: "Emma".to_string(),
            }),
            region: Some(Region::Us),
            ..Default::default()
        })
    }

    #[test]
    fn test_same_day_within_window_is_duplicate() {
        // A re-entered event two hours off (say a defaulted time against
        // the real one) collapses into the existing record.
        let engine = DeduplicationEngine::default();
        let existing = vec![event_at(instant(14, 0))];
        let candidate = event_at(instant(16, 0));
        assert!(engine.find_duplicate(&candidate, &existing).is_some());
    }

    #[test]
    fn test_three_and_a_half_hours_apart_is_distinct() {
        // Same child, same title, same day, 3.5 hours apart: signatures
        // match but the proximity refinement keeps them distinct.
        let engine = DeduplicationEngine::default();
        let existing = vec![event_at(instant(10, 0))];
        let candidate = event_at(instant(13, 30));
        assert!(engine.find_duplicate(&candidate, &existing).is_none());
    }

    #[test]
    fn test_exactly_three_hours_is_duplicate() {
        let engine = DeduplicationEngine::default();
        let existing = vec![event_at(instant(10, 0))];
        let candidate = event_at(instant(13, 0));
        assert!(engine.find_duplicate(&candidate, &existing).is_some());
    }

    #[test]
    fn test_weekly_occurrences_never_share_a_signature() {
        let engine = DeduplicationEngine::default();
        let existing = vec![event_at(instant(14, 0))];
        let next_week = NaiveDate::from_ymd_opt(2026, 4, 19)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let candidate = event_at(next_week);
        assert!(engine.find_duplicate(&candidate, &existing).is_none());
    }

    #[test]
    fn test_closest_duplicate_selected() {
        let engine = DeduplicationEngine::default();
        let existing = vec![event_at(instant(12, 0)), event_at(instant(15, 0))];
        let candidate = event_at(instant(14, 0));
        let found = engine.find_duplicate(&candidate, &existing).unwrap();
        assert_eq!(found.start.date_time, instant(15, 0));
    }

    #[test]
    fn test_different_family_never_duplicates() {
        let engine = DeduplicationEngine::default();
        let mut other_family = event_at(instant(14, 0));
        other_family.family_id = "fam-2".to_string();
        let existing = vec![other_family];
        let candidate = event_at(instant(14, 0));
        assert!(engine.find_duplicate(&candidate, &existing).is_none());
    }

    #[test]
    fn test_different_signature_never_duplicates() {
        let engine = DeduplicationEngine::default();
        let standardizer = EventStandardizer::new(TimezoneConfig::default());
        let other = standardizer.standardize(EventDraft {
            family_id: Some("fam-1".to_string()),
            title: Some("Soccer Practice".to_string()),
            event_type: Some(EventType::Sports),
            date_time: Some(instant(14, 0)),
            ..Default::default()
        });
        let existing = vec![other];
        let candidate = event_at(instant(14, 0));
        assert!(engine.find_duplicate(&candidate, &existing).is_none());
    }

    #[test]
    fn test_candidate_never_duplicates_itself() {
        let engine = DeduplicationEngine::default();
        let event = event_at(instant(14, 0));
        let existing = vec![event.clone()];
        assert!(engine.find_duplicate(&event, &existing).is_none());
    }
}
