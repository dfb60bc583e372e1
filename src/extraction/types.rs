//! Core types for the extraction pipeline.
//!
//! This module defines the input and output shapes of the text-understanding
//! pipeline: raw input with family context, the extracted event record, and
//! the supporting enums for event categories and writing-convention regions.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Region
// ============================================================================

/// A writing-convention profile inferred from text, not a geographic location.
///
/// Controls date order (month-first vs day-first) and clock style (12-hour
/// vs 24-hour) during date/time extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// Month-first dates, 12-hour clock, English vocabulary.
    #[default]
    Us,
    /// Day-first dates, 24-hour clock, Swedish vocabulary.
    Se,
}

impl Region {
    /// Get a short display tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Se => "SE",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Event Type
// ============================================================================

/// Category of a family calendar event.
///
/// The variant order is the classifier's declared order: on equal keyword
/// scores the earliest variant wins. Changing the order changes tie-break
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A birthday party or celebration.
    Birthday,
    /// A dental appointment.
    Dental,
    /// A doctor or medical appointment.
    Doctor,
    /// A playdate with another child.
    Playdate,
    /// Sports practice, games, or matches.
    Sports,
    /// Music lessons or recitals.
    Music,
    /// Dance classes or performances.
    Dance,
    /// School events (meetings, conferences, open houses).
    School,
    /// Camp sessions.
    Camp,
    /// Tutoring sessions.
    Tutoring,
    /// Art classes or workshops.
    Art,
    /// Coding or robotics classes.
    Coding,
    /// An overnight sleepover.
    Sleepover,
    /// A family gathering.
    Family,
    /// A religious service or activity.
    Religious,
    /// A community activity.
    Community,
    /// A generic appointment not promoted to dental/doctor.
    Appointment,
    /// The generic fallback category.
    #[default]
    Event,
}

impl EventType {
    /// All categories in declaration order.
    pub const ALL: [EventType; 18] = [
        EventType::Birthday,
        EventType::Dental,
        EventType::Doctor,
        EventType::Playdate,
        EventType::Sports,
        EventType::Music,
        EventType::Dance,
        EventType::School,
        EventType::Camp,
        EventType::Tutoring,
        EventType::Art,
        EventType::Coding,
        EventType::Sleepover,
        EventType::Family,
        EventType::Religious,
        EventType::Community,
        EventType::Appointment,
        EventType::Event,
    ];

    /// Stable snake_case key, used in signatures and wire payloads.
    pub fn as_key(&self) -> &'static str {
        match self {
            EventType::Birthday => "birthday",
            EventType::Dental => "dental",
            EventType::Doctor => "doctor",
            EventType::Playdate => "playdate",
            EventType::Sports => "sports",
            EventType::Music => "music",
            EventType::Dance => "dance",
            EventType::School => "school",
            EventType::Camp => "camp",
            EventType::Tutoring => "tutoring",
            EventType::Art => "art",
            EventType::Coding => "coding",
            EventType::Sleepover => "sleepover",
            EventType::Family => "family",
            EventType::Religious => "religious",
            EventType::Community => "community",
            EventType::Appointment => "appointment",
            EventType::Event => "event",
        }
    }

    /// Get a human-readable display name, used in generated titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            EventType::Birthday => "Birthday",
            EventType::Dental => "Dentist Appointment",
            EventType::Doctor => "Doctor Appointment",
            EventType::Playdate => "Playdate",
            EventType::Sports => "Sports",
            EventType::Music => "Music Lesson",
            EventType::Dance => "Dance Class",
            EventType::School => "School Event",
            EventType::Camp => "Camp",
            EventType::Tutoring => "Tutoring",
            EventType::Art => "Art Class",
            EventType::Coding => "Coding Class",
            EventType::Sleepover => "Sleepover",
            EventType::Family => "Family Gathering",
            EventType::Religious => "Religious Activity",
            EventType::Community => "Community Activity",
            EventType::Appointment => "Appointment",
            EventType::Event => "Event",
        }
    }

    /// Default start time substituted when no time could be extracted.
    ///
    /// A pure function of the event type: birthdays default to mid-afternoon,
    /// medical appointments to mid-morning, sports to after school, and
    /// everything else to noon.
    pub fn default_time(&self) -> NaiveTime {
        let (hour, minute) = match self {
            EventType::Birthday => (14, 0),
            EventType::Dental | EventType::Doctor => (10, 0),
            EventType::Sports => (16, 0),
            _ => (12, 0),
        };
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid default time")
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Family Context
// ============================================================================

/// A reference to a known child in the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChildRef {
    /// Stable child identifier.
    pub id: String,
    /// The child's name as registered by the family.
    pub name: String,
}

/// A reference to the host of an event (e.g. the birthday child).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HostRef {
    /// The host's name as it appeared in the text.
    pub name: String,
}

/// A household member (parent or guardian).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FamilyMember {
    /// Stable member identifier.
    pub id: String,
    /// The member's name.
    pub name: String,
    /// Role within the household (e.g. "parent", "guardian").
    pub role: String,
}

/// Read-only household context supplied by the caller per request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FamilyContext {
    /// The family this input belongs to.
    pub family_id: String,
    /// Known children, in registration order; child matching checks them
    /// in this order and the first verbatim match wins.
    #[serde(default)]
    pub children: Vec<ChildRef>,
    /// Known household members.
    #[serde(default)]
    pub members: Vec<FamilyMember>,
}

impl FamilyContext {
    /// Create a context for a family with no registered children.
    pub fn new(family_id: impl Into<String>) -> Self {
        Self {
            family_id: family_id.into(),
            children: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Add a known child.
    pub fn with_child(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.children.push(ChildRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Add a known household member.
    pub fn with_member(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        self.members.push(FamilyMember {
            id: id.into(),
            name: name.into(),
            role: role.into(),
        });
        self
    }
}

// ============================================================================
// Raw Input
// ============================================================================

/// Unstructured input to the pipeline. Transient: created per user action
/// and discarded after extraction, surviving only as the `original_text`
/// audit field on the resulting event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInput {
    /// Free-form text: chat message, email body, or OCR output.
    pub text: String,
    /// Original image bytes when the text came from OCR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<Vec<u8>>,
    /// Household context for child/member matching.
    pub family_context: FamilyContext,
}

impl RawInput {
    /// Create a text-only input.
    pub fn text(text: impl Into<String>, family_context: FamilyContext) -> Self {
        Self {
            text: text.into(),
            source_image: None,
            family_context,
        }
    }
}

// ============================================================================
// Recurrence
// ============================================================================

/// Frequency of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

/// A recurrence rule detected in text, for the entry flows that carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Recurrence {
    /// The recurrence frequency.
    pub pattern: RecurrencePattern,
    /// Day of week for weekly patterns (0=Mon .. 6=Sun).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
}

impl Recurrence {
    /// Weekly recurrence on a specific day (0=Mon .. 6=Sun).
    pub fn weekly_on(weekday: u8) -> Self {
        Self {
            pattern: RecurrencePattern::Weekly,
            weekday: Some(weekday),
        }
    }

    /// Weekly recurrence with no fixed day.
    pub fn weekly() -> Self {
        Self {
            pattern: RecurrencePattern::Weekly,
            weekday: None,
        }
    }
}

// ============================================================================
// Extracted Event
// ============================================================================

/// Output of the extraction pipeline, pre-standardization.
///
/// `date_time` is always a concrete instant: when no date or time could be
/// located, deterministic defaults are substituted, never null.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedEvent {
    /// The classified event category.
    pub event_type: EventType,
    /// Event title, generated when none is explicit.
    pub title: String,
    /// The resolved instant in local wall-clock time.
    pub date_time: NaiveDateTime,
    /// Whether a date token was actually located (false means defaulted).
    #[serde(default)]
    pub date_found: bool,
    /// Whether a time token was actually located (false means defaulted).
    #[serde(default)]
    pub time_found: bool,
    /// Event location, if one was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// The household child this event is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_ref: Option<ChildRef>,
    /// The event host (e.g. the birthday child).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ref: Option<HostRef>,
    /// Free-form extras: birthday child name/age, attending parent, notes.
    #[serde(default)]
    pub extra_details: HashMap<String, serde_json::Value>,
    /// Recurrence rule, when the flow detects one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// The inferred writing-convention region.
    pub region: Region,
    /// Completeness score in 0..=1, used to gate auto-accept vs review.
    pub confidence: f32,
    /// The raw input text, preserved for audit and manual review.
    pub original_text: String,
}

impl ExtractedEvent {
    /// Well-known extra-detail key: birthday child name.
    pub const DETAIL_BIRTHDAY_CHILD_NAME: &'static str = "birthday_child_name";
    /// Well-known extra-detail key: birthday child age.
    pub const DETAIL_BIRTHDAY_CHILD_AGE: &'static str = "birthday_child_age";
    /// Well-known extra-detail key: attending parent id.
    pub const DETAIL_ATTENDING_PARENT_ID: &'static str = "attending_parent_id";
    /// Well-known extra-detail key: attending parent name.
    pub const DETAIL_ATTENDING_PARENT_NAME: &'static str = "attending_parent_name";
    /// Well-known extra-detail key: free-text notes.
    pub const DETAIL_NOTES: &'static str = "notes";

    /// Read a string-valued extra detail.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.extra_details.get(key).and_then(|v| v.as_str())
    }

    /// Read an integer-valued extra detail.
    pub fn detail_i64(&self, key: &str) -> Option<i64> {
        self.extra_details.get(key).and_then(|v| v.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_times_by_type() {
        assert_eq!(
            EventType::Birthday.default_time(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap()
        );
        assert_eq!(
            EventType::Doctor.default_time(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            EventType::Dental.default_time(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            EventType::Sports.default_time(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
        assert_eq!(
            EventType::Playdate.default_time(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_region_default_is_us() {
        assert_eq!(Region::default(), Region::Us);
    }

    #[test]
    fn test_family_context_builder() {
        let ctx = FamilyContext::new("fam-1")
            .with_child("c1", "Emma")
            .with_member("m1", "Lisa", "parent");
        assert_eq!(ctx.children.len(), 1);
        assert_eq!(ctx.children[0].name, "Emma");
        assert_eq!(ctx.members[0].role, "parent");
    }

    #[test]
    fn test_event_type_serde_names() {
        let json = serde_json::to_string(&EventType::Dental).unwrap();
        assert_eq!(json, "\"dental\"");
        let back: EventType = serde_json::from_str("\"sleepover\"").unwrap();
        assert_eq!(back, EventType::Sleepover);
    }
}
