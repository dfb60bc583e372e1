//! Entity extraction: location, person references, birthday details, notes,
//! attending parent, and recurrence rules.
//!
//! Every sub-extractor is a miss-tolerant pattern pass: finding nothing
//! returns `None` and downstream stages proceed with partial data.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{ChildRef, FamilyContext, Recurrence, RecurrencePattern};

// ============================================================================
// Result Types
// ============================================================================

/// Birthday host details: "Anna fyller 6", "Emma's 7th birthday".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayInfo {
    /// The birthday child's name as written.
    pub name: String,
    /// Age being turned, when the pattern carried one.
    pub age: Option<u32>,
}

/// The parent attending the event, resolved against known members when
/// possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Member id when the name matched a known household member.
    pub id: Option<String>,
    /// The name or word that identified the parent ("Lisa", "mamma").
    pub name: String,
}

/// Everything the entity pass found. All fields are optional by design.
#[derive(Debug, Clone, Default)]
pub struct ExtractedEntities {
    pub location: Option<String>,
    pub child_ref: Option<ChildRef>,
    pub birthday: Option<BirthdayInfo>,
    pub notes: Option<String>,
    pub attending_parent: Option<ParentRef>,
    pub recurrence: Option<Recurrence>,
}

// ============================================================================
// Patterns
// ============================================================================

/// Explicit location markers, tried in order; first match wins. The `at`
/// pattern refuses a leading digit so times ("at 2:00 PM") fall through to
/// the next occurrence.
static LOCATION_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bat\s+([^\s\d][^,.!?\n]{0,60})").unwrap(),
        Regex::new(r"(?i)\blocation:\s*([^,.!?\n]{1,60})").unwrap(),
        Regex::new(r"(?i)\bvenue:\s*([^,.!?\n]{1,60})").unwrap(),
        Regex::new(r"\bhos\s+(\p{Lu}[\p{L}]*(?:\s+\p{Lu}[\p{L}]*)?)").unwrap(),
    ]
});

/// Known venue keywords used when no explicit marker is present. An
/// optional preceding capitalized word is kept ("Central Park").
static VENUE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:\p{Lu}[\p{L}]*\s+)?(?:park|parken|museum|museet|gym|pool|badhus|library|biblioteket|playground|lekplats|arena|hall|rink))\b",
    )
    .unwrap()
});

/// Words that terminate a location phrase when the marker capture ran past
/// the venue into date/time text.
static LOCATION_CUTOFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:on|at|kl\.?|klockan|den|from|från|with|med)\s.*$|\s*\d.*$").unwrap()
});

/// Birthday host patterns. Names are capitalized words matched verbatim.
static BIRTHDAY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Emma is turning 7"
        Regex::new(r"(\p{Lu}[\p{L}]+)\s+is\s+turning\s+(\d{1,2})\b").unwrap(),
        // "Emma's 7th birthday"
        Regex::new(r"(\p{Lu}[\p{L}]+)'s\s+(\d{1,2})(?:st|nd|rd|th)\s+[Bb]irthday").unwrap(),
        // "Anna som fyller 6", "Anna fyller 6"
        Regex::new(r"(\p{Lu}[\p{L}]+)(?:\s+som)?\s+fyller\s+(\d{1,2})\b").unwrap(),
    ]
});

/// Ageless fallback: "Emma's birthday".
static BIRTHDAY_NO_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Lu}[\p{L}]+)'s\s+[Bb]irthday").unwrap());

/// Note markers; every occurrence is captured, not just the first.
static NOTE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:note:|obs:|please remember to|don't forget(?:\s+to)?|bring|ta med|glöm inte(?:\s+att)?)\s*([^.!?\n]+)",
    )
    .unwrap()
});

/// Generic attending-parent words when no known member name matches.
static PARENT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(mom|mum|dad|mamma|pappa)\b\s+(?:will\s+take|takes|is\s+taking|följer\s+med|kör|kommer\s+med)")
        .unwrap()
});

/// Recurrence phrases: "every monday", "varje tisdag", "weekly".
static EVERY_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:every|varje)\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday|måndag|tisdag|onsdag|torsdag|fredag|lördag|söndag)\b",
    )
    .unwrap()
});

static FREQUENCY_TERMS: LazyLock<Vec<(Regex, RecurrencePattern)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(?:weekly|varje vecka)\b").unwrap(),
            RecurrencePattern::Weekly,
        ),
        (
            Regex::new(r"(?i)\b(?:daily|varje dag)\b").unwrap(),
            RecurrencePattern::Daily,
        ),
        (
            Regex::new(r"(?i)\b(?:monthly|varje månad)\b").unwrap(),
            RecurrencePattern::Monthly,
        ),
    ]
});

// ============================================================================
// Extractor
// ============================================================================

/// Pattern-based entity extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    /// Create a new entity extractor.
    pub fn new() -> Self {
        Self
    }

    /// Run every sub-extractor over `text`.
    pub fn extract(&self, text: &str, context: &FamilyContext) -> ExtractedEntities {
        ExtractedEntities {
            location: self.extract_location(text),
            child_ref: self.match_child(text, context),
            birthday: self.extract_birthday(text),
            notes: self.extract_notes(text),
            attending_parent: self.extract_attending_parent(text, context),
            recurrence: self.extract_recurrence(text),
        }
    }

    /// Location: explicit markers in order, first match wins, then
    /// venue-keyword fallback.
    pub fn extract_location(&self, text: &str) -> Option<String> {
        for marker in LOCATION_MARKERS.iter() {
            if let Some(cap) = marker.captures(text) {
                let cleaned = clean_location(&cap[1]);
                if !cleaned.is_empty() {
                    return Some(cleaned);
                }
            }
        }

        VENUE_KEYWORD
            .captures(text)
            .map(|cap| clean_location(&cap[1]))
            .filter(|loc| !loc.is_empty())
    }

    /// Child reference: each known child's name checked as a whole-word
    /// verbatim match, in registration order; first match wins. No fuzzy
    /// matching.
    pub fn match_child(&self, text: &str, context: &FamilyContext) -> Option<ChildRef> {
        for child in &context.children {
            let pattern = format!(r"\b{}\b", regex::escape(&child.name));
            let re = Regex::new(&pattern).ok()?;
            if re.is_match(text) {
                return Some(child.clone());
            }
        }
        None
    }

    /// Birthday host: "X is turning N", "X's Nth birthday", "X fyller N".
    pub fn extract_birthday(&self, text: &str) -> Option<BirthdayInfo> {
        for pattern in BIRTHDAY_PATTERNS.iter() {
            if let Some(cap) = pattern.captures(text) {
                let age = cap[2].parse::<u32>().ok();
                return Some(BirthdayInfo {
                    name: cap[1].to_string(),
                    age,
                });
            }
        }

        BIRTHDAY_NO_AGE.captures(text).map(|cap| BirthdayInfo {
            name: cap[1].to_string(),
            age: None,
        })
    }

    /// Notes: every marker occurrence captured and period-joined.
    pub fn extract_notes(&self, text: &str) -> Option<String> {
        let parts: Vec<String> = NOTE_MARKERS
            .captures_iter(text)
            .map(|cap| cap[1].trim().trim_end_matches([',', ';']).to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(". "))
        }
    }

    /// Attending parent: a known member's name matched verbatim wins,
    /// otherwise a generic parent word with take/drive phrasing.
    pub fn extract_attending_parent(
        &self,
        text: &str,
        context: &FamilyContext,
    ) -> Option<ParentRef> {
        for member in &context.members {
            let pattern = format!(r"\b{}\b", regex::escape(&member.name));
            let re = Regex::new(&pattern).ok()?;
            if re.is_match(text) {
                return Some(ParentRef {
                    id: Some(member.id.clone()),
                    name: member.name.clone(),
                });
            }
        }

        PARENT_WORDS.captures(text).map(|cap| ParentRef {
            id: None,
            name: cap[1].to_lowercase(),
        })
    }

    /// Recurrence rule, for the flows that carry one.
    pub fn extract_recurrence(&self, text: &str) -> Option<Recurrence> {
        if let Some(cap) = EVERY_WEEKDAY.captures(text) {
            return Some(Recurrence::weekly_on(weekday_index(&cap[1])));
        }

        for (re, pattern) in FREQUENCY_TERMS.iter() {
            if re.is_match(text) {
                return Some(Recurrence {
                    pattern: *pattern,
                    weekday: None,
                });
            }
        }

        None
    }
}

/// Trim, de-punctuate, and cut a location phrase at trailing date/time text.
fn clean_location(raw: &str) -> String {
    let cut = LOCATION_CUTOFF.replace(raw, "");
    cut.trim()
        .trim_end_matches(['.', ',', '!', '?', ':', ';'])
        .trim()
        .to_string()
}

/// Map a weekday word (English or Swedish) to 0=Mon .. 6=Sun.
fn weekday_index(word: &str) -> u8 {
    match word.to_lowercase().as_str() {
        "monday" | "måndag" => 0,
        "tuesday" | "tisdag" => 1,
        "wednesday" | "onsdag" => 2,
        "thursday" | "torsdag" => 3,
        "friday" | "fredag" => 4,
        "saturday" | "lördag" => 5,
        _ => 6,
    }
}
