//! Event type classification.
//!
//! Each category owns a keyword table. Every literal substring match adds a
//! point, an exact word-boundary match adds a half-point bonus, and the
//! highest-scoring category wins. Tables are declarative data: new
//! categories or locales are additive.

use std::sync::LazyLock;

use regex::Regex;

use super::types::EventType;

// ============================================================================
// Category Tables
// ============================================================================

/// A keyword with its precompiled word-boundary form.
struct Keyword {
    literal: &'static str,
    boundary: Regex,
}

impl Keyword {
    fn new(literal: &'static str) -> Self {
        Self {
            literal,
            boundary: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(literal)))
                .expect("invalid keyword pattern"),
        }
    }
}

/// One category's keyword table.
struct CategoryRule {
    event_type: EventType,
    keywords: Vec<Keyword>,
}

fn rule(event_type: EventType, keywords: &[&'static str]) -> CategoryRule {
    CategoryRule {
        event_type,
        keywords: keywords.iter().map(|k| Keyword::new(k)).collect(),
    }
}

/// Category tables in declaration order.
///
/// The order is the tie-break: when two categories score equally, the one
/// declared earlier here wins. Keep this aligned with `EventType::ALL`.
static CATEGORY_RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    vec![
        rule(
            EventType::Birthday,
            &[
                "birthday", "bday", "party", "turning", "kalas", "fyller", "födelsedag",
            ],
        ),
        rule(
            EventType::Dental,
            &["dentist", "dental", "orthodontist", "braces", "tandläkare"],
        ),
        rule(
            EventType::Doctor,
            &[
                "doctor",
                "pediatrician",
                "checkup",
                "check-up",
                "vaccination",
                "läkare",
                "vårdcentral",
            ],
        ),
        rule(
            EventType::Playdate,
            &["playdate", "play date", "lekträff", "come over and play"],
        ),
        rule(
            EventType::Sports,
            &[
                "soccer",
                "football",
                "hockey",
                "basketball",
                "swim",
                "practice",
                "match",
                "game",
                "träning",
                "fotboll",
            ],
        ),
        rule(
            EventType::Music,
            &[
                "piano", "violin", "guitar", "recital", "music lesson", "musikskola",
            ],
        ),
        rule(EventType::Dance, &["dance", "ballet", "dans", "balett"]),
        rule(
            EventType::School,
            &[
                "school",
                "teacher",
                "parent-teacher",
                "open house",
                "skola",
                "föräldramöte",
                "utvecklingssamtal",
            ],
        ),
        rule(EventType::Camp, &["camp", "läger", "kollo"]),
        rule(
            EventType::Tutoring,
            &["tutor", "tutoring", "homework help", "läxhjälp"],
        ),
        rule(
            EventType::Art,
            &["art class", "painting", "pottery", "crafts", "målarkurs"],
        ),
        rule(
            EventType::Coding,
            &["coding", "robotics", "code club", "programmering", "scratch"],
        ),
        rule(
            EventType::Sleepover,
            &["sleepover", "sleep over", "pajama party", "övernattning"],
        ),
        rule(
            EventType::Family,
            &[
                "family dinner",
                "family gathering",
                "grandma",
                "grandpa",
                "mormor",
                "farmor",
                "morfar",
                "farfar",
                "släkten",
            ],
        ),
        rule(
            EventType::Religious,
            &[
                "church",
                "sunday school",
                "confirmation",
                "mosque",
                "synagogue",
                "kyrka",
                "konfirmation",
            ],
        ),
        rule(
            EventType::Community,
            &["scouts", "community", "library", "bibliotek"],
        ),
        rule(
            EventType::Appointment,
            &["appointment", "appt", "bokad tid", "besökstid"],
        ),
    ]
});

/// Co-occurring vocabulary that promotes a generic `appointment` match into
/// the dental sub-category.
static DENTAL_PROMOTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tooth|teeth|cleaning|cavity|filling|tand|tänder)\b")
        .expect("invalid promotion pattern")
});

/// Co-occurring vocabulary that promotes a generic `appointment` match into
/// the doctor sub-category.
static DOCTOR_PROMOTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(medical|clinic|physician|pediatric|health|hälsokontroll|sjuk)\b")
        .expect("invalid promotion pattern")
});

// ============================================================================
// Classifier
// ============================================================================

/// Result of a classification pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeClassification {
    /// The winning category, or the generic `Event` fallback.
    pub event_type: EventType,
    /// Raw keyword score of the winning category.
    pub score: f32,
    /// Score normalized into 0..=1.
    pub confidence: f32,
}

/// Keyword-table classifier for event categories.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTypeClassifier;

impl EventTypeClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify `text` into an event category.
    ///
    /// Falls back to the generic `event` category when no table reaches a
    /// single matched keyword.
    pub fn classify(&self, text: &str) -> TypeClassification {
        let text_lower = text.to_lowercase();

        let mut best: Option<(EventType, f32)> = None;
        for rule in CATEGORY_RULES.iter() {
            let score = Self::score_rule(rule, text, &text_lower);
            // Strictly-greater keeps the earliest declared category on ties.
            if score > best.map(|(_, s)| s).unwrap_or(0.0) {
                best = Some((rule.event_type, score));
            }
        }

        match best {
            Some((event_type, score)) if score >= 1.0 => {
                let event_type = self.promote(event_type, &text_lower);
                TypeClassification {
                    event_type,
                    score,
                    confidence: (score / 3.0).min(1.0),
                }
            }
            _ => TypeClassification {
                event_type: EventType::Event,
                score: 0.0,
                confidence: 0.0,
            },
        }
    }

    /// Score one category table: +1 per literal substring match, +0.5 bonus
    /// for a word-boundary-exact match. Each keyword counts once.
    fn score_rule(rule: &CategoryRule, text: &str, text_lower: &str) -> f32 {
        let mut score = 0.0;
        for kw in &rule.keywords {
            if text_lower.contains(kw.literal) {
                score += 1.0;
                if kw.boundary.is_match(text) {
                    score += 0.5;
                }
            }
        }
        score
    }

    /// Promote an `appointment`-flavored match into a medical sub-category
    /// when the surrounding vocabulary points there.
    fn promote(&self, event_type: EventType, text_lower: &str) -> EventType {
        if event_type != EventType::Appointment {
            return event_type;
        }
        if DENTAL_PROMOTION.is_match(text_lower) {
            EventType::Dental
        } else if DOCTOR_PROMOTION.is_match(text_lower) {
            EventType::Doctor
        } else {
            EventType::Appointment
        }
    }
}
