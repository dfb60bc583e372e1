//! Writing-convention region detection.
//!
//! Scores input text against two disjoint sets of weighted indicators to
//! decide whether dates and times should be read month-first/12-hour (US)
//! or day-first/24-hour (SE). Indicators are declarative data: adding a
//! locale means adding a table, not new code paths.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Region;

// ============================================================================
// Indicator Tables
// ============================================================================

/// A single region indicator: a pattern plus a fixed positive weight.
///
/// Weights are not uniform. Structural indicators (an explicit 24-hour
/// "kl." marker, an unambiguous 24-hour clock value) score higher than a
/// single vocabulary word. The "kl." marker carries a weight exceeding the
/// combined weight of the entire opposing vocabulary so that its presence
/// settles the region on its own.
struct Indicator {
    name: &'static str,
    weight: u32,
    pattern: Regex,
}

impl Indicator {
    fn new(name: &'static str, weight: u32, pattern: &str) -> Self {
        Self {
            name,
            weight,
            pattern: Regex::new(pattern).expect("invalid region indicator pattern"),
        }
    }
}

static SE_INDICATORS: LazyLock<Vec<Indicator>> = LazyLock::new(|| {
    vec![
        // Structural
        Indicator::new("kl-clock", 10, r"(?i)\bkl\.?\s*\d{1,2}[:.]\d{2}"),
        Indicator::new("dot-clock", 2, r"\b([01]?\d|2[0-3])\.[0-5]\d\b"),
        Indicator::new("24h-clock", 3, r"\b(1[3-9]|2[0-3]):[0-5]\d\b"),
        Indicator::new("den-date", 2, r"(?i)\bden\s+\d{1,2}/\d{1,2}"),
        Indicator::new("klockan", 2, r"(?i)\bklockan\b"),
        // Vocabulary
        Indicator::new("fyller", 2, r"(?i)\bfyller\b"),
        Indicator::new("kalas", 2, r"(?i)\bkalas\b"),
        Indicator::new("valkommen", 1, r"(?i)\bvälkommen\b"),
        Indicator::new("firar", 1, r"(?i)\bfirar\b"),
        Indicator::new("traning", 1, r"(?i)\bträning\b"),
        Indicator::new("lakare", 1, r"(?i)\b(tand)?läkar\p{L}*\b"),
        Indicator::new("relative-sv", 1, r"(?i)\b(imorgon|idag|övermorgon)\b"),
        Indicator::new(
            "weekday-sv",
            1,
            r"(?i)\b(måndag|tisdag|onsdag|torsdag|fredag|lördag|söndag)\b",
        ),
    ]
});

static US_INDICATORS: LazyLock<Vec<Indicator>> = LazyLock::new(|| {
    vec![
        // Structural
        Indicator::new(
            "am-pm",
            3,
            r"(?i)\b\d{1,2}(:[0-5]\d)?\s*(am|pm|a\.m\.|p\.m\.)\b",
        ),
        Indicator::new("o-clock", 2, r"(?i)\b\d{1,2}\s*o'?clock\b"),
        // Vocabulary
        Indicator::new("birthday", 1, r"(?i)\bbirthday\b"),
        Indicator::new("party", 1, r"(?i)\bparty\b"),
        Indicator::new("turning", 1, r"(?i)\bturning\b"),
        Indicator::new("appointment", 1, r"(?i)\bappointment\b"),
        Indicator::new("practice", 1, r"(?i)\bpractice\b"),
        Indicator::new("playdate", 1, r"(?i)\bplay\s?date\b"),
        Indicator::new("rsvp", 1, r"(?i)\brsvp\b"),
        Indicator::new("invited", 1, r"(?i)\binvited\b"),
        Indicator::new(
            "weekday-en",
            1,
            r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        ),
    ]
});

// ============================================================================
// Region Detector
// ============================================================================

/// Per-region scores from a detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionScores {
    pub us: u32,
    pub se: u32,
}

/// Detector for the writing-convention region of input text.
///
/// Total: always returns a region, defaulting to `US` on an exact tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionDetector;

impl RegionDetector {
    /// Create a new region detector.
    pub fn new() -> Self {
        Self
    }

    /// Detect the writing-convention region of `text`.
    pub fn detect(&self, text: &str) -> Region {
        let scores = self.scores(text);
        if scores.se > scores.us {
            Region::Se
        } else {
            Region::Us
        }
    }

    /// Score `text` against both indicator tables.
    ///
    /// Each indicator counts once regardless of how often it matches.
    pub fn scores(&self, text: &str) -> RegionScores {
        RegionScores {
            us: Self::score_table(&US_INDICATORS, text),
            se: Self::score_table(&SE_INDICATORS, text),
        }
    }

    fn score_table(indicators: &[Indicator], text: &str) -> u32 {
        indicators
            .iter()
            .filter(|ind| ind.pattern.is_match(text))
            .inspect(|ind| {
                tracing::trace!(indicator = ind.name, weight = ind.weight, "region indicator")
            })
            .map(|ind| ind.weight)
            .sum()
    }
}
