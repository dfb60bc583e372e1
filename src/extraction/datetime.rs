//! Date and time extraction.
//!
//! Locates a date token (region-specific numeric, natural-language month
//! name, or relative term) and a time token, combines them, and substitutes
//! deterministic defaults when either is missing. The output is always a
//! concrete instant, never null.
//!
//! Precedence:
//! 1. Region-specific numeric date (`DD/MM` for SE, `MM/DD` for US)
//! 2. Month-name + day (English and Swedish names, region-independent)
//! 3. Relative terms (today/tomorrow, idag/imorgon, weekday names)
//! 4. Region-specific time, with the other region's pattern as fallback
//! 5. Per-event-type default time
//! 6. Year-less dates strictly in the past roll forward one year

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

use super::types::{EventType, Region};

// ============================================================================
// Patterns
// ============================================================================

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").expect("invalid numeric date pattern")
});

/// Month names and abbreviations, English and Swedish. Abbreviations sit
/// after the full names they prefix so word boundaries keep them apart.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("januari", 1),
    ("jan", 1),
    ("february", 2),
    ("februari", 2),
    ("feb", 2),
    ("march", 3),
    ("mars", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("maj", 5),
    ("june", 6),
    ("juni", 6),
    ("jun", 6),
    ("july", 7),
    ("juli", 7),
    ("jul", 7),
    ("august", 8),
    ("augusti", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oktober", 10),
    ("okt", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Month-name-first: "April 12", "April 12th, 2026".
static MONTH_FIRST: LazyLock<Vec<(Regex, u32)>> = LazyLock::new(|| {
    MONTH_NAMES
        .iter()
        .map(|(name, num)| {
            let re = Regex::new(&format!(
                r"(?i)\b{}\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s*(\d{{4}}))?\b",
                name
            ))
            .expect("invalid month pattern");
            (re, *num)
        })
        .collect()
});

/// Day-first: "12 april", "12:e april", "12th of April 2026".
static DAY_FIRST: LazyLock<Vec<(Regex, u32)>> = LazyLock::new(|| {
    MONTH_NAMES
        .iter()
        .map(|(name, num)| {
            let re = Regex::new(&format!(
                r"(?i)\b(\d{{1,2}})(?::e|st|nd|rd|th)?(?:\s+of)?\s+{}(?:\s+(\d{{4}}))?\b",
                name
            ))
            .expect("invalid month pattern");
            (re, *num)
        })
        .collect()
});

/// Simple relative terms with day offsets, English and Swedish. Longer
/// phrases come first so they win over their own substrings.
const RELATIVE_TERMS: &[(&str, i64)] = &[
    ("day after tomorrow", 2),
    ("i övermorgon", 2),
    ("övermorgon", 2),
    ("tomorrow", 1),
    ("i morgon", 1),
    ("imorgon", 1),
    ("today", 0),
    ("i dag", 0),
    ("idag", 0),
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("måndag", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("tisdag", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("onsdag", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("torsdag", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("fredag", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("lördag", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("söndag", Weekday::Sun),
];

/// 24-hour clock: "14:00", "14.00", "kl. 14.00", "klockan 9:30". The
/// optional trailing meridiem capture lets the scanner skip 12-hour values
/// so they fall through to the cross-region pattern.
static TIME_24H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:kl\.?\s*|klockan\s+)?([01]?\d|2[0-3])[:.]([0-5]\d)(\s*(?:a\.m\.|p\.m\.|am\b|pm\b))?")
        .expect("invalid 24h time pattern")
});

/// 12-hour clock: "2 pm", "2:00 PM", "11am".
static TIME_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::([0-5]\d))?\s*(a\.m\.|p\.m\.|am\b|pm\b)")
        .expect("invalid 12h time pattern")
});

// ============================================================================
// Extractor
// ============================================================================

/// A located date with provenance the roll-forward rule needs.
#[derive(Debug, Clone, Copy)]
struct FoundDate {
    date: NaiveDate,
    year_explicit: bool,
    /// Byte offset in the text, for earliest-match-wins selection.
    position: usize,
}

/// The resolved instant plus whether each half was actually located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDateTime {
    /// The combined date and time in local wall-clock terms.
    pub date_time: NaiveDateTime,
    /// False when the date was defaulted to the reference date.
    pub date_found: bool,
    /// False when the time was defaulted from the event type.
    pub time_found: bool,
}

/// Extractor for one concrete date-time per input.
pub struct DateTimeExtractor {
    /// Reference date for relative terms and the roll-forward rule
    /// (defaults to today).
    reference_date: NaiveDate,
}

impl Default for DateTimeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DateTimeExtractor {
    /// Create an extractor with today as the reference date.
    pub fn new() -> Self {
        Self {
            reference_date: Local::now().date_naive(),
        }
    }

    /// Create an extractor with a fixed reference date.
    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Extract one concrete date-time from `text`.
    pub fn extract(&self, text: &str, region: Region, event_type: EventType) -> ResolvedDateTime {
        let found_date = self
            .find_numeric_date(text, region)
            .or_else(|| self.find_month_name_date(text))
            .or_else(|| self.find_relative_date(text));

        let found_time = self.find_time(text, region);

        let time = found_time.unwrap_or_else(|| event_type.default_time());
        let date = found_date.map(|f| f.date).unwrap_or(self.reference_date);
        let year_explicit = found_date.map(|f| f.year_explicit).unwrap_or(false);

        // A year-less date strictly in the past means the next occurrence.
        // Same-day-but-earlier-time results are preserved unchanged.
        let date = if !year_explicit && date < self.reference_date {
            roll_year_forward(date)
        } else {
            date
        };

        ResolvedDateTime {
            date_time: NaiveDateTime::new(date, time),
            date_found: found_date.is_some(),
            time_found: found_time.is_some(),
        }
    }

    /// Step 1: region-specific numeric date. Malformed groups (month 13,
    /// day 32) are rejected silently and scanning continues.
    fn find_numeric_date(&self, text: &str, region: Region) -> Option<FoundDate> {
        for cap in NUMERIC_DATE.captures_iter(text) {
            let first: u32 = cap[1].parse().ok()?;
            let second: u32 = cap[2].parse().ok()?;
            let (day, month) = match region {
                Region::Se => (first, second),
                Region::Us => (second, first),
            };

            let (year, year_explicit) = match cap.get(3) {
                Some(m) => {
                    let raw: i32 = m.as_str().parse().ok()?;
                    // Two-digit years window to 2000+.
                    let year = if raw < 100 { 2000 + raw } else { raw };
                    (year, true)
                }
                None => (self.reference_date.year(), false),
            };

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(FoundDate {
                    date,
                    year_explicit,
                    position: cap.get(0).unwrap().start(),
                });
            }
        }
        None
    }

    /// Step 2: month-name date, region-independent, earliest match wins.
    fn find_month_name_date(&self, text: &str) -> Option<FoundDate> {
        let mut candidates: Vec<FoundDate> = Vec::new();

        for (re, month) in MONTH_FIRST.iter().chain(DAY_FIRST.iter()) {
            for cap in re.captures_iter(text) {
                let Ok(day) = cap[1].parse::<u32>() else {
                    continue;
                };
                let year = cap.get(2).and_then(|m| m.as_str().parse::<i32>().ok());
                let year_explicit = year.is_some();
                let year = year.unwrap_or(self.reference_date.year());

                if let Some(date) = NaiveDate::from_ymd_opt(year, *month, day) {
                    candidates.push(FoundDate {
                        date,
                        year_explicit,
                        position: cap.get(0).unwrap().start(),
                    });
                }
            }
        }

        candidates.into_iter().min_by_key(|f| f.position)
    }

    /// Step 3: relative terms and weekday names.
    fn find_relative_date(&self, text: &str) -> Option<FoundDate> {
        let text_lower = text.to_lowercase();

        for (term, days) in RELATIVE_TERMS {
            if let Some(pos) = text_lower.find(term) {
                return Some(FoundDate {
                    date: self.reference_date + Duration::days(*days),
                    year_explicit: false,
                    position: pos,
                });
            }
        }

        for (name, weekday) in WEEKDAYS {
            let next_re = Regex::new(&format!(r"(?i)\b(next|nästa)\s+{}\b", name))
                .expect("invalid weekday pattern");
            if let Some(m) = next_re.find(text) {
                return Some(FoundDate {
                    date: self.next_weekday(*weekday, true),
                    year_explicit: false,
                    position: m.start(),
                });
            }

            let bare_re =
                Regex::new(&format!(r"(?i)\b(?:on\s+|på\s+)?{}\b", name)).expect("invalid pattern");
            if let Some(m) = bare_re.find(text) {
                return Some(FoundDate {
                    date: self.next_weekday(*weekday, false),
                    year_explicit: false,
                    position: m.start(),
                });
            }
        }

        None
    }

    /// Step 4: region-specific time with the other region's pattern as a
    /// fallback, so mixed-convention input still resolves.
    fn find_time(&self, text: &str, region: Region) -> Option<NaiveTime> {
        match region {
            Region::Se => Self::find_time_24h(text).or_else(|| Self::find_time_12h(text)),
            Region::Us => Self::find_time_12h(text).or_else(|| Self::find_time_24h(text)),
        }
    }

    fn find_time_24h(text: &str) -> Option<NaiveTime> {
        for cap in TIME_24H.captures_iter(text) {
            // A trailing am/pm means this is a 12-hour value; leave it for
            // the 12-hour pattern.
            if cap.get(3).is_some() {
                continue;
            }
            let hour: u32 = cap[1].parse().ok()?;
            let minute: u32 = cap[2].parse().ok()?;
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                return Some(time);
            }
        }
        None
    }

    fn find_time_12h(text: &str) -> Option<NaiveTime> {
        for cap in TIME_12H.captures_iter(text) {
            let mut hour: u32 = cap[1].parse().ok()?;
            if hour == 0 || hour > 12 {
                continue;
            }
            let minute: u32 = cap
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            let period = cap[3].to_lowercase();
            if period.starts_with('p') && hour != 12 {
                hour += 12;
            } else if period.starts_with('a') && hour == 12 {
                hour = 0;
            }
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                return Some(time);
            }
        }
        None
    }

    /// Next occurrence of `target`, today included unless `skip_this_week`.
    fn next_weekday(&self, target: Weekday, skip_this_week: bool) -> NaiveDate {
        let current = self.reference_date.weekday().num_days_from_monday();
        let wanted = target.num_days_from_monday();

        let mut days_ahead = if wanted >= current {
            (wanted - current) as i64
        } else {
            (7 - current + wanted) as i64
        };
        if skip_this_week && days_ahead < 7 {
            days_ahead += 7;
        }

        self.reference_date + Duration::days(days_ahead)
    }
}

/// Advance a date one year, clamping Feb 29 to Feb 28.
fn roll_year_forward(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + 1, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(date.year() + 1, date.month(), 28))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor_at(year: i32, month: u32, day: u32) -> DateTimeExtractor {
        DateTimeExtractor::with_reference_date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    #[test]
    fn test_us_numeric_date_is_month_first() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract(
            "party on 4/12 at 2:00 PM",
            Region::Us,
            EventType::Birthday,
        );
        assert_eq!(
            resolved.date_time,
            NaiveDate::from_ymd_opt(2026, 4, 12)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
        assert!(resolved.date_found);
        assert!(resolved.time_found);
    }

    #[test]
    fn test_se_numeric_date_is_day_first() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("den 12/4 kl. 14.00", Region::Se, EventType::Birthday);
        assert_eq!(
            resolved.date_time,
            NaiveDate::from_ymd_opt(2026, 4, 12)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_two_digit_year_windows_to_2000() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("4/12/27", Region::Us, EventType::Event);
        assert_eq!(resolved.date_time.date().year(), 2027);
    }

    #[test]
    fn test_invalid_numeric_date_falls_through_to_month_name() {
        // Month 13 is rejected by the numeric matcher; the month-name
        // matcher picks up the real date instead.
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("13/32 oh wait, May 5", Region::Us, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()
        );
        assert!(resolved.date_found);
    }

    #[test]
    fn test_day_32_never_produces_a_date() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("1/32", Region::Us, EventType::Event);
        assert!(!resolved.date_found);
        assert_eq!(resolved.date_time.date(), NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
    }

    #[test]
    fn test_swedish_month_name_day_first() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("den 12 april", Region::Se, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 4, 12).unwrap()
        );
    }

    #[test]
    fn test_relative_tomorrow() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("tomorrow at 3pm", Region::Us, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()
        );
        assert_eq!(resolved.date_time.time(), NaiveTime::from_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn test_swedish_weekday() {
        // 2026-01-10 is a Saturday; "på fredag" means the coming Friday.
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("på fredag", Region::Se, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 1, 16).unwrap()
        );
    }

    #[test]
    fn test_next_weekday_skips_this_week() {
        // 2026-01-10 is a Saturday; "next monday" skips Jan 12 for Jan 19.
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("next monday", Region::Us, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 1, 19).unwrap()
        );
    }

    #[test]
    fn test_default_time_is_pure_function_of_type() {
        let extractor = extractor_at(2026, 1, 10);
        let birthday = extractor.extract("party on 4/12", Region::Us, EventType::Birthday);
        let doctor = extractor.extract("checkup on 4/12", Region::Us, EventType::Doctor);
        let sports = extractor.extract("match on 4/12", Region::Us, EventType::Sports);
        let other = extractor.extract("thing on 4/12", Region::Us, EventType::Event);

        assert!(!birthday.time_found);
        assert_eq!(birthday.date_time.time(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert_eq!(doctor.date_time.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(sports.date_time.time(), NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(other.date_time.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_cross_region_time_fallback() {
        // SE region text carrying a 12-hour time still resolves.
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("den 12/4, 2:30 pm", Region::Se, EventType::Event);
        assert_eq!(resolved.date_time.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());

        // US region text carrying a 24-hour time still resolves.
        let resolved = extractor.extract("4/12 at 18:30", Region::Us, EventType::Event);
        assert_eq!(resolved.date_time.time(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    }

    #[test]
    fn test_past_date_rolls_year_forward() {
        // Reference is June; an April date without a year means next April.
        let extractor = extractor_at(2026, 6, 15);
        let resolved = extractor.extract("party on 4/12", Region::Us, EventType::Birthday);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2027, 4, 12).unwrap()
        );
    }

    #[test]
    fn test_same_day_earlier_time_is_preserved() {
        let extractor = extractor_at(2026, 6, 15);
        let resolved = extractor.extract("today at 6:00 am", Region::Us, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
        );
        assert_eq!(resolved.date_time.time(), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn test_explicit_year_in_past_is_kept() {
        let extractor = extractor_at(2026, 6, 15);
        let resolved = extractor.extract("4/12/2024", Region::Us, EventType::Event);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2024, 4, 12).unwrap()
        );
    }

    #[test]
    fn test_no_date_defaults_to_reference_date() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("at 2pm somewhere", Region::Us, EventType::Event);
        assert!(!resolved.date_found);
        assert_eq!(
            resolved.date_time.date(),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
        );
    }

    #[test]
    fn test_noon_12h_conversion() {
        let extractor = extractor_at(2026, 1, 10);
        let noon = extractor.extract("at 12 pm", Region::Us, EventType::Event);
        assert_eq!(noon.date_time.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let midnight = extractor.extract("at 12 am", Region::Us, EventType::Event);
        assert_eq!(midnight.date_time.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_kl_prefix_time() {
        let extractor = extractor_at(2026, 1, 10);
        let resolved = extractor.extract("kl. 14:00", Region::Se, EventType::Event);
        assert_eq!(resolved.date_time.time(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }
}
