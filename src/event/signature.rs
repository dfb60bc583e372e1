//! Event content signatures.
//!
//! A signature is a deterministic hash of an event's identity-defining
//! fields: normalized title, calendar date (day granularity, never the
//! time), child reference, and event type. Two events with the same
//! signature are candidates for merge, not automatically merged — the
//! deduplication engine refines candidates with a time-proximity check.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::extraction::{ChildRef, EventType};

/// Compute the content signature of an event.
pub fn event_signature(
    title: &str,
    date: NaiveDate,
    child_ref: Option<&ChildRef>,
    event_type: EventType,
) -> String {
    let material = format!(
        "{}|{}|{}|{}",
        normalize_title(title),
        date.format("%Y-%m-%d"),
        child_ref.map(|c| c.id.as_str()).unwrap_or("-"),
        event_type.as_key(),
    );

    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Normalize a title for hashing: lower-case, trimmed, internal whitespace
/// collapsed to single spaces.
fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
