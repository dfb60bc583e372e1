//! The text-understanding pipeline.
//!
//! One entry path for every source — chat text, forwarded email bodies,
//! OCR'd invitations — behind a single
//! [`ExtractionPipeline::extract`] call: region detection and event-type
//! classification first (independent of each other), then date/time
//! resolution (which needs both), then entity extraction, assembly, and
//! confidence scoring.
//!
//! The pipeline is synchronous and side-effect-free; independent inputs can
//! be processed fully in parallel with no shared state.

mod assemble;
mod classify;
mod confidence;
mod datetime;
mod entities;
mod region;
mod types;

pub use assemble::EventAssembler;
pub use classify::{EventTypeClassifier, TypeClassification};
pub use confidence::ConfidenceScorer;
pub use datetime::{DateTimeExtractor, ResolvedDateTime};
pub use entities::{BirthdayInfo, EntityExtractor, ExtractedEntities, ParentRef};
pub use region::{RegionDetector, RegionScores};
pub use types::{
    ChildRef, EventType, ExtractedEvent, FamilyContext, FamilyMember, HostRef, RawInput,
    Recurrence, RecurrencePattern, Region,
};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ExtractionError, Result};

/// The extraction pipeline: raw text plus family context in, one
/// `ExtractedEvent` out.
pub struct ExtractionPipeline {
    region_detector: RegionDetector,
    classifier: EventTypeClassifier,
    datetime: DateTimeExtractor,
    entities: EntityExtractor,
    assembler: EventAssembler,
    scorer: ConfidenceScorer,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionPipeline {
    /// Create a pipeline with today as the date-resolution reference.
    pub fn new() -> Self {
        Self {
            region_detector: RegionDetector::new(),
            classifier: EventTypeClassifier::new(),
            datetime: DateTimeExtractor::new(),
            entities: EntityExtractor::new(),
            assembler: EventAssembler::new(),
            scorer: ConfidenceScorer::new(),
        }
    }

    /// Create a pipeline with a fixed reference date, for deterministic
    /// resolution of relative and year-less dates.
    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self {
            datetime: DateTimeExtractor::with_reference_date(reference_date),
            ..Self::new()
        }
    }

    /// Extract a structured event from free-form text.
    ///
    /// Sub-extractor misses degrade the record instead of failing it; the
    /// only error here is input the pipeline cannot work with at all.
    pub fn extract(&self, text: &str, context: &FamilyContext) -> Result<ExtractedEvent> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput.into());
        }

        let region = self.region_detector.detect(text);
        let classification = self.classifier.classify(text);
        let resolved = self
            .datetime
            .extract(text, region, classification.event_type);
        let entities = self.entities.extract(text, context);

        let mut event = self
            .assembler
            .assemble(&classification, &resolved, &entities, region, text);
        event.confidence = self.scorer.score(&event);

        debug!(
            event_type = %event.event_type,
            region = %event.region,
            confidence = event.confidence,
            "extracted event"
        );

        Ok(event)
    }

    /// Extract from a full `RawInput`.
    pub fn extract_input(&self, input: &RawInput) -> Result<ExtractedEvent> {
        self.extract(&input.text, &input.family_context)
    }
}
