//! Intake coordination.
//!
//! The accept-vs-review decision, embodied once so the chat, email, and
//! OCR entry paths all behave identically: extract, score against the
//! configured threshold, then either standardize-dedup-persist or queue
//! the record for human confirmation with the raw text attached.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::event::{DedupResult, EventDraft};
use crate::extraction::{EventType, ExtractedEvent, ExtractionPipeline, FamilyContext};
use crate::repository::{EventRepository, EventStore};
use crate::review::{ReviewQueue, ReviewReason, ReviewTicket};

/// Outcome of one intake pass.
#[derive(Debug, Clone)]
pub enum IntakeOutcome {
    /// The event was committed (or collapsed into an existing duplicate).
    Accepted(DedupResult),
    /// The extraction was queued for manual review.
    NeedsReview(ReviewTicket),
}

/// Coordinator from raw text to a committed or queued event.
pub struct IntakeCoordinator<S: EventStore> {
    pipeline: ExtractionPipeline,
    repository: Arc<EventRepository<S>>,
    review: Arc<ReviewQueue>,
    confidence_threshold: f32,
}

impl<S: EventStore> IntakeCoordinator<S> {
    /// Create a coordinator over a repository and review queue.
    pub fn new(
        config: &Config,
        repository: Arc<EventRepository<S>>,
        review: Arc<ReviewQueue>,
    ) -> Self {
        Self {
            pipeline: ExtractionPipeline::new(),
            repository,
            review,
            confidence_threshold: config.review.confidence_threshold,
        }
    }

    /// Replace the pipeline (used by tests to pin the reference date).
    pub fn with_pipeline(mut self, pipeline: ExtractionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Ingest free-form text for a family.
    pub async fn ingest(&self, text: &str, context: &FamilyContext) -> Result<IntakeOutcome> {
        let extracted = self.pipeline.extract(text, context)?;

        if let Some(reason) = self.review_reason(&extracted) {
            info!(
                confidence = extracted.confidence,
                ?reason,
                "routing extraction to manual review"
            );
            let ticket = self
                .review
                .enqueue(context.family_id.as_str(), extracted, reason)
                .await;
            return Ok(IntakeOutcome::NeedsReview(ticket));
        }

        debug!(confidence = extracted.confidence, "committing extraction");
        let draft = EventDraft::from_extracted(extracted, context.family_id.as_str());
        let result = self.repository.create(draft).await?;
        Ok(IntakeOutcome::Accepted(result))
    }

    /// Commit a reviewed extraction after the user confirmed (and possibly
    /// edited) it. Consumes the pending ticket.
    pub async fn commit_reviewed(
        &self,
        ticket_id: &str,
        edited: Option<ExtractedEvent>,
    ) -> Result<DedupResult> {
        let ticket = self.review.resolve(ticket_id).await?;
        let extracted = edited.unwrap_or(ticket.extracted);
        let draft = EventDraft::from_extracted(extracted, ticket.family_id.as_str());
        self.repository.create(draft).await
    }

    /// Review routing rule: nothing usable at all, or below the threshold.
    fn review_reason(&self, extracted: &ExtractedEvent) -> Option<ReviewReason> {
        if !extracted.date_found && extracted.event_type == EventType::Event {
            return Some(ReviewReason::NothingUsable);
        }
        if extracted.confidence < self.confidence_threshold {
            return Some(ReviewReason::LowConfidence);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryEventStore;
    use chrono::NaiveDate;

    fn coordinator() -> IntakeCoordinator<MemoryEventStore> {
        let config = Config::default();
        let repository = Arc::new(EventRepository::new(
            Arc::new(MemoryEventStore::new()),
            &config,
        ));
        let review = Arc::new(ReviewQueue::new());
        IntakeCoordinator::new(&config, repository, review).with_pipeline(
            ExtractionPipeline::with_reference_date(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
        )
    }

    fn family() -> FamilyContext {
        FamilyContext::new("fam-1").with_child("c1", "Emma")
    }

    #[tokio::test]
    async fn test_confident_extraction_is_committed() {
        let coordinator = coordinator();
        let outcome = coordinator
            .ingest(
                "Emma's 7th birthday party on 4/12 at 2:00 PM at Pizza Palace",
                &family(),
            )
            .await
            .unwrap();

        match outcome {
            IntakeOutcome::Accepted(result) => {
                assert!(!result.is_duplicate);
                assert_eq!(result.event.title, "Emma's 7th Birthday");
                assert_eq!(result.event.family_id, "fam-1");
            }
            IntakeOutcome::NeedsReview(_) => panic!("expected acceptance"),
        }
    }

    #[tokio::test]
    async fn test_vague_text_is_queued_for_review() {
        let coordinator = coordinator();
        let outcome = coordinator.ingest("hello there", &family()).await.unwrap();

        match outcome {
            IntakeOutcome::NeedsReview(ticket) => {
                assert_eq!(ticket.extracted.original_text, "hello there");
                assert_eq!(ticket.reason, ReviewReason::NothingUsable);
            }
            IntakeOutcome::Accepted(_) => panic!("expected review routing"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_ingest_collapses() {
        let coordinator = coordinator();
        let text = "Emma's 7th birthday party on 4/12 at 2:00 PM at Pizza Palace";

        let first = coordinator.ingest(text, &family()).await.unwrap();
        let second = coordinator.ingest(text, &family()).await.unwrap();

        let (first, second) = match (first, second) {
            (IntakeOutcome::Accepted(a), IntakeOutcome::Accepted(b)) => (a, b),
            _ => panic!("expected two accepted outcomes"),
        };
        assert!(!first.is_duplicate);
        assert!(second.is_duplicate);
        assert_eq!(second.event.universal_id, first.event.universal_id);
    }

    #[tokio::test]
    async fn test_reviewed_ticket_can_be_committed() {
        let coordinator = coordinator();
        let outcome = coordinator.ingest("hello there", &family()).await.unwrap();
        let ticket = match outcome {
            IntakeOutcome::NeedsReview(ticket) => ticket,
            _ => panic!("expected review routing"),
        };

        let mut edited = ticket.extracted.clone();
        edited.title = "Coffee with the teacher".to_string();
        let result = coordinator
            .commit_reviewed(&ticket.id, Some(edited))
            .await
            .unwrap();
        assert_eq!(result.event.title, "Coffee with the teacher");
    }
}
