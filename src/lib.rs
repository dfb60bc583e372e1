//! Hearth: family calendar event extraction and canonicalization engine.
//!
//! Turns unstructured input — chat text, forwarded email bodies, OCR'd
//! invitations — into canonical, deduplicated calendar events with
//! household metadata: which child, which parent attends, birthday
//! details.

pub mod config;
pub mod error;
pub mod event;
pub mod extraction;
pub mod intake;
pub mod ocr;
pub mod repository;
pub mod review;

pub use config::{
    CacheConfig, Config, DedupConfig, ExtractionConfig, OcrConfig, ReviewConfig, TimezoneConfig,
};
pub use error::{ConfigError, ExtractionError, HearthError, OcrError, Result, StorageError};
pub use event::{
    event_signature, CalendarEventOutput, DedupResult, DeduplicationEngine, EventDateTime,
    EventDraft, EventStandardizer, EventUpdate, StandardizedEvent,
};
pub use extraction::{
    BirthdayInfo, ChildRef, ConfidenceScorer, DateTimeExtractor, EntityExtractor, EventAssembler,
    EventType, EventTypeClassifier, ExtractedEntities, ExtractedEvent, ExtractionPipeline,
    FamilyContext, FamilyMember, HostRef, ParentRef, RawInput, Recurrence, RecurrencePattern,
    Region, RegionDetector, RegionScores, ResolvedDateTime, TypeClassification,
};
pub use intake::{IntakeCoordinator, IntakeOutcome};
pub use ocr::{
    normalize_ocr_text, recognize_text, HttpOcrBackend, OcrBackend, OcrRequest, OcrResponse,
};
pub use repository::{
    CacheStats, ChangeKind, ChangeNotice, EventCache, EventRepository, EventStore,
    MemoryEventStore, Subscriber, SubscriberRegistry, SubscriptionId,
};
pub use review::{ReviewQueue, ReviewReason, ReviewStatus, ReviewTicket};
