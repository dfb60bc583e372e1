//! Manual-review queue.
//!
//! The escape hatch for extractions the system should not commit on its
//! own: low confidence, or no usable date/type at all. Records are held
//! `pending` with the original raw text attached, until a human resolves
//! or discards them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, StorageError};
use crate::extraction::ExtractedEvent;

/// Status of a queued review ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for a human.
    Pending,
    /// Confirmed and promoted into a real event.
    Resolved,
    /// Dismissed without creating an event.
    Discarded,
}

/// A queued extraction awaiting human confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTicket {
    /// Ticket id.
    pub id: String,
    /// Owning family.
    pub family_id: String,
    /// The extraction as the pipeline produced it.
    pub extracted: ExtractedEvent,
    /// Why the record was queued.
    pub reason: ReviewReason,
    /// Current status.
    pub status: ReviewStatus,
    /// When the ticket was queued.
    pub created_at: DateTime<Utc>,
}

/// Why an extraction was routed to review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// Confidence fell below the configured threshold.
    LowConfidence,
    /// Neither a date nor an event type could be found.
    NothingUsable,
}

/// In-memory review queue.
#[derive(Default)]
pub struct ReviewQueue {
    tickets: RwLock<Vec<ReviewTicket>>,
}

impl ReviewQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an extraction for review. The original text travels with it.
    pub async fn enqueue(
        &self,
        family_id: impl Into<String>,
        extracted: ExtractedEvent,
        reason: ReviewReason,
    ) -> ReviewTicket {
        let ticket = ReviewTicket {
            id: uuid::Uuid::new_v4().to_string(),
            family_id: family_id.into(),
            extracted,
            reason,
            status: ReviewStatus::Pending,
            created_at: Utc::now(),
        };
        self.tickets.write().await.push(ticket.clone());
        tracing::debug!(ticket = %ticket.id, reason = ?reason, "extraction queued for review");
        ticket
    }

    /// Pending tickets for a family, oldest first.
    pub async fn pending(&self, family_id: &str) -> Vec<ReviewTicket> {
        self.tickets
            .read()
            .await
            .iter()
            .filter(|t| t.family_id == family_id && t.status == ReviewStatus::Pending)
            .cloned()
            .collect()
    }

    /// Get a ticket by id.
    pub async fn get(&self, ticket_id: &str) -> Option<ReviewTicket> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|t| t.id == ticket_id)
            .cloned()
    }

    /// Mark a pending ticket resolved and return it.
    pub async fn resolve(&self, ticket_id: &str) -> Result<ReviewTicket> {
        self.transition(ticket_id, ReviewStatus::Resolved).await
    }

    /// Mark a pending ticket discarded and return it.
    pub async fn discard(&self, ticket_id: &str) -> Result<ReviewTicket> {
        self.transition(ticket_id, ReviewStatus::Discarded).await
    }

    async fn transition(&self, ticket_id: &str, status: ReviewStatus) -> Result<ReviewTicket> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == ticket_id)
            .ok_or_else(|| StorageError::NotFound(ticket_id.to_string()))?;

        if ticket.status != ReviewStatus::Pending {
            return Err(StorageError::InvalidOperation(format!(
                "ticket {} is not pending",
                ticket_id
            ))
            .into());
        }

        ticket.status = status;
        Ok(ticket.clone())
    }
}
