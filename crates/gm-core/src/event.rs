//! Audit events for mapping administration.
//!
//! Every commit attempt produces exactly one event describing what was
//! attempted and how it ended. Events are written to the tracing framework
//! as structured records named `mapping_event`.
//!
//! All events include:
//! - Timestamp (ISO 8601)
//! - Event type
//! - Outcome (success/failure)
//! - Affected mapping ids

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// One or more mappings were added.
    MappingsAdded,
    /// A mapping was updated.
    MappingUpdated,
    /// A mapping was deleted.
    MappingDeleted,
    /// The remote authority rejected a candidate configuration.
    ConfigTestFailed,
    /// The candidate passed validation but could not be written.
    ConfigPersistFailed,
    /// A confirmed action failed local checks and was never sent.
    ActionRejected,
    /// A configuration snapshot was exported.
    SnapshotExported,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// An audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event (ISO 8601).
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Ids of the mappings the event concerns.
    pub mapping_ids: Vec<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Writes the event to the tracing framework.
    pub fn emit(&self) {
        match self.outcome {
            EventOutcome::Success => tracing::info!(
                event_id = %self.id,
                event_type = ?self.event_type,
                outcome = ?self.outcome,
                mapping_ids = ?self.mapping_ids,
                details = ?self.details,
                "mapping_event"
            ),
            EventOutcome::Failure => tracing::warn!(
                event_id = %self.id,
                event_type = ?self.event_type,
                outcome = ?self.outcome,
                mapping_ids = ?self.mapping_ids,
                error = ?self.error,
                details = ?self.details,
                "mapping_event"
            ),
        }
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    mapping_ids: Vec<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            mapping_ids: Vec::new(),
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Adds an affected mapping id.
    #[must_use]
    pub fn mapping(mut self, id: impl Into<String>) -> Self {
        self.mapping_ids.push(id.into());
        self
    }

    /// Adds several affected mapping ids.
    #[must_use]
    pub fn mappings<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapping_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            mapping_ids: self.mapping_ids,
            error: self.error,
            details: self.details,
        }
    }
}
