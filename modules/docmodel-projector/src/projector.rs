//! WorkstreamProjector: committed workstream events → projected rows.
//!
//! At-least-once delivery is assumed. Every applied event re-derives the
//! whole row from the event's state snapshot, so re-delivery rewrites the
//! same values and the last event for a key wins.

use tracing::{debug, info, warn};

use docmodel_core::Scope;
use docmodel_models::{workstream, WorkstreamState};

use crate::error::ProjectorError;
use crate::event::DocumentEvent;
use crate::filter::EventFilter;
use crate::namespace::namespace;
use crate::row::WorkstreamRow;
use crate::sink::RowSink;
use crate::PROCESSOR;

/// Result of applying a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// A row was upserted.
    Applied,
    /// Filtered out, another drive, or nothing committed.
    NoOp,
    /// The state snapshot could not be deserialized.
    DeserializeError(String),
}

/// Counts from one `handle_batch` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub applied: u32,
    pub noop: u32,
    pub errors: u32,
}

pub struct WorkstreamProjector<S> {
    drive_id: String,
    namespace: String,
    filter: EventFilter,
    sink: S,
}

impl<S: RowSink> WorkstreamProjector<S> {
    pub fn new(drive_id: impl Into<String>, sink: S) -> Self {
        let drive_id = drive_id.into();
        Self {
            namespace: namespace(PROCESSOR, &drive_id),
            drive_id,
            filter: EventFilter::default(),
            sink,
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Project one event. Idempotent.
    ///
    /// Sink failures are returned as errors; nothing upstream is touched and
    /// the event can be re-delivered.
    pub async fn handle_event(&self, event: &DocumentEvent) -> Result<ApplyResult, ProjectorError> {
        let document_id = event.document_id();

        if event.drive_id != self.drive_id {
            debug!(document_id, drive_id = %event.drive_id, "No-op (other drive)");
            return Ok(ApplyResult::NoOp);
        }
        if !self.filter.matches(event) {
            debug!(
                document_id,
                document_type = %event.header.document_type,
                scope = %event.scope,
                branch = %event.header.branch,
                "No-op (filtered)"
            );
            return Ok(ApplyResult::NoOp);
        }
        if event.operations.is_empty() {
            debug!(document_id, "No-op (no operations)");
            return Ok(ApplyResult::NoOp);
        }
        // The row is derived from global workstream state only, whatever a
        // wildcard filter lets through.
        if event.header.document_type != workstream::DOCUMENT_TYPE || event.scope != Scope::Global {
            debug!(document_id, "No-op (not a global workstream event)");
            return Ok(ApplyResult::NoOp);
        }

        let state: WorkstreamState = match serde_json::from_value(event.state.clone()) {
            Ok(state) => state,
            Err(e) => {
                warn!(document_id, error = %e, "Failed to deserialize workstream state");
                return Ok(ApplyResult::DeserializeError(e.to_string()));
            }
        };

        let updated_at = event
            .last_timestamp()
            .unwrap_or(event.header.last_modified);
        let row = WorkstreamRow::derive(&self.drive_id, &event.header, &state, updated_at);
        self.sink.upsert(&row).await?;

        debug!(
            document_id,
            operations = event.operations.len(),
            status = row.workstream_status.as_deref().unwrap_or(""),
            "Workstream row upserted"
        );
        Ok(ApplyResult::Applied)
    }

    /// Project events in order, stopping at the first sink failure.
    pub async fn handle_batch(&self, events: &[DocumentEvent]) -> Result<BatchStats, ProjectorError> {
        let mut stats = BatchStats::default();

        for event in events {
            match self.handle_event(event).await? {
                ApplyResult::Applied => stats.applied += 1,
                ApplyResult::NoOp => stats.noop += 1,
                ApplyResult::DeserializeError(_) => stats.errors += 1,
            }
        }

        info!(
            namespace = %self.namespace,
            applied = stats.applied,
            noop = stats.noop,
            errors = stats.errors,
            "Projected event batch"
        );
        Ok(stats)
    }
}
