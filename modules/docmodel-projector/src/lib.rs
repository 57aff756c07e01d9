//! Relational projector for workstream documents.
//!
//! Consumes committed document events, filters them by document type,
//! scope and branch, and upserts one denormalized row per workstream into a
//! table owned by a per-drive namespace. The projection is downstream of the
//! operation log: it never writes back, and any row can be rebuilt by
//! re-delivering events.

pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod migrate;
pub mod namespace;
pub mod projector;
pub mod row;
pub mod sink;

pub use config::{FilterFile, ProjectorConfig};
pub use error::{ConfigError, ProjectorError};
pub use event::DocumentEvent;
pub use filter::EventFilter;
pub use migrate::{Catalog, MigrationReport, MigrationStrategy, Migrator};
pub use namespace::namespace;
pub use projector::{ApplyResult, BatchStats, WorkstreamProjector};
pub use row::WorkstreamRow;
pub use sink::{MemoryRowSink, PgRowSink, RowSink};

/// Processor name used as the namespace prefix.
pub const PROCESSOR: &str = "workstreams";

/// Table owned by the projector inside its namespace.
pub const TABLE: &str = "workstreams";
