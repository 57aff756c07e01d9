//! Typed errors for dispatch, replay and persistence.

use thiserror::Error;

use crate::action::Scope;
use crate::operation::SequenceError;
use crate::validation::ValidationError;

/// Errors a domain reducer may raise. Closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Insertion of an id already present in the collection.
    #[error("{collection} already contains an entry with id `{id}`")]
    DuplicateIdentifier { collection: &'static str, id: String },

    /// Update, delete or status change addressed at an absent id.
    #[error("{collection} has no entry with id `{id}`")]
    NotFound { collection: &'static str, id: String },

    /// Post-validation re-check of a field the reducer can't work without.
    #[error("required field missing: {field}")]
    RequiredFieldMissing { field: &'static str },
}

impl DomainError {
    pub fn duplicate(collection: &'static str, id: impl Into<String>) -> Self {
        DomainError::DuplicateIdentifier {
            collection,
            id: id.into(),
        }
    }

    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        DomainError::RequiredFieldMissing { field }
    }
}

/// Why a dispatch was rejected. Nothing is appended to the log in either case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl DispatchError {
    /// Stable machine-readable kind for presentation layers.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "VALIDATION_ERROR",
            DispatchError::Domain(DomainError::DuplicateIdentifier { .. }) => {
                "DUPLICATE_IDENTIFIER"
            }
            DispatchError::Domain(DomainError::NotFound { .. }) => "NOT_FOUND",
            DispatchError::Domain(DomainError::RequiredFieldMissing { .. }) => {
                "REQUIRED_FIELD_MISSING"
            }
        }
    }
}

/// Rebuilding a document from its operation logs failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("{scope} log: {source}")]
    Sequence {
        scope: Scope,
        #[source]
        source: SequenceError,
    },

    #[error("{scope} operation {index} is recorded under scope {recorded}")]
    ScopeMismatch {
        scope: Scope,
        index: u64,
        recorded: Scope,
    },

    #[error("{scope} operation {index} ({action_type}) did not commit on replay")]
    NotReducible {
        scope: Scope,
        index: u64,
        action_type: String,
    },

    #[error("{scope} operation {index} failed on replay: {source}")]
    Dispatch {
        scope: Scope,
        index: u64,
        #[source]
        source: DispatchError,
    },

    #[error("{scope} operation {index} diverged: recorded hash {recorded}, replayed {replayed}")]
    HashMismatch {
        scope: Scope,
        index: u64,
        recorded: String,
        replayed: String,
    },
}

/// Reading or writing a persisted document failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected document type {expected}, found {found}")]
    WrongDocumentType { expected: String, found: String },

    #[error("expected a .{expected} file: {path}")]
    WrongExtension { expected: &'static str, path: String },
}
