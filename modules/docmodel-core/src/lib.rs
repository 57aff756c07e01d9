//! Event-sourced, scope-partitioned document engine.
//!
//! A document model declares typed state and action enums per scope and a
//! set of pure reducers. The `Dispatcher` turns an untyped `ActionEnvelope`
//! into a committed `Operation`: validate → reduce → append. Every scope's
//! log is append-only with gap-free indexes; the log is the authoritative
//! history and `Dispatcher::replay` rebuilds state from it.
//!
//! Consumers define a model by implementing `DocumentModel` and registering
//! each action type in the model's `ActionRegistry`.

pub mod action;
pub mod collection;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod operation;
pub mod patch;
pub mod registry;
pub mod traits;
pub mod validation;

pub use action::{ActionEnvelope, Scope, UnknownScope, LIFECYCLE_ACTIONS};
pub use collection::Identified;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use document::{state_hash, Document, DocumentHeader, DocumentState};
pub use error::{DispatchError, DomainError, PersistError, ReplayError};
pub use operation::{Operation, OperationLog, OperationLogs, SequenceError};
pub use patch::Patch;
pub use registry::ActionRegistry;
pub use traits::{
    DocumentModel, HeaderLifecycle, LifecycleHandler, NoLocalActions, StateSlice, TypedAction,
};
pub use validation::{
    decode_input, ActionInput, FieldViolation, Validate, ValidationError, ViolationKind,
    Violations,
};
