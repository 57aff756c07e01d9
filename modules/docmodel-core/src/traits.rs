//! Core traits for the document engine.

use std::fmt::Debug;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::ActionEnvelope;
use crate::document::DocumentHeader;
use crate::error::DomainError;
use crate::registry::ActionRegistry;
use crate::validation::{FieldViolation, ValidationError, ViolationKind};

/// A concretely typed per-scope state slice.
pub trait StateSlice:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> StateSlice for T where
    T: Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// A document model: its type tag, one state type and one action enum per
/// scope, the action registry, and the reducers.
///
/// Implemented by zero-sized marker types. The reducers are the only place
/// that matches on the full action enumeration.
pub trait DocumentModel: Debug + Clone + PartialEq + Send + Sync + 'static {
    /// Document-type tag stored in every header, e.g. `docmodel/workstream`.
    const DOCUMENT_TYPE: &'static str;

    /// Suffix of persisted documents of this model.
    const FILE_EXTENSION: &'static str = "phdm";

    type GlobalState: StateSlice;
    type LocalState: StateSlice;
    type GlobalAction: Debug + Clone + Send + Sync + 'static;
    type LocalAction: Debug + Clone + Send + Sync + 'static;

    /// Add every action type this model understands.
    fn register(registry: &mut ActionRegistry<Self>);

    /// Pure mutation of the global slice. All fallible checks precede the
    /// first write.
    fn reduce_global(
        state: &mut Self::GlobalState,
        action: &Self::GlobalAction,
    ) -> Result<(), DomainError>;

    /// Pure mutation of the local slice.
    fn reduce_local(
        state: &mut Self::LocalState,
        action: &Self::LocalAction,
    ) -> Result<(), DomainError>;
}

/// A decoded, validated action bound to the slice it targets.
#[derive(Debug, Clone)]
pub enum TypedAction<M: DocumentModel> {
    Global(M::GlobalAction),
    Local(M::LocalAction),
}

/// Action set for models with no local-scope actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoLocalActions {}

/// Host-runtime seam for document-lifecycle actions (rename, header touch,
/// undo/redo, ...). Sees only the header; state and logs are off limits.
pub trait LifecycleHandler: Send + Sync {
    fn handle(
        &self,
        header: &mut DocumentHeader,
        action: &ActionEnvelope,
    ) -> Result<(), ValidationError>;
}

/// Default lifecycle handling: `SET_NAME` and `SET_SLUG` update the header;
/// everything else belongs to the host and is a no-op here.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderLifecycle;

/// `SET_NAME` input: a bare string or `{ "name": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NameInput {
    Bare(String),
    Named(Named),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Named {
    name: String,
}

/// `SET_SLUG` input: a bare string or `{ "slug": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SlugInput {
    Bare(String),
    Slugged(Slugged),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Slugged {
    slug: String,
}

impl LifecycleHandler for HeaderLifecycle {
    fn handle(
        &self,
        header: &mut DocumentHeader,
        action: &ActionEnvelope,
    ) -> Result<(), ValidationError> {
        let malformed = |e: serde_json::Error| {
            ValidationError::single(
                action.action_type.clone(),
                FieldViolation::new("$input", ViolationKind::Malformed(e.to_string())),
            )
        };

        match action.action_type.as_str() {
            "SET_NAME" => {
                header.name = match NameInput::deserialize(&action.input).map_err(malformed)? {
                    NameInput::Bare(name) | NameInput::Named(Named { name }) => name,
                };
            }
            "SET_SLUG" => {
                header.slug = match SlugInput::deserialize(&action.input).map_err(malformed)? {
                    SlugInput::Bare(slug) | SlugInput::Slugged(Slugged { slug }) => slug,
                };
            }
            other => {
                debug!(action_type = other, document_id = %header.id, "Lifecycle action left to host");
                return Ok(());
            }
        }

        header.last_modified = action.timestamp.unwrap_or_else(Utc::now);
        Ok(())
    }
}
