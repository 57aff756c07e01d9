//! Flat action registry: type tag → scope + decoder.
//!
//! Each reducer module contributes its own tags through a `register`
//! function; the model composes those into one table at startup. The
//! registry is the only place the envelope's string tag is interpreted.

use std::collections::BTreeMap;

use crate::action::{ActionEnvelope, Scope};
use crate::traits::{DocumentModel, TypedAction};
use crate::validation::{decode_input, ActionInput, FieldViolation, ValidationError, ViolationKind};

type Decoder<M> =
    Box<dyn Fn(&str, &serde_json::Value) -> Result<TypedAction<M>, ValidationError> + Send + Sync>;

struct Entry<M: DocumentModel> {
    scope: Scope,
    decode: Decoder<M>,
}

/// All action types a model understands.
pub struct ActionRegistry<M: DocumentModel> {
    entries: BTreeMap<&'static str, Entry<M>>,
}

impl<M: DocumentModel> Default for ActionRegistry<M> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<M: DocumentModel> ActionRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated by the model's own `register`.
    pub fn for_model() -> Self {
        let mut registry = Self::new();
        M::register(&mut registry);
        registry
    }

    /// Register a global-scope action with input type `I`.
    ///
    /// Panics if the tag is already registered; tags are unique per model.
    pub fn global<I: ActionInput>(
        &mut self,
        action_type: &'static str,
        wrap: fn(I) -> M::GlobalAction,
    ) -> &mut Self {
        self.insert(
            action_type,
            Scope::Global,
            Box::new(move |tag: &str, input: &serde_json::Value| {
                decode_input::<I>(tag, input).map(|i| TypedAction::Global(wrap(i)))
            }),
        )
    }

    /// Register a local-scope action with input type `I`.
    pub fn local<I: ActionInput>(
        &mut self,
        action_type: &'static str,
        wrap: fn(I) -> M::LocalAction,
    ) -> &mut Self {
        self.insert(
            action_type,
            Scope::Local,
            Box::new(move |tag: &str, input: &serde_json::Value| {
                decode_input::<I>(tag, input).map(|i| TypedAction::Local(wrap(i)))
            }),
        )
    }

    fn insert(&mut self, action_type: &'static str, scope: Scope, decode: Decoder<M>) -> &mut Self {
        let previous = self.entries.insert(action_type, Entry { scope, decode });
        assert!(
            previous.is_none(),
            "action type {action_type} registered twice for {}",
            M::DOCUMENT_TYPE
        );
        self
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.entries.contains_key(action_type)
    }

    /// The scope an action type is registered under.
    pub fn scope_of(&self, action_type: &str) -> Option<Scope> {
        self.entries.get(action_type).map(|e| e.scope)
    }

    /// Registered tags in sorted order.
    pub fn action_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode and validate an envelope.
    ///
    /// `Ok(None)` means the type is unknown to this model. A declared scope
    /// that differs from the registered one is a validation failure.
    pub fn decode(&self, action: &ActionEnvelope) -> Result<Option<TypedAction<M>>, ValidationError> {
        let Some(entry) = self.entries.get(action.action_type.as_str()) else {
            return Ok(None);
        };

        if entry.scope != action.scope {
            return Err(ValidationError::single(
                action.action_type.clone(),
                FieldViolation::new("scope", ViolationKind::NotAllowed(action.scope.to_string())),
            ));
        }

        (entry.decode)(&action.action_type, &action.input).map(Some)
    }

    /// Validate without keeping the decoded action.
    pub fn validate(&self, action: &ActionEnvelope) -> Result<(), ValidationError> {
        self.decode(action).map(|_| ())
    }
}
