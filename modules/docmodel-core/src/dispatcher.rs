//! The dispatch step.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::action::{ActionEnvelope, Scope};
use crate::document::{state_hash, Document, DocumentHeader};
use crate::error::{DispatchError, ReplayError};
use crate::operation::{OperationLogs, SequenceError};
use crate::registry::ActionRegistry;
use crate::traits::{DocumentModel, HeaderLifecycle, LifecycleHandler, TypedAction};
use crate::validation::ValidationError;

/// What a successful dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An operation was appended at `index` in `scope`'s log.
    Committed { scope: Scope, index: u64 },
    /// Lifecycle action handed to the host; state and logs unchanged.
    Delegated,
    /// Unknown action type; state and logs unchanged.
    Ignored,
}

impl DispatchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, DispatchOutcome::Committed { .. })
    }
}

/// Validate → reduce → append, for one document model.
///
/// Synchronous and lock-free: callers serialize dispatches against the same
/// document. Different documents may be dispatched in parallel with one
/// shared dispatcher.
pub struct Dispatcher<M: DocumentModel> {
    registry: ActionRegistry<M>,
    lifecycle: Box<dyn LifecycleHandler>,
}

impl<M: DocumentModel> Default for Dispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: DocumentModel> Dispatcher<M> {
    pub fn new() -> Self {
        Self::with_lifecycle(HeaderLifecycle)
    }

    pub fn with_lifecycle(lifecycle: impl LifecycleHandler + 'static) -> Self {
        Self {
            registry: ActionRegistry::for_model(),
            lifecycle: Box::new(lifecycle),
        }
    }

    pub fn registry(&self) -> &ActionRegistry<M> {
        &self.registry
    }

    /// Pre-validate an action without dispatching it. `Ok(None)` for an
    /// unknown type.
    pub fn validate(&self, action: &ActionEnvelope) -> Result<Option<TypedAction<M>>, ValidationError> {
        if action.is_lifecycle() {
            return Ok(None);
        }
        self.registry.decode(action)
    }

    /// Apply one action to a document.
    ///
    /// On `Err` nothing was appended and the revision is unchanged. Reducers
    /// check before mutating, so the state is unchanged as well.
    pub fn dispatch(
        &self,
        document: &mut Document<M>,
        action: ActionEnvelope,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch_stamped(document, action, None)
    }

    /// `stamp` overrides the envelope's id and timestamp without altering the
    /// envelope recorded in the log.
    fn dispatch_stamped(
        &self,
        document: &mut Document<M>,
        action: ActionEnvelope,
        stamp: Option<(Uuid, DateTime<Utc>)>,
    ) -> Result<DispatchOutcome, DispatchError> {
        // 1. Lifecycle actions belong to the host
        if action.is_lifecycle() {
            self.lifecycle.handle(&mut document.header, &action)?;
            return Ok(DispatchOutcome::Delegated);
        }

        // 2. Unknown types are tolerated, not rejected
        let Some(typed) = self.registry.decode(&action)? else {
            debug!(
                action_type = %action.action_type,
                document_type = M::DOCUMENT_TYPE,
                document_id = %document.header.id,
                "Ignoring unknown action type"
            );
            return Ok(DispatchOutcome::Ignored);
        };

        // 3. Reduce the targeted slice
        let hash = match &typed {
            TypedAction::Global(a) => {
                M::reduce_global(&mut document.state.global, a)?;
                state_hash(&document.state.global)
            }
            TypedAction::Local(a) => {
                M::reduce_local(&mut document.state.local, a)?;
                state_hash(&document.state.local)
            }
        };

        // 4. Append to the scope's log
        let scope = action.scope;
        let (id, timestamp) = stamp.unwrap_or_else(|| {
            (
                action.id.unwrap_or_else(Uuid::new_v4),
                action.timestamp.unwrap_or_else(Utc::now),
            )
        });
        let index = document
            .operations
            .get_mut(scope)
            .push_next(id, timestamp, action, hash);
        document.header.last_modified = timestamp;

        debug!(
            document_id = %document.header.id,
            %scope,
            index,
            "Operation committed"
        );

        Ok(DispatchOutcome::Committed { scope, index })
    }

    /// Dispatch a sequence, stopping at the first failure.
    pub fn dispatch_all(
        &self,
        document: &mut Document<M>,
        actions: impl IntoIterator<Item = ActionEnvelope>,
    ) -> Result<Vec<DispatchOutcome>, DispatchError> {
        actions
            .into_iter()
            .map(|action| self.dispatch(document, action))
            .collect()
    }

    /// Rebuild a document from its header and operation logs by
    /// re-dispatching every recorded action in order.
    ///
    /// Fails on index gaps, on actions that no longer commit, and on any
    /// operation whose replayed state hash differs from the recorded one.
    pub fn replay(
        &self,
        header: DocumentHeader,
        logs: &OperationLogs,
    ) -> Result<Document<M>, ReplayError> {
        let last_modified = header.last_modified;
        let mut document = Document::<M>::with_header(header);

        for scope in Scope::ALL {
            for operation in logs.get(scope) {
                let expected = document.revision(scope);
                if operation.index != expected {
                    return Err(ReplayError::Sequence {
                        scope,
                        source: SequenceError {
                            expected,
                            found: operation.index,
                        },
                    });
                }
                if operation.action.scope != scope {
                    return Err(ReplayError::ScopeMismatch {
                        scope,
                        index: operation.index,
                        recorded: operation.action.scope,
                    });
                }

                let outcome = self
                    .dispatch_stamped(
                        &mut document,
                        operation.action.clone(),
                        Some((operation.id, operation.timestamp)),
                    )
                    .map_err(|source| ReplayError::Dispatch {
                        scope,
                        index: operation.index,
                        source,
                    })?;
                if !outcome.is_committed() {
                    return Err(ReplayError::NotReducible {
                        scope,
                        index: operation.index,
                        action_type: operation.action.action_type.clone(),
                    });
                }

                let replayed = document.state_hash(scope);
                if replayed != operation.hash {
                    return Err(ReplayError::HashMismatch {
                        scope,
                        index: operation.index,
                        recorded: operation.hash.clone(),
                        replayed,
                    });
                }
            }
        }

        document.header.last_modified = last_modified;
        Ok(document)
    }
}
