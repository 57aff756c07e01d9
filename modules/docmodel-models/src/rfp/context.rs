//! Context documents attached to an RFP.

use docmodel_core::collection::{insert_unique, remove_by_id};
use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Scope, Validate, Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{ContextDocument, RfpState};
use super::{Rfp, RfpAction};

pub const ADD_CONTEXT_DOCUMENT: &str = "ADD_CONTEXT_DOCUMENT";
pub const REMOVE_CONTEXT_DOCUMENT: &str = "REMOVE_CONTEXT_DOCUMENT";

const COLLECTION: &str = "contextDocuments";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddContextDocumentInput {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Validate for AddContextDocumentInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id)
            .non_empty("name", &self.name)
            .url("url", &self.url);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveContextDocumentInput {
    pub id: String,
}

impl Validate for RemoveContextDocumentInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

pub fn register(registry: &mut ActionRegistry<Rfp>) {
    registry
        .global(ADD_CONTEXT_DOCUMENT, RfpAction::AddContextDocument)
        .global(REMOVE_CONTEXT_DOCUMENT, RfpAction::RemoveContextDocument);
}

pub fn add_context_document(input: AddContextDocumentInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_CONTEXT_DOCUMENT, Scope::Global, &input)
}

pub fn remove_context_document(input: RemoveContextDocumentInput) -> ActionEnvelope {
    ActionEnvelope::typed(REMOVE_CONTEXT_DOCUMENT, Scope::Global, &input)
}

pub(super) fn add_context_document_reducer(
    state: &mut RfpState,
    input: &AddContextDocumentInput,
) -> Result<(), DomainError> {
    insert_unique(
        &mut state.context_documents,
        ContextDocument {
            id: input.id.clone(),
            name: input.name.clone(),
            url: input.url.clone(),
        },
        COLLECTION,
    )
}

pub(super) fn remove_context_document_reducer(
    state: &mut RfpState,
    input: &RemoveContextDocumentInput,
) -> Result<(), DomainError> {
    remove_by_id(&mut state.context_documents, &input.id, COLLECTION).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_core::{decode_input, ViolationKind};
    use serde_json::json;

    #[test]
    fn non_http_url_is_rejected() {
        let err = decode_input::<AddContextDocumentInput>(
            ADD_CONTEXT_DOCUMENT,
            &json!({"id": "ctx-1", "name": "Brief", "url": "ftp://example.org/brief.pdf"}),
        )
        .unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "url");
        assert_eq!(err.violations[0].kind, ViolationKind::InvalidUrl);
    }

    #[test]
    fn add_then_remove() {
        let mut state = RfpState::default();
        let input = AddContextDocumentInput {
            id: "ctx-1".into(),
            name: "Brief".into(),
            url: "https://example.org/brief.pdf".into(),
        };
        add_context_document_reducer(&mut state, &input).unwrap();
        assert_eq!(
            add_context_document_reducer(&mut state, &input).unwrap_err(),
            DomainError::duplicate(COLLECTION, "ctx-1")
        );

        remove_context_document_reducer(
            &mut state,
            &RemoveContextDocumentInput { id: "ctx-1".into() },
        )
        .unwrap();
        assert!(state.context_documents.is_empty());
    }
}
