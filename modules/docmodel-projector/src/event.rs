use serde::{Deserialize, Serialize};

use docmodel_core::{Document, DocumentHeader, DocumentModel, Operation, Scope};

use crate::error::ProjectorError;

/// A batch of committed operations for one document scope, as delivered by
/// the host runtime. `state` is the scope's state after the last operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvent {
    pub drive_id: String,
    pub header: DocumentHeader,
    pub scope: Scope,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub state: serde_json::Value,
}

impl DocumentEvent {
    /// Event for every operation of `scope` at or after index `since`.
    pub fn from_document<M: DocumentModel>(
        drive_id: impl Into<String>,
        document: &Document<M>,
        scope: Scope,
        since: u64,
    ) -> Self {
        let state = match scope {
            Scope::Global => serde_json::to_value(document.global()),
            Scope::Local => serde_json::to_value(document.local()),
        }
        .expect("state serialization should never fail");

        Self {
            drive_id: drive_id.into(),
            header: document.header().clone(),
            scope,
            operations: document.log(scope).since(since).to_vec(),
            state,
        }
    }

    /// Parse one line of a JSONL event stream.
    pub fn from_json_line(line: &str) -> Result<Self, ProjectorError> {
        serde_json::from_str(line).map_err(|source| ProjectorError::Decode {
            what: "document event".into(),
            source,
        })
    }

    pub fn document_id(&self) -> &str {
        &self.header.id
    }

    /// Timestamp of the newest operation in the batch.
    pub fn last_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.operations.iter().map(|op| op.timestamp).max()
    }
}
