//! The document aggregate: header, per-scope state, per-scope operation log.
//!
//! State is only changed through the dispatcher; callers get read access.
//! The persisted form is the plain `{ header, state, operations }` record.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::action::Scope;
use crate::error::PersistError;
use crate::operation::{OperationLog, OperationLogs};
use crate::traits::DocumentModel;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Identity and timestamps. Only `name`, `slug` and `last_modified` change
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub document_type: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl DocumentHeader {
    pub fn new(document_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            slug: String::new(),
            document_type: document_type.into(),
            created_at: now,
            last_modified: now,
            branch: default_branch(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_created_at(mut self, ts: DateTime<Utc>) -> Self {
        self.created_at = ts;
        self.last_modified = ts;
        self
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One typed slice per scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentState<G, L> {
    pub global: G,
    #[serde(default)]
    pub local: L,
}

/// Hex SHA-256 of a state slice's canonical JSON.
pub fn state_hash<S: Serialize>(state: &S) -> String {
    let bytes = serde_json::to_vec(state).expect("state serialization should never fail");
    hex::encode(Sha256::digest(&bytes))
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
pub struct Document<M: DocumentModel> {
    pub(crate) header: DocumentHeader,
    pub(crate) state: DocumentState<M::GlobalState, M::LocalState>,
    #[serde(default)]
    pub(crate) operations: OperationLogs,
}

impl<M: DocumentModel> Default for Document<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: DocumentModel> Document<M> {
    /// Fresh document with initial state and empty logs.
    pub fn new() -> Self {
        Self::with_header(DocumentHeader::new(M::DOCUMENT_TYPE))
    }

    pub fn with_header(header: DocumentHeader) -> Self {
        Self {
            header,
            state: DocumentState::default(),
            operations: OperationLogs::new(),
        }
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn id(&self) -> &str {
        &self.header.id
    }

    pub fn state(&self) -> &DocumentState<M::GlobalState, M::LocalState> {
        &self.state
    }

    pub fn global(&self) -> &M::GlobalState {
        &self.state.global
    }

    pub fn local(&self) -> &M::LocalState {
        &self.state.local
    }

    pub fn operations(&self) -> &OperationLogs {
        &self.operations
    }

    pub fn log(&self, scope: Scope) -> &OperationLog {
        self.operations.get(scope)
    }

    /// Optimistic-concurrency counter: the length of the scope's log.
    pub fn revision(&self, scope: Scope) -> u64 {
        self.operations.get(scope).len()
    }

    /// Hash of one scope's current state.
    pub fn state_hash(&self, scope: Scope) -> String {
        match scope {
            Scope::Global => state_hash(&self.state.global),
            Scope::Local => state_hash(&self.state.local),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a persisted document, rejecting other models' documents and
    /// logs with broken index sequences.
    pub fn from_json(raw: &str) -> Result<Self, PersistError> {
        let document: Self = serde_json::from_str(raw)?;
        if document.header.document_type != M::DOCUMENT_TYPE {
            return Err(PersistError::WrongDocumentType {
                expected: M::DOCUMENT_TYPE.to_string(),
                found: document.header.document_type,
            });
        }
        Ok(document)
    }

    /// File name under which `save` stores this document.
    pub fn file_name(&self) -> String {
        let stem = if self.header.slug.is_empty() {
            &self.header.id
        } else {
            &self.header.slug
        };
        format!("{stem}.{}", M::FILE_EXTENSION)
    }

    /// Write to `dir`, returning the full path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, PersistError> {
        let path = dir.join(self.file_name());
        self.save_as(&path)?;
        Ok(path)
    }

    /// Write to an explicit path.
    pub fn save_as(&self, path: &Path) -> Result<(), PersistError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PersistError> {
        if path.extension().and_then(|e| e.to_str()) != Some(M::FILE_EXTENSION) {
            return Err(PersistError::WrongExtension {
                expected: M::FILE_EXTENSION,
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}
