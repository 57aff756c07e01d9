//! Operations and the per-scope append-only log.
//!
//! An operation is an action that committed. Indexes are zero-based and
//! strictly sequential within a scope: no gaps, no duplicates, no reordering.
//! The log type enforces this on every append and on deserialization, so a
//! persisted document with a broken sequence never loads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::action::{ActionEnvelope, Scope};

/// A committed action at a fixed position in its scope's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub index: u64,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: ActionEnvelope,
    /// Hex SHA-256 of the scope's state after this operation applied.
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation index out of sequence: expected {expected}, found {found}")]
pub struct SequenceError {
    pub expected: u64,
    pub found: u64,
}

// ---------------------------------------------------------------------------
// OperationLog
// ---------------------------------------------------------------------------

/// Append-only operation sequence for one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct OperationLog(Vec<Operation>);

impl OperationLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of committed operations; also the index the next one receives.
    pub fn len(&self) -> u64 {
        self.0.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    pub fn get(&self, index: u64) -> Option<&Operation> {
        usize::try_from(index).ok().and_then(|i| self.0.get(i))
    }

    pub fn last(&self) -> Option<&Operation> {
        self.0.last()
    }

    /// Operations at or after `index`, for hosts that ship log tails.
    pub fn since(&self, index: u64) -> &[Operation] {
        let start = usize::try_from(index).unwrap_or(usize::MAX).min(self.0.len());
        &self.0[start..]
    }

    /// Append an already-built operation. Rejects anything that is not
    /// exactly the next index.
    pub fn append(&mut self, operation: Operation) -> Result<(), SequenceError> {
        let expected = self.len();
        if operation.index != expected {
            return Err(SequenceError {
                expected,
                found: operation.index,
            });
        }
        self.0.push(operation);
        Ok(())
    }

    /// Record a committed action at the next index. Returns that index.
    pub(crate) fn push_next(
        &mut self,
        id: Uuid,
        timestamp: DateTime<Utc>,
        action: ActionEnvelope,
        hash: String,
    ) -> u64 {
        let index = self.len();
        self.0.push(Operation {
            index,
            id,
            timestamp,
            action,
            hash,
        });
        index
    }
}

impl TryFrom<Vec<Operation>> for OperationLog {
    type Error = SequenceError;

    fn try_from(operations: Vec<Operation>) -> Result<Self, Self::Error> {
        let mut log = OperationLog::new();
        for operation in operations {
            log.append(operation)?;
        }
        Ok(log)
    }
}

impl From<OperationLog> for Vec<Operation> {
    fn from(log: OperationLog) -> Self {
        log.0
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// OperationLogs
// ---------------------------------------------------------------------------

/// One log per scope, selected by exhaustive match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationLogs {
    #[serde(default)]
    global: OperationLog,
    #[serde(default)]
    local: OperationLog,
}

impl OperationLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope: Scope) -> &OperationLog {
        match scope {
            Scope::Global => &self.global,
            Scope::Local => &self.local,
        }
    }

    pub(crate) fn get_mut(&mut self, scope: Scope) -> &mut OperationLog {
        match scope {
            Scope::Global => &mut self.global,
            Scope::Local => &mut self.local,
        }
    }

    /// Total operations across all scopes.
    pub fn total(&self) -> u64 {
        Scope::ALL.iter().map(|s| self.get(*s).len()).sum()
    }
}

impl From<(OperationLog, OperationLog)> for OperationLogs {
    fn from((global, local): (OperationLog, OperationLog)) -> Self {
        Self { global, local }
    }
}
