//! Action envelopes: the entire write API of a document.
//!
//! Every mutating capability is `{ type, scope, input }`. The envelope is the
//! same whether it came from the host runtime or a replay
//! of a persisted operation log.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// The state slice an action reads and mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Local,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Global, Scope::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Local => "local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Scope::Global),
            "local" => Ok(Scope::Local),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle actions
// ---------------------------------------------------------------------------

/// Document-lifecycle action types. These never reach a domain reducer;
/// the dispatcher hands them to the host's `LifecycleHandler`.
pub const LIFECYCLE_ACTIONS: &[&str] = &[
    "SET_NAME",
    "SET_SLUG",
    "NOOP",
    "UNDO",
    "REDO",
    "PRUNE",
    "LOAD_STATE",
];

// ---------------------------------------------------------------------------
// ActionEnvelope
// ---------------------------------------------------------------------------

/// An intended mutation. The caller builds this; the dispatcher validates it,
/// reduces it, and records it verbatim in the scope's operation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    #[serde(rename = "type")]
    pub action_type: String,
    pub scope: Scope,
    #[serde(default)]
    pub input: serde_json::Value,
    /// Host-assigned identifier. The dispatcher generates one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Host-assigned timestamp. The dispatcher uses wall-clock time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActionEnvelope {
    pub fn new(action_type: impl Into<String>, scope: Scope, input: serde_json::Value) -> Self {
        Self {
            action_type: action_type.into(),
            scope,
            input,
            id: None,
            timestamp: None,
        }
    }

    pub fn global(action_type: impl Into<String>, input: serde_json::Value) -> Self {
        Self::new(action_type, Scope::Global, input)
    }

    pub fn local(action_type: impl Into<String>, input: serde_json::Value) -> Self {
        Self::new(action_type, Scope::Local, input)
    }

    /// Build an envelope from a typed input. Used by the per-model action creators.
    pub fn typed<I: Serialize>(action_type: &str, scope: Scope, input: &I) -> Self {
        let input = serde_json::to_value(input).expect("action input serialization should never fail");
        Self::new(action_type, scope, input)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    pub fn is_lifecycle(&self) -> bool {
        LIFECYCLE_ACTIONS.contains(&self.action_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scope_round_trips_through_its_name() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
        }
        assert_eq!(
            "shared".parse::<Scope>(),
            Err(UnknownScope("shared".to_string()))
        );
    }

    #[test]
    fn envelope_serializes_with_type_tag() {
        let action = ActionEnvelope::global("ADD_MILESTONE", json!({"id": "m1"}));
        let value = serde_json::to_value(&action).unwrap();

        assert_eq!(value["type"], "ADD_MILESTONE");
        assert_eq!(value["scope"], "global");
        assert!(value.get("id").is_none());
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn envelope_without_input_deserializes_to_null() {
        let action: ActionEnvelope =
            serde_json::from_value(json!({"type": "NOOP", "scope": "local"})).unwrap();
        assert_eq!(action.input, serde_json::Value::Null);
        assert!(action.is_lifecycle());
    }
}
