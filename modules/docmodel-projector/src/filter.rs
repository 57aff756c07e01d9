use serde::{Deserialize, Serialize};

use docmodel_models::workstream;

use crate::event::DocumentEvent;

const WILDCARD: &str = "*";

/// Which events a projector consumes. Each list matches when it contains
/// the event's value or `*`; an empty list matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub document_types: Vec<String>,
    pub scopes: Vec<String>,
    pub branches: Vec<String>,
}

impl Default for EventFilter {
    /// Global-scope workstream events on `main`.
    fn default() -> Self {
        Self {
            document_types: vec![workstream::DOCUMENT_TYPE.to_string()],
            scopes: vec!["global".to_string()],
            branches: vec!["main".to_string()],
        }
    }
}

impl EventFilter {
    /// Matches every event.
    pub fn any() -> Self {
        Self {
            document_types: vec![WILDCARD.to_string()],
            scopes: vec![WILDCARD.to_string()],
            branches: vec![WILDCARD.to_string()],
        }
    }

    pub fn matches(&self, event: &DocumentEvent) -> bool {
        list_matches(&self.document_types, &event.header.document_type)
            && list_matches(&self.scopes, event.scope.as_str())
            && list_matches(&self.branches, &event.header.branch)
    }
}

fn list_matches(list: &[String], value: &str) -> bool {
    list.iter().any(|entry| entry == WILDCARD || entry == value)
}
