//! RFP details.

use chrono::{DateTime, Utc};
use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Patch, Scope, Validate,
    ViolationKind, Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{BudgetRange, RfpState, RfpStatus};
use super::{Rfp, RfpAction};

pub const EDIT_RFP: &str = "EDIT_RFP";

/// Partial edit of every top-level RFP field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRfpInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub code: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub briefing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfp_status: Option<RfpStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub deadline: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub budget_range: Patch<BudgetRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Validate for EditRfpInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        if let Some(issuer) = &self.issuer {
            v.identifier("issuer", issuer);
        }
        if let Some(range) = self.budget_range.value() {
            v.currency("budgetRange.currency", &range.currency);
            if let Some(min) = range.min {
                v.non_negative("budgetRange.min", min);
            }
            if let Some(max) = range.max {
                v.non_negative("budgetRange.max", max);
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                v.ensure(
                    min <= max,
                    "budgetRange",
                    ViolationKind::InvalidFormat("min exceeds max".into()),
                );
            }
        }
        if let Some(tags) = &self.tags {
            for (i, tag) in tags.iter().enumerate() {
                v.non_empty(&format!("tags.{i}"), tag);
            }
        }
        v.finish()
    }
}

pub fn register(registry: &mut ActionRegistry<Rfp>) {
    registry.global(EDIT_RFP, RfpAction::EditRfp);
}

pub fn edit_rfp(input: EditRfpInput) -> ActionEnvelope {
    ActionEnvelope::typed(EDIT_RFP, Scope::Global, &input)
}

pub(super) fn edit_rfp_reducer(state: &mut RfpState, input: &EditRfpInput) -> Result<(), DomainError> {
    if let Some(issuer) = &input.issuer {
        state.issuer = issuer.clone();
    }
    if let Some(title) = &input.title {
        state.title = title.clone();
    }
    input.code.apply_to(&mut state.code);
    if let Some(summary) = &input.summary {
        state.summary = summary.clone();
    }
    if let Some(briefing) = &input.briefing {
        state.briefing = briefing.clone();
    }
    if let Some(status) = input.rfp_status {
        state.rfp_status = status;
    }
    input.deadline.apply_to(&mut state.deadline);
    input.budget_range.apply_to(&mut state.budget_range);
    if let Some(tags) = &input.tags {
        state.tags = tags.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_core::decode_input;
    use serde_json::json;

    #[test]
    fn inverted_budget_range_is_rejected() {
        let err = decode_input::<EditRfpInput>(
            EDIT_RFP,
            &json!({"budgetRange": {"min": 10, "max": 5, "currency": "USD"}}),
        )
        .unwrap_err();
        assert!(err.has_field("budgetRange"));
    }

    #[test]
    fn edit_sets_empty_summary_and_keeps_title() {
        let mut state = RfpState {
            title: "Indexer RFP".into(),
            summary: "Build an indexer".into(),
            ..Default::default()
        };
        let input: EditRfpInput =
            decode_input(EDIT_RFP, &json!({"summary": "", "tags": []})).unwrap();
        edit_rfp_reducer(&mut state, &input).unwrap();

        assert_eq!(state.title, "Indexer RFP");
        assert_eq!(state.summary, "");
        assert!(state.tags.is_empty());
    }

    #[test]
    fn null_deadline_clears_it() {
        let mut state = RfpState {
            deadline: Some(Utc::now()),
            ..Default::default()
        };
        let input: EditRfpInput = decode_input(EDIT_RFP, &json!({"deadline": null})).unwrap();
        edit_rfp_reducer(&mut state, &input).unwrap();
        assert_eq!(state.deadline, None);
    }
}
