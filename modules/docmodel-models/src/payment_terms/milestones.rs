//! Milestone schedule.

use chrono::NaiveDate;
use docmodel_core::collection::{find_mut, insert_unique, remove_by_id, reorder_by_ids};
use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Patch, Scope, Validate,
    Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{Milestone, PaymentTermsState, PayoutStatus};
use super::{PaymentTerms, PaymentTermsAction};

pub const ADD_MILESTONE: &str = "ADD_MILESTONE";
pub const UPDATE_MILESTONE: &str = "UPDATE_MILESTONE";
pub const UPDATE_MILESTONE_STATUS: &str = "UPDATE_MILESTONE_STATUS";
pub const DELETE_MILESTONE: &str = "DELETE_MILESTONE";
pub const REORDER_MILESTONES: &str = "REORDER_MILESTONES";

const COLLECTION: &str = "milestoneSchedule";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMilestoneInput {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub requires_approval: bool,
}

impl Validate for AddMilestoneInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id)
            .non_negative("amount", self.amount);
        v.finish()
    }
}

/// Partial update. `Patch` fields may be cleared with an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMilestoneInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub expected_completion_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
}

impl Validate for UpdateMilestoneInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        if let Some(amount) = self.amount {
            v.non_negative("amount", amount);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMilestoneStatusInput {
    pub id: String,
    pub payout_status: PayoutStatus,
}

impl Validate for UpdateMilestoneStatusInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteMilestoneInput {
    pub id: String,
}

impl Validate for DeleteMilestoneInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

/// The new schedule, by id. Milestones not listed are removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderMilestonesInput {
    pub order: Vec<String>,
}

impl Validate for ReorderMilestonesInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifiers("order", &self.order);
        v.finish()
    }
}

// ---------------------------------------------------------------------------
// Registration and action creators
// ---------------------------------------------------------------------------

pub fn register(registry: &mut ActionRegistry<PaymentTerms>) {
    registry
        .global(ADD_MILESTONE, PaymentTermsAction::AddMilestone)
        .global(UPDATE_MILESTONE, PaymentTermsAction::UpdateMilestone)
        .global(UPDATE_MILESTONE_STATUS, PaymentTermsAction::UpdateMilestoneStatus)
        .global(DELETE_MILESTONE, PaymentTermsAction::DeleteMilestone)
        .global(REORDER_MILESTONES, PaymentTermsAction::ReorderMilestones);
}

pub fn add_milestone(input: AddMilestoneInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_MILESTONE, Scope::Global, &input)
}

pub fn update_milestone(input: UpdateMilestoneInput) -> ActionEnvelope {
    ActionEnvelope::typed(UPDATE_MILESTONE, Scope::Global, &input)
}

pub fn update_milestone_status(input: UpdateMilestoneStatusInput) -> ActionEnvelope {
    ActionEnvelope::typed(UPDATE_MILESTONE_STATUS, Scope::Global, &input)
}

pub fn delete_milestone(input: DeleteMilestoneInput) -> ActionEnvelope {
    ActionEnvelope::typed(DELETE_MILESTONE, Scope::Global, &input)
}

pub fn reorder_milestones(input: ReorderMilestonesInput) -> ActionEnvelope {
    ActionEnvelope::typed(REORDER_MILESTONES, Scope::Global, &input)
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

pub(super) fn add_milestone_reducer(
    state: &mut PaymentTermsState,
    input: &AddMilestoneInput,
) -> Result<(), DomainError> {
    if input.name.trim().is_empty() {
        return Err(DomainError::required("name"));
    }
    insert_unique(
        &mut state.milestone_schedule,
        Milestone {
            id: input.id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            amount: input.amount,
            expected_completion_date: input.expected_completion_date,
            requires_approval: input.requires_approval,
            payout_status: PayoutStatus::Pending,
        },
        COLLECTION,
    )
}

pub(super) fn update_milestone_reducer(
    state: &mut PaymentTermsState,
    input: &UpdateMilestoneInput,
) -> Result<(), DomainError> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(DomainError::required("name"));
    }
    let milestone = find_mut(&mut state.milestone_schedule, &input.id, COLLECTION)?;

    if let Some(name) = &input.name {
        milestone.name = name.clone();
    }
    input.description.apply_to(&mut milestone.description);
    if let Some(amount) = input.amount {
        milestone.amount = amount;
    }
    input
        .expected_completion_date
        .apply_to(&mut milestone.expected_completion_date);
    if let Some(requires_approval) = input.requires_approval {
        milestone.requires_approval = requires_approval;
    }
    Ok(())
}

pub(super) fn update_milestone_status_reducer(
    state: &mut PaymentTermsState,
    input: &UpdateMilestoneStatusInput,
) -> Result<(), DomainError> {
    find_mut(&mut state.milestone_schedule, &input.id, COLLECTION)?.payout_status =
        input.payout_status;
    Ok(())
}

pub(super) fn delete_milestone_reducer(
    state: &mut PaymentTermsState,
    input: &DeleteMilestoneInput,
) -> Result<(), DomainError> {
    remove_by_id(&mut state.milestone_schedule, &input.id, COLLECTION).map(|_| ())
}

pub(super) fn reorder_milestones_reducer(
    state: &mut PaymentTermsState,
    input: &ReorderMilestonesInput,
) -> Result<(), DomainError> {
    reorder_by_ids(&mut state.milestone_schedule, &input.order);
    Ok(())
}
