//! Bonus and penalty clauses.

use docmodel_core::collection::{find_mut, insert_unique, remove_by_id};
use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Patch, Scope, Validate,
    Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{BonusClause, PaymentTermsState, PenaltyClause};
use super::{PaymentTerms, PaymentTermsAction};

pub const ADD_BONUS_CLAUSE: &str = "ADD_BONUS_CLAUSE";
pub const UPDATE_BONUS_CLAUSE: &str = "UPDATE_BONUS_CLAUSE";
pub const DELETE_BONUS_CLAUSE: &str = "DELETE_BONUS_CLAUSE";
pub const ADD_PENALTY_CLAUSE: &str = "ADD_PENALTY_CLAUSE";
pub const UPDATE_PENALTY_CLAUSE: &str = "UPDATE_PENALTY_CLAUSE";
pub const DELETE_PENALTY_CLAUSE: &str = "DELETE_PENALTY_CLAUSE";

const BONUS: &str = "bonusClauses";
const PENALTY: &str = "penaltyClauses";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBonusClauseInput {
    pub id: String,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub bonus_amount: f64,
}

impl Validate for AddBonusClauseInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id)
            .non_empty("condition", &self.condition)
            .non_negative("bonusAmount", self.bonus_amount);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBonusClauseInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub comment: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_amount: Option<f64>,
}

impl Validate for UpdateBonusClauseInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        if let Some(amount) = self.bonus_amount {
            v.non_negative("bonusAmount", amount);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPenaltyClauseInput {
    pub id: String,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub deduction_amount: f64,
}

impl Validate for AddPenaltyClauseInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id)
            .non_empty("condition", &self.condition)
            .non_negative("deductionAmount", self.deduction_amount);
        v.finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePenaltyClauseInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub comment: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduction_amount: Option<f64>,
}

impl Validate for UpdatePenaltyClauseInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        if let Some(amount) = self.deduction_amount {
            v.non_negative("deductionAmount", amount);
        }
        v.finish()
    }
}

/// Shared by both delete actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteClauseInput {
    pub id: String,
}

impl Validate for DeleteClauseInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

// ---------------------------------------------------------------------------
// Registration and action creators
// ---------------------------------------------------------------------------

pub fn register(registry: &mut ActionRegistry<PaymentTerms>) {
    registry
        .global(ADD_BONUS_CLAUSE, PaymentTermsAction::AddBonusClause)
        .global(UPDATE_BONUS_CLAUSE, PaymentTermsAction::UpdateBonusClause)
        .global(DELETE_BONUS_CLAUSE, PaymentTermsAction::DeleteBonusClause)
        .global(ADD_PENALTY_CLAUSE, PaymentTermsAction::AddPenaltyClause)
        .global(UPDATE_PENALTY_CLAUSE, PaymentTermsAction::UpdatePenaltyClause)
        .global(DELETE_PENALTY_CLAUSE, PaymentTermsAction::DeletePenaltyClause);
}

pub fn add_bonus_clause(input: AddBonusClauseInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_BONUS_CLAUSE, Scope::Global, &input)
}

pub fn update_bonus_clause(input: UpdateBonusClauseInput) -> ActionEnvelope {
    ActionEnvelope::typed(UPDATE_BONUS_CLAUSE, Scope::Global, &input)
}

pub fn delete_bonus_clause(input: DeleteClauseInput) -> ActionEnvelope {
    ActionEnvelope::typed(DELETE_BONUS_CLAUSE, Scope::Global, &input)
}

pub fn add_penalty_clause(input: AddPenaltyClauseInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_PENALTY_CLAUSE, Scope::Global, &input)
}

pub fn update_penalty_clause(input: UpdatePenaltyClauseInput) -> ActionEnvelope {
    ActionEnvelope::typed(UPDATE_PENALTY_CLAUSE, Scope::Global, &input)
}

pub fn delete_penalty_clause(input: DeleteClauseInput) -> ActionEnvelope {
    ActionEnvelope::typed(DELETE_PENALTY_CLAUSE, Scope::Global, &input)
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

pub(super) fn add_bonus_clause_reducer(
    state: &mut PaymentTermsState,
    input: &AddBonusClauseInput,
) -> Result<(), DomainError> {
    insert_unique(
        &mut state.bonus_clauses,
        BonusClause {
            id: input.id.clone(),
            condition: input.condition.clone(),
            comment: input.comment.clone(),
            bonus_amount: input.bonus_amount,
        },
        BONUS,
    )
}

pub(super) fn update_bonus_clause_reducer(
    state: &mut PaymentTermsState,
    input: &UpdateBonusClauseInput,
) -> Result<(), DomainError> {
    let clause = find_mut(&mut state.bonus_clauses, &input.id, BONUS)?;
    if let Some(condition) = &input.condition {
        clause.condition = condition.clone();
    }
    input.comment.apply_to(&mut clause.comment);
    if let Some(amount) = input.bonus_amount {
        clause.bonus_amount = amount;
    }
    Ok(())
}

pub(super) fn delete_bonus_clause_reducer(
    state: &mut PaymentTermsState,
    input: &DeleteClauseInput,
) -> Result<(), DomainError> {
    remove_by_id(&mut state.bonus_clauses, &input.id, BONUS).map(|_| ())
}

pub(super) fn add_penalty_clause_reducer(
    state: &mut PaymentTermsState,
    input: &AddPenaltyClauseInput,
) -> Result<(), DomainError> {
    insert_unique(
        &mut state.penalty_clauses,
        PenaltyClause {
            id: input.id.clone(),
            condition: input.condition.clone(),
            comment: input.comment.clone(),
            deduction_amount: input.deduction_amount,
        },
        PENALTY,
    )
}

pub(super) fn update_penalty_clause_reducer(
    state: &mut PaymentTermsState,
    input: &UpdatePenaltyClauseInput,
) -> Result<(), DomainError> {
    let clause = find_mut(&mut state.penalty_clauses, &input.id, PENALTY)?;
    if let Some(condition) = &input.condition {
        clause.condition = condition.clone();
    }
    input.comment.apply_to(&mut clause.comment);
    if let Some(amount) = input.deduction_amount {
        clause.deduction_amount = amount;
    }
    Ok(())
}

pub(super) fn delete_penalty_clause_reducer(
    state: &mut PaymentTermsState,
    input: &DeleteClauseInput,
) -> Result<(), DomainError> {
    remove_by_id(&mut state.penalty_clauses, &input.id, PENALTY).map(|_| ())
}
