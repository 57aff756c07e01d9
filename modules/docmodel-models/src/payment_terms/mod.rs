//! Payment terms document model.
//!
//! Three reducer modules contribute actions: `terms` (parties, totals,
//! status, escrow, evaluation), `milestones` and `clauses`. All actions are
//! global; the model has no local scope.

pub mod clauses;
pub mod milestones;
pub mod state;
pub mod terms;

use docmodel_core::{ActionRegistry, DocumentModel, DomainError, NoLocalActions};

pub use clauses::{
    AddBonusClauseInput, AddPenaltyClauseInput, DeleteClauseInput, UpdateBonusClauseInput,
    UpdatePenaltyClauseInput,
};
pub use milestones::{
    AddMilestoneInput, DeleteMilestoneInput, ReorderMilestonesInput, UpdateMilestoneInput,
    UpdateMilestoneStatusInput,
};
pub use state::{
    BonusClause, EscrowDetails, EvaluationFrequency, EvaluationTerms, Milestone, PaymentModel,
    PaymentTermsState, PaymentTermsStatus, PayoutStatus, PenaltyClause,
};
pub use terms::{
    SetBasicTermsInput, SetEscrowDetailsInput, SetEvaluationTermsInput, UpdateStatusInput,
};

pub const DOCUMENT_TYPE: &str = "docmodel/payment-terms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTerms;

/// Every global action of the payment terms model.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentTermsAction {
    SetBasicTerms(SetBasicTermsInput),
    UpdateStatus(UpdateStatusInput),
    SetEscrowDetails(SetEscrowDetailsInput),
    SetEvaluationTerms(SetEvaluationTermsInput),
    AddMilestone(AddMilestoneInput),
    UpdateMilestone(UpdateMilestoneInput),
    UpdateMilestoneStatus(UpdateMilestoneStatusInput),
    DeleteMilestone(DeleteMilestoneInput),
    ReorderMilestones(ReorderMilestonesInput),
    AddBonusClause(AddBonusClauseInput),
    UpdateBonusClause(UpdateBonusClauseInput),
    DeleteBonusClause(DeleteClauseInput),
    AddPenaltyClause(AddPenaltyClauseInput),
    UpdatePenaltyClause(UpdatePenaltyClauseInput),
    DeletePenaltyClause(DeleteClauseInput),
}

impl DocumentModel for PaymentTerms {
    const DOCUMENT_TYPE: &'static str = DOCUMENT_TYPE;

    type GlobalState = PaymentTermsState;
    type LocalState = ();
    type GlobalAction = PaymentTermsAction;
    type LocalAction = NoLocalActions;

    fn register(registry: &mut ActionRegistry<Self>) {
        terms::register(registry);
        milestones::register(registry);
        clauses::register(registry);
    }

    fn reduce_global(
        state: &mut PaymentTermsState,
        action: &PaymentTermsAction,
    ) -> Result<(), DomainError> {
        use PaymentTermsAction::*;
        match action {
            SetBasicTerms(input) => terms::set_basic_terms_reducer(state, input),
            UpdateStatus(input) => terms::update_status_reducer(state, input),
            SetEscrowDetails(input) => terms::set_escrow_details_reducer(state, input),
            SetEvaluationTerms(input) => terms::set_evaluation_terms_reducer(state, input),
            AddMilestone(input) => milestones::add_milestone_reducer(state, input),
            UpdateMilestone(input) => milestones::update_milestone_reducer(state, input),
            UpdateMilestoneStatus(input) => {
                milestones::update_milestone_status_reducer(state, input)
            }
            DeleteMilestone(input) => milestones::delete_milestone_reducer(state, input),
            ReorderMilestones(input) => milestones::reorder_milestones_reducer(state, input),
            AddBonusClause(input) => clauses::add_bonus_clause_reducer(state, input),
            UpdateBonusClause(input) => clauses::update_bonus_clause_reducer(state, input),
            DeleteBonusClause(input) => clauses::delete_bonus_clause_reducer(state, input),
            AddPenaltyClause(input) => clauses::add_penalty_clause_reducer(state, input),
            UpdatePenaltyClause(input) => clauses::update_penalty_clause_reducer(state, input),
            DeletePenaltyClause(input) => clauses::delete_penalty_clause_reducer(state, input),
        }
    }

    fn reduce_local(_state: &mut (), action: &NoLocalActions) -> Result<(), DomainError> {
        match *action {}
    }
}
