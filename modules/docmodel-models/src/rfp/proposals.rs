//! Proposals submitted against an RFP.

use docmodel_core::collection::{find_mut, insert_unique, remove_by_id};
use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Scope, Validate, Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{RfpProposal, RfpProposalStatus, RfpState};
use super::{Rfp, RfpAction};

pub const ADD_PROPOSAL: &str = "ADD_PROPOSAL";
pub const CHANGE_PROPOSAL_STATUS: &str = "CHANGE_PROPOSAL_STATUS";
pub const REMOVE_PROPOSAL: &str = "REMOVE_PROPOSAL";

const COLLECTION: &str = "proposals";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddProposalInput {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: RfpProposalStatus,
}

impl Validate for AddProposalInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeProposalStatusInput {
    pub id: String,
    pub status: RfpProposalStatus,
}

impl Validate for ChangeProposalStatusInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveProposalInput {
    pub id: String,
}

impl Validate for RemoveProposalInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

pub fn register(registry: &mut ActionRegistry<Rfp>) {
    registry
        .global(ADD_PROPOSAL, RfpAction::AddProposal)
        .global(CHANGE_PROPOSAL_STATUS, RfpAction::ChangeProposalStatus)
        .global(REMOVE_PROPOSAL, RfpAction::RemoveProposal);
}

pub fn add_proposal(input: AddProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_PROPOSAL, Scope::Global, &input)
}

pub fn change_proposal_status(input: ChangeProposalStatusInput) -> ActionEnvelope {
    ActionEnvelope::typed(CHANGE_PROPOSAL_STATUS, Scope::Global, &input)
}

pub fn remove_proposal(input: RemoveProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(REMOVE_PROPOSAL, Scope::Global, &input)
}

pub(super) fn add_proposal_reducer(
    state: &mut RfpState,
    input: &AddProposalInput,
) -> Result<(), DomainError> {
    insert_unique(
        &mut state.proposals,
        RfpProposal {
            id: input.id.clone(),
            title: input.title.clone(),
            status: input.status,
        },
        COLLECTION,
    )
}

pub(super) fn change_proposal_status_reducer(
    state: &mut RfpState,
    input: &ChangeProposalStatusInput,
) -> Result<(), DomainError> {
    find_mut(&mut state.proposals, &input.id, COLLECTION)?.status = input.status;
    Ok(())
}

pub(super) fn remove_proposal_reducer(
    state: &mut RfpState,
    input: &RemoveProposalInput,
) -> Result<(), DomainError> {
    remove_by_id(&mut state.proposals, &input.id, COLLECTION).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_targets_one_proposal() {
        let mut state = RfpState::default();
        for id in ["p1", "p2"] {
            add_proposal_reducer(
                &mut state,
                &AddProposalInput {
                    id: id.into(),
                    title: format!("Proposal {id}"),
                    status: RfpProposalStatus::Submitted,
                },
            )
            .unwrap();
        }

        change_proposal_status_reducer(
            &mut state,
            &ChangeProposalStatusInput {
                id: "p2".into(),
                status: RfpProposalStatus::Approved,
            },
        )
        .unwrap();

        assert_eq!(state.proposals[0].status, RfpProposalStatus::Submitted);
        assert_eq!(state.proposals[1].status, RfpProposalStatus::Approved);
    }

    #[test]
    fn unknown_proposal_is_not_found() {
        let mut state = RfpState::default();
        let err = remove_proposal_reducer(&mut state, &RemoveProposalInput { id: "p1".into() })
            .unwrap_err();
        assert_eq!(err, DomainError::not_found(COLLECTION, "p1"));
    }
}
