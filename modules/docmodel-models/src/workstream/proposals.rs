//! Initial and alternative proposals.
//!
//! Proposal ids are unique across the initial proposal and all
//! alternatives.

use docmodel_core::collection::{find_mut, remove_by_id};
use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Scope, Validate, Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{Proposal, ProposalAuthor, ProposalStatus, WorkstreamState};
use super::{Workstream, WorkstreamAction};

pub const EDIT_INITIAL_PROPOSAL: &str = "EDIT_INITIAL_PROPOSAL";
pub const ADD_ALTERNATIVE_PROPOSAL: &str = "ADD_ALTERNATIVE_PROPOSAL";
pub const EDIT_ALTERNATIVE_PROPOSAL: &str = "EDIT_ALTERNATIVE_PROPOSAL";
pub const REMOVE_ALTERNATIVE_PROPOSAL: &str = "REMOVE_ALTERNATIVE_PROPOSAL";

const PROPOSALS: &str = "proposals";
const ALTERNATIVES: &str = "alternativeProposals";
const INITIAL: &str = "initialProposal";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Partial edit of a proposal. Creating the initial proposal requires
/// `author`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditProposalInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ProposalAuthor>,
}

impl Validate for EditProposalInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        if let Some(author) = &self.author {
            v.identifier("author.id", &author.id);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAlternativeProposalInput {
    pub id: String,
    pub sow: String,
    pub payment_terms: String,
    #[serde(default)]
    pub status: ProposalStatus,
    pub author: ProposalAuthor,
}

impl Validate for AddAlternativeProposalInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id)
            .identifier("sow", &self.sow)
            .identifier("paymentTerms", &self.payment_terms)
            .identifier("author.id", &self.author.id);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveAlternativeProposalInput {
    pub id: String,
}

impl Validate for RemoveAlternativeProposalInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("id", &self.id);
        v.finish()
    }
}

// ---------------------------------------------------------------------------
// Registration and action creators
// ---------------------------------------------------------------------------

pub fn register(registry: &mut ActionRegistry<Workstream>) {
    registry
        .global(EDIT_INITIAL_PROPOSAL, WorkstreamAction::EditInitialProposal)
        .global(ADD_ALTERNATIVE_PROPOSAL, WorkstreamAction::AddAlternativeProposal)
        .global(EDIT_ALTERNATIVE_PROPOSAL, WorkstreamAction::EditAlternativeProposal)
        .global(REMOVE_ALTERNATIVE_PROPOSAL, WorkstreamAction::RemoveAlternativeProposal);
}

pub fn edit_initial_proposal(input: EditProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(EDIT_INITIAL_PROPOSAL, Scope::Global, &input)
}

pub fn add_alternative_proposal(input: AddAlternativeProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_ALTERNATIVE_PROPOSAL, Scope::Global, &input)
}

pub fn edit_alternative_proposal(input: EditProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(EDIT_ALTERNATIVE_PROPOSAL, Scope::Global, &input)
}

pub fn remove_alternative_proposal(input: RemoveAlternativeProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(REMOVE_ALTERNATIVE_PROPOSAL, Scope::Global, &input)
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

fn apply_edit(proposal: &mut Proposal, input: &EditProposalInput) {
    if let Some(sow) = &input.sow {
        proposal.sow = sow.clone();
    }
    if let Some(payment_terms) = &input.payment_terms {
        proposal.payment_terms = payment_terms.clone();
    }
    if let Some(status) = input.status {
        proposal.status = status;
    }
    if let Some(author) = &input.author {
        proposal.author = author.clone();
    }
}

pub(super) fn edit_initial_proposal_reducer(
    state: &mut WorkstreamState,
    input: &EditProposalInput,
) -> Result<(), DomainError> {
    if state.alternative_proposals.iter().any(|p| p.id == input.id) {
        return Err(DomainError::duplicate(PROPOSALS, &input.id));
    }

    match &mut state.initial_proposal {
        Some(proposal) if proposal.id != input.id => {
            return Err(DomainError::not_found(INITIAL, &input.id));
        }
        Some(proposal) => apply_edit(proposal, input),
        None => {
            let author = input
                .author
                .clone()
                .ok_or_else(|| DomainError::required("author"))?;
            state.initial_proposal = Some(Proposal {
                id: input.id.clone(),
                sow: input.sow.clone().unwrap_or_default(),
                payment_terms: input.payment_terms.clone().unwrap_or_default(),
                status: input.status.unwrap_or_default(),
                author,
            });
        }
    }
    Ok(())
}

pub(super) fn add_alternative_proposal_reducer(
    state: &mut WorkstreamState,
    input: &AddAlternativeProposalInput,
) -> Result<(), DomainError> {
    if state.has_proposal(&input.id) {
        return Err(DomainError::duplicate(PROPOSALS, &input.id));
    }
    state.alternative_proposals.push(Proposal {
        id: input.id.clone(),
        sow: input.sow.clone(),
        payment_terms: input.payment_terms.clone(),
        status: input.status,
        author: input.author.clone(),
    });
    Ok(())
}

pub(super) fn edit_alternative_proposal_reducer(
    state: &mut WorkstreamState,
    input: &EditProposalInput,
) -> Result<(), DomainError> {
    let proposal = find_mut(&mut state.alternative_proposals, &input.id, ALTERNATIVES)?;
    apply_edit(proposal, input);
    Ok(())
}

pub(super) fn remove_alternative_proposal_reducer(
    state: &mut WorkstreamState,
    input: &RemoveAlternativeProposalInput,
) -> Result<(), DomainError> {
    remove_by_id(&mut state.alternative_proposals, &input.id, ALTERNATIVES).map(|_| ())
}
