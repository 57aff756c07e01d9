//! Workstream document model.
//!
//! Tracks one client engagement: its RFP, the initial and alternative
//! proposals, and the payment requests raised against it. Reducer modules:
//! `details` and `proposals`. The relational projector reads this model.

pub mod details;
pub mod proposals;
pub mod state;

use docmodel_core::{ActionRegistry, DocumentModel, DomainError, NoLocalActions};

pub use details::{
    EditClientInfoInput, EditWorkstreamInput, PaymentRequestInput, SetRequestForProposalInput,
};
pub use proposals::{
    AddAlternativeProposalInput, EditProposalInput, RemoveAlternativeProposalInput,
};
pub use state::{
    ClientInfo, Proposal, ProposalAuthor, ProposalStatus, RfpRef, WorkstreamState,
    WorkstreamStatus,
};

pub const DOCUMENT_TYPE: &str = "docmodel/workstream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workstream;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkstreamAction {
    EditWorkstream(EditWorkstreamInput),
    EditClientInfo(EditClientInfoInput),
    SetRequestForProposal(SetRequestForProposalInput),
    AddPaymentRequest(PaymentRequestInput),
    RemovePaymentRequest(PaymentRequestInput),
    EditInitialProposal(EditProposalInput),
    AddAlternativeProposal(AddAlternativeProposalInput),
    EditAlternativeProposal(EditProposalInput),
    RemoveAlternativeProposal(RemoveAlternativeProposalInput),
}

impl DocumentModel for Workstream {
    const DOCUMENT_TYPE: &'static str = DOCUMENT_TYPE;

    type GlobalState = WorkstreamState;
    type LocalState = ();
    type GlobalAction = WorkstreamAction;
    type LocalAction = NoLocalActions;

    fn register(registry: &mut ActionRegistry<Self>) {
        details::register(registry);
        proposals::register(registry);
    }

    fn reduce_global(
        state: &mut WorkstreamState,
        action: &WorkstreamAction,
    ) -> Result<(), DomainError> {
        use WorkstreamAction::*;
        match action {
            EditWorkstream(input) => details::edit_workstream_reducer(state, input),
            EditClientInfo(input) => details::edit_client_info_reducer(state, input),
            SetRequestForProposal(input) => {
                details::set_request_for_proposal_reducer(state, input)
            }
            AddPaymentRequest(input) => details::add_payment_request_reducer(state, input),
            RemovePaymentRequest(input) => details::remove_payment_request_reducer(state, input),
            EditInitialProposal(input) => proposals::edit_initial_proposal_reducer(state, input),
            AddAlternativeProposal(input) => {
                proposals::add_alternative_proposal_reducer(state, input)
            }
            EditAlternativeProposal(input) => {
                proposals::edit_alternative_proposal_reducer(state, input)
            }
            RemoveAlternativeProposal(input) => {
                proposals::remove_alternative_proposal_reducer(state, input)
            }
        }
    }

    fn reduce_local(_state: &mut (), action: &NoLocalActions) -> Result<(), DomainError> {
        match *action {}
    }
}
