//! Request-for-proposals document model. Reducer modules: `details` (the
//! `EDIT_RFP` action), `context` and `proposals`.

pub mod context;
pub mod details;
pub mod proposals;
pub mod state;

use docmodel_core::{ActionRegistry, DocumentModel, DomainError, NoLocalActions};

pub use context::{AddContextDocumentInput, RemoveContextDocumentInput};
pub use details::EditRfpInput;
pub use proposals::{AddProposalInput, ChangeProposalStatusInput, RemoveProposalInput};
pub use state::{BudgetRange, ContextDocument, RfpProposal, RfpProposalStatus, RfpState, RfpStatus};

pub const DOCUMENT_TYPE: &str = "docmodel/rfp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rfp;

#[derive(Debug, Clone, PartialEq)]
pub enum RfpAction {
    EditRfp(EditRfpInput),
    AddContextDocument(AddContextDocumentInput),
    RemoveContextDocument(RemoveContextDocumentInput),
    AddProposal(AddProposalInput),
    ChangeProposalStatus(ChangeProposalStatusInput),
    RemoveProposal(RemoveProposalInput),
}

impl DocumentModel for Rfp {
    const DOCUMENT_TYPE: &'static str = DOCUMENT_TYPE;

    type GlobalState = RfpState;
    type LocalState = ();
    type GlobalAction = RfpAction;
    type LocalAction = NoLocalActions;

    fn register(registry: &mut ActionRegistry<Self>) {
        details::register(registry);
        context::register(registry);
        proposals::register(registry);
    }

    fn reduce_global(state: &mut RfpState, action: &RfpAction) -> Result<(), DomainError> {
        match action {
            RfpAction::EditRfp(input) => details::edit_rfp_reducer(state, input),
            RfpAction::AddContextDocument(input) => context::add_context_document_reducer(state, input),
            RfpAction::RemoveContextDocument(input) => {
                context::remove_context_document_reducer(state, input)
            }
            RfpAction::AddProposal(input) => proposals::add_proposal_reducer(state, input),
            RfpAction::ChangeProposalStatus(input) => {
                proposals::change_proposal_status_reducer(state, input)
            }
            RfpAction::RemoveProposal(input) => proposals::remove_proposal_reducer(state, input),
        }
    }

    fn reduce_local(_state: &mut (), action: &NoLocalActions) -> Result<(), DomainError> {
        match *action {}
    }
}
