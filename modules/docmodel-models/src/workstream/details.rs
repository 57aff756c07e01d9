//! Workstream details: code, title, status, client, linked RFP and
//! payment requests.

use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Patch, Scope, Validate,
    Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{ClientInfo, RfpRef, WorkstreamState, WorkstreamStatus};
use super::{Workstream, WorkstreamAction};

pub const EDIT_WORKSTREAM: &str = "EDIT_WORKSTREAM";
pub const EDIT_CLIENT_INFO: &str = "EDIT_CLIENT_INFO";
pub const SET_REQUEST_FOR_PROPOSAL: &str = "SET_REQUEST_FOR_PROPOSAL";
pub const ADD_PAYMENT_REQUEST: &str = "ADD_PAYMENT_REQUEST";
pub const REMOVE_PAYMENT_REQUEST: &str = "REMOVE_PAYMENT_REQUEST";

const PAYMENT_REQUESTS: &str = "paymentRequests";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditWorkstreamInput {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub code: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkstreamStatus>,
}

impl Validate for EditWorkstreamInput {}

/// Sets or edits the client. Creating a client requires `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditClientInfoInput {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon: Patch<String>,
}

impl Validate for EditClientInfoInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("clientId", &self.client_id);
        if let Some(icon) = self.icon.value() {
            v.url("icon", icon);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRequestForProposalInput {
    pub rfp_id: String,
    pub title: String,
}

impl Validate for SetRequestForProposalInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("rfpId", &self.rfp_id);
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestInput {
    pub payment_request: String,
}

impl Validate for PaymentRequestInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.identifier("paymentRequest", &self.payment_request);
        v.finish()
    }
}

// ---------------------------------------------------------------------------
// Registration and action creators
// ---------------------------------------------------------------------------

pub fn register(registry: &mut ActionRegistry<Workstream>) {
    registry
        .global(EDIT_WORKSTREAM, WorkstreamAction::EditWorkstream)
        .global(EDIT_CLIENT_INFO, WorkstreamAction::EditClientInfo)
        .global(SET_REQUEST_FOR_PROPOSAL, WorkstreamAction::SetRequestForProposal)
        .global(ADD_PAYMENT_REQUEST, WorkstreamAction::AddPaymentRequest)
        .global(REMOVE_PAYMENT_REQUEST, WorkstreamAction::RemovePaymentRequest);
}

pub fn edit_workstream(input: EditWorkstreamInput) -> ActionEnvelope {
    ActionEnvelope::typed(EDIT_WORKSTREAM, Scope::Global, &input)
}

pub fn edit_client_info(input: EditClientInfoInput) -> ActionEnvelope {
    ActionEnvelope::typed(EDIT_CLIENT_INFO, Scope::Global, &input)
}

pub fn set_request_for_proposal(input: SetRequestForProposalInput) -> ActionEnvelope {
    ActionEnvelope::typed(SET_REQUEST_FOR_PROPOSAL, Scope::Global, &input)
}

pub fn add_payment_request(input: PaymentRequestInput) -> ActionEnvelope {
    ActionEnvelope::typed(ADD_PAYMENT_REQUEST, Scope::Global, &input)
}

pub fn remove_payment_request(input: PaymentRequestInput) -> ActionEnvelope {
    ActionEnvelope::typed(REMOVE_PAYMENT_REQUEST, Scope::Global, &input)
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

pub(super) fn edit_workstream_reducer(
    state: &mut WorkstreamState,
    input: &EditWorkstreamInput,
) -> Result<(), DomainError> {
    input.code.apply_to(&mut state.code);
    input.title.apply_to(&mut state.title);
    if let Some(status) = input.status {
        state.status = status;
    }
    Ok(())
}

pub(super) fn edit_client_info_reducer(
    state: &mut WorkstreamState,
    input: &EditClientInfoInput,
) -> Result<(), DomainError> {
    match &mut state.client {
        Some(client) if client.id == input.client_id => {
            if let Some(name) = &input.name {
                client.name = name.clone();
            }
            input.icon.apply_to(&mut client.icon);
        }
        // First client, or a switch to another one: nothing carries over.
        _ => {
            let name = input.name.clone().ok_or_else(|| DomainError::required("name"))?;
            state.client = Some(ClientInfo {
                id: input.client_id.clone(),
                name,
                icon: input.icon.value().cloned(),
            });
        }
    }
    Ok(())
}

pub(super) fn set_request_for_proposal_reducer(
    state: &mut WorkstreamState,
    input: &SetRequestForProposalInput,
) -> Result<(), DomainError> {
    state.rfp = Some(RfpRef {
        id: input.rfp_id.clone(),
        title: input.title.clone(),
    });
    Ok(())
}

pub(super) fn add_payment_request_reducer(
    state: &mut WorkstreamState,
    input: &PaymentRequestInput,
) -> Result<(), DomainError> {
    if state.payment_requests.contains(&input.payment_request) {
        return Err(DomainError::duplicate(
            PAYMENT_REQUESTS,
            &input.payment_request,
        ));
    }
    state.payment_requests.push(input.payment_request.clone());
    Ok(())
}

pub(super) fn remove_payment_request_reducer(
    state: &mut WorkstreamState,
    input: &PaymentRequestInput,
) -> Result<(), DomainError> {
    let position = state
        .payment_requests
        .iter()
        .position(|p| *p == input.payment_request)
        .ok_or_else(|| DomainError::not_found(PAYMENT_REQUESTS, &input.payment_request))?;
    state.payment_requests.remove(position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_workstream_clears_and_keeps() {
        let mut state = WorkstreamState {
            code: Some("WS-1".into()),
            title: Some("Indexer".into()),
            ..Default::default()
        };

        edit_workstream_reducer(
            &mut state,
            &EditWorkstreamInput {
                code: Patch::Null,
                status: Some(WorkstreamStatus::OpenForProposals),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(state.code, None);
        assert_eq!(state.title.as_deref(), Some("Indexer"));
        assert_eq!(state.status, WorkstreamStatus::OpenForProposals);
    }

    #[test]
    fn first_client_edit_requires_a_name() {
        let mut state = WorkstreamState::default();
        let err = edit_client_info_reducer(
            &mut state,
            &EditClientInfoInput {
                client_id: "net-1".into(),
                ..Default::default()
            },
        )
        .unwrap_err();

        assert_eq!(err, DomainError::required("name"));
        assert_eq!(state.client, None);
    }

    #[test]
    fn later_client_edits_are_partial() {
        let mut state = WorkstreamState::default();
        edit_client_info_reducer(
            &mut state,
            &EditClientInfoInput {
                client_id: "net-1".into(),
                name: Some("Powerhouse".into()),
                icon: Patch::Value("https://example.org/icon.png".into()),
            },
        )
        .unwrap();
        edit_client_info_reducer(
            &mut state,
            &EditClientInfoInput {
                client_id: "net-1".into(),
                name: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();

        let client = state.client.unwrap();
        assert_eq!(client.name, "");
        assert_eq!(client.icon.as_deref(), Some("https://example.org/icon.png"));
    }

    #[test]
    fn switching_client_replaces_it_and_needs_a_name() {
        let mut state = WorkstreamState::default();
        edit_client_info_reducer(
            &mut state,
            &EditClientInfoInput {
                client_id: "net-1".into(),
                name: Some("Powerhouse".into()),
                icon: Patch::Value("https://example.org/icon.png".into()),
            },
        )
        .unwrap();
        let before = state.clone();

        let err = edit_client_info_reducer(
            &mut state,
            &EditClientInfoInput {
                client_id: "net-2".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, DomainError::required("name"));
        assert_eq!(state, before);

        edit_client_info_reducer(
            &mut state,
            &EditClientInfoInput {
                client_id: "net-2".into(),
                name: Some("Arbitrum".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let client = state.client.unwrap();
        assert_eq!(client.id, "net-2");
        assert_eq!(client.name, "Arbitrum");
        assert_eq!(client.icon, None);
    }

    #[test]
    fn payment_requests_are_unique() {
        let mut state = WorkstreamState::default();
        let input = PaymentRequestInput {
            payment_request: "pr-1".into(),
        };
        add_payment_request_reducer(&mut state, &input).unwrap();

        assert_eq!(
            add_payment_request_reducer(&mut state, &input).unwrap_err(),
            DomainError::duplicate(PAYMENT_REQUESTS, "pr-1")
        );
        remove_payment_request_reducer(&mut state, &input).unwrap();
        assert_eq!(
            remove_payment_request_reducer(&mut state, &input).unwrap_err(),
            DomainError::not_found(PAYMENT_REQUESTS, "pr-1")
        );
    }
}
