//! Top-level terms: parties, currency, totals, status, escrow, evaluation.

use docmodel_core::{
    ActionEnvelope, ActionRegistry, DomainError, FieldViolation, Scope, Validate, Violations,
};
use serde::{Deserialize, Serialize};

use super::state::{
    EscrowDetails, EvaluationFrequency, EvaluationTerms, PaymentModel, PaymentTermsState,
    PaymentTermsStatus,
};
use super::{PaymentTerms, PaymentTermsAction};

pub const SET_BASIC_TERMS: &str = "SET_BASIC_TERMS";
pub const UPDATE_STATUS: &str = "UPDATE_STATUS";
pub const SET_ESCROW_DETAILS: &str = "SET_ESCROW_DETAILS";
pub const SET_EVALUATION_TERMS: &str = "SET_EVALUATION_TERMS";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Partial update of the parties and amounts. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBasicTermsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_model: Option<PaymentModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

impl Validate for SetBasicTermsInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        if let Some(currency) = &self.currency {
            v.currency("currency", currency);
        }
        if let Some(total) = self.total_amount {
            v.non_negative("totalAmount", total);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatusInput {
    pub status: PaymentTermsStatus,
}

impl Validate for UpdateStatusInput {}

/// Replaces the escrow arrangement wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEscrowDetailsInput {
    pub amount_held: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_of_funds_document_id: Option<String>,
    pub release_conditions: String,
}

impl Validate for SetEscrowDetailsInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.non_negative("amountHeld", self.amount_held)
            .non_empty("releaseConditions", &self.release_conditions);
        if let Some(doc) = &self.proof_of_funds_document_id {
            v.identifier("proofOfFundsDocumentId", doc);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEvaluationTermsInput {
    pub frequency: EvaluationFrequency,
    pub evaluator_team: String,
    pub impacts_payout: bool,
    pub impacts_reputation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Validate for SetEvaluationTermsInput {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut v = Violations::new();
        v.non_empty("evaluatorTeam", &self.evaluator_team);
        v.finish()
    }
}

// ---------------------------------------------------------------------------
// Registration and action creators
// ---------------------------------------------------------------------------

pub fn register(registry: &mut ActionRegistry<PaymentTerms>) {
    registry
        .global(SET_BASIC_TERMS, PaymentTermsAction::SetBasicTerms)
        .global(UPDATE_STATUS, PaymentTermsAction::UpdateStatus)
        .global(SET_ESCROW_DETAILS, PaymentTermsAction::SetEscrowDetails)
        .global(SET_EVALUATION_TERMS, PaymentTermsAction::SetEvaluationTerms);
}

pub fn set_basic_terms(input: SetBasicTermsInput) -> ActionEnvelope {
    ActionEnvelope::typed(SET_BASIC_TERMS, Scope::Global, &input)
}

pub fn update_status(input: UpdateStatusInput) -> ActionEnvelope {
    ActionEnvelope::typed(UPDATE_STATUS, Scope::Global, &input)
}

pub fn set_escrow_details(input: SetEscrowDetailsInput) -> ActionEnvelope {
    ActionEnvelope::typed(SET_ESCROW_DETAILS, Scope::Global, &input)
}

pub fn set_evaluation_terms(input: SetEvaluationTermsInput) -> ActionEnvelope {
    ActionEnvelope::typed(SET_EVALUATION_TERMS, Scope::Global, &input)
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

pub(super) fn set_basic_terms_reducer(
    state: &mut PaymentTermsState,
    input: &SetBasicTermsInput,
) -> Result<(), DomainError> {
    if let Some(proposer) = &input.proposer {
        state.proposer = proposer.clone();
    }
    if let Some(payer) = &input.payer {
        state.payer = payer.clone();
    }
    if let Some(currency) = &input.currency {
        state.currency = currency.clone();
    }
    if let Some(model) = input.payment_model {
        state.payment_model = model;
    }
    if let Some(total) = input.total_amount {
        state.total_amount = total;
    }
    Ok(())
}

pub(super) fn update_status_reducer(
    state: &mut PaymentTermsState,
    input: &UpdateStatusInput,
) -> Result<(), DomainError> {
    state.status = input.status;
    Ok(())
}

pub(super) fn set_escrow_details_reducer(
    state: &mut PaymentTermsState,
    input: &SetEscrowDetailsInput,
) -> Result<(), DomainError> {
    state.escrow_details = Some(EscrowDetails {
        amount_held: input.amount_held,
        proof_of_funds_document_id: input.proof_of_funds_document_id.clone(),
        release_conditions: input.release_conditions.clone(),
    });
    Ok(())
}

pub(super) fn set_evaluation_terms_reducer(
    state: &mut PaymentTermsState,
    input: &SetEvaluationTermsInput,
) -> Result<(), DomainError> {
    state.evaluation = Some(EvaluationTerms {
        frequency: input.frequency,
        evaluator_team: input.evaluator_team.clone(),
        impacts_payout: input.impacts_payout,
        impacts_reputation: input.impacts_reputation,
        comment: input.comment.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_core::decode_input;
    use serde_json::json;

    #[test]
    fn basic_terms_keep_absent_fields() {
        let mut state = PaymentTermsState {
            proposer: "ph-builders".into(),
            payer: String::new(),
            currency: "USD".into(),
            total_amount: 12_000.0,
            ..Default::default()
        };

        set_basic_terms_reducer(
            &mut state,
            &SetBasicTermsInput {
                payer: Some("powerhouse".into()),
                total_amount: Some(0.0),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(state.proposer, "ph-builders");
        assert_eq!(state.payer, "powerhouse");
        assert_eq!(state.currency, "USD");
        assert_eq!(state.total_amount, 0.0);
    }

    #[test]
    fn lowercase_currency_is_rejected() {
        let err = decode_input::<SetBasicTermsInput>(SET_BASIC_TERMS, &json!({"currency": "usd"}))
            .unwrap_err();
        assert!(err.has_field("currency"));
    }

    #[test]
    fn negative_total_is_rejected() {
        let err =
            decode_input::<SetBasicTermsInput>(SET_BASIC_TERMS, &json!({"totalAmount": -1}))
                .unwrap_err();
        assert!(err.has_field("totalAmount"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = decode_input::<UpdateStatusInput>(UPDATE_STATUS, &json!({"status": "ARCHIVED"}))
            .unwrap_err();
        assert!(err.has_field("$input"));
    }

    #[test]
    fn escrow_replaces_previous_arrangement() {
        let mut state = PaymentTermsState::default();
        let first = SetEscrowDetailsInput {
            amount_held: 5_000.0,
            proof_of_funds_document_id: Some("doc-7".into()),
            release_conditions: "on approval".into(),
        };
        set_escrow_details_reducer(&mut state, &first).unwrap();

        let second = SetEscrowDetailsInput {
            amount_held: 2_500.0,
            proof_of_funds_document_id: None,
            release_conditions: "monthly".into(),
        };
        set_escrow_details_reducer(&mut state, &second).unwrap();

        let escrow = state.escrow_details.unwrap();
        assert_eq!(escrow.amount_held, 2_500.0);
        assert_eq!(escrow.proof_of_funds_document_id, None);
    }
}
