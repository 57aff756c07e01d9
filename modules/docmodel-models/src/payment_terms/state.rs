//! Payment terms state: the agreed amounts, schedule and conditions between
//! a proposer and a payer.

use chrono::NaiveDate;
use docmodel_core::Identified;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTermsStatus {
    #[default]
    Draft,
    Submitted,
    Accepted,
    Rejected,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentModel {
    #[default]
    Milestone,
    TimeAndMaterials,
}

/// Payout lifecycle of one milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutStatus {
    #[default]
    Pending,
    ReadyForApproval,
    Approved,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationFrequency {
    Weekly,
    Monthly,
    Quarterly,
    PerMilestone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub expected_completion_date: Option<NaiveDate>,
    pub requires_approval: bool,
    pub payout_status: PayoutStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusClause {
    pub id: String,
    pub condition: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub bonus_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyClause {
    pub id: String,
    pub condition: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub deduction_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowDetails {
    pub amount_held: f64,
    #[serde(default)]
    pub proof_of_funds_document_id: Option<String>,
    pub release_conditions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationTerms {
    pub frequency: EvaluationFrequency,
    pub evaluator_team: String,
    pub impacts_payout: bool,
    pub impacts_reputation: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Global scope of a payment terms document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentTermsState {
    pub status: PaymentTermsStatus,
    pub proposer: String,
    pub payer: String,
    pub currency: String,
    pub payment_model: PaymentModel,
    pub total_amount: f64,
    pub milestone_schedule: Vec<Milestone>,
    pub bonus_clauses: Vec<BonusClause>,
    pub penalty_clauses: Vec<PenaltyClause>,
    pub escrow_details: Option<EscrowDetails>,
    pub evaluation: Option<EvaluationTerms>,
}

impl PaymentTermsState {
    /// Sum of all milestone amounts.
    pub fn scheduled_amount(&self) -> f64 {
        self.milestone_schedule.iter().map(|m| m.amount).sum()
    }
}

impl Identified for Milestone {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for BonusClause {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for PenaltyClause {
    fn id(&self) -> &str {
        &self.id
    }
}
