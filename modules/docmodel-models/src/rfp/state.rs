//! Request-for-proposals state.

use chrono::{DateTime, Utc};
use docmodel_core::Identified;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfpStatus {
    #[default]
    Draft,
    RequestForComments,
    OpenForProposals,
    Awarded,
    NotAwarded,
    Closed,
    Canceled,
}

/// Review state of a proposal submitted against the RFP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfpProposalStatus {
    #[default]
    Submitted,
    OpenedForReview,
    NeedsRevision,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpProposal {
    pub id: String,
    pub title: String,
    pub status: RfpProposalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDocument {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RfpState {
    pub issuer: String,
    pub title: String,
    pub code: Option<String>,
    pub summary: String,
    pub briefing: String,
    pub rfp_status: RfpStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub budget_range: Option<BudgetRange>,
    pub tags: Vec<String>,
    pub proposals: Vec<RfpProposal>,
    pub context_documents: Vec<ContextDocument>,
}

impl Identified for RfpProposal {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ContextDocument {
    fn id(&self) -> &str {
        &self.id
    }
}
