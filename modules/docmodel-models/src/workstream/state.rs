//! Workstream state: one client engagement from request for proposals to
//! delivery.

use docmodel_core::Identified;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkstreamStatus {
    #[default]
    RfpDraft,
    PreworkRfc,
    RfpCancelled,
    OpenForProposals,
    ProposalSubmitted,
    NotAwarded,
    Awarded,
    Finished,
}

impl WorkstreamStatus {
    /// The wire tag, as stored in projections.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkstreamStatus::RfpDraft => "RFP_DRAFT",
            WorkstreamStatus::PreworkRfc => "PREWORK_RFC",
            WorkstreamStatus::RfpCancelled => "RFP_CANCELLED",
            WorkstreamStatus::OpenForProposals => "OPEN_FOR_PROPOSALS",
            WorkstreamStatus::ProposalSubmitted => "PROPOSAL_SUBMITTED",
            WorkstreamStatus::NotAwarded => "NOT_AWARDED",
            WorkstreamStatus::Awarded => "AWARDED",
            WorkstreamStatus::Finished => "FINISHED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Submitted,
    RequestedChanges,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "DRAFT",
            ProposalStatus::Submitted => "SUBMITTED",
            ProposalStatus::RequestedChanges => "REQUESTED_CHANGES",
            ProposalStatus::Rejected => "REJECTED",
            ProposalStatus::Accepted => "ACCEPTED",
            ProposalStatus::Withdrawn => "WITHDRAWN",
        }
    }
}

/// The network (client organisation) a workstream is run for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalAuthor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A proposal links a scope-of-work and a payment terms document by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub sow: String,
    pub payment_terms: String,
    pub status: ProposalStatus,
    pub author: ProposalAuthor,
}

impl Identified for Proposal {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkstreamState {
    pub code: Option<String>,
    pub title: Option<String>,
    pub status: WorkstreamStatus,
    pub client: Option<ClientInfo>,
    pub rfp: Option<RfpRef>,
    pub initial_proposal: Option<Proposal>,
    pub alternative_proposals: Vec<Proposal>,
    pub payment_requests: Vec<String>,
}

impl WorkstreamState {
    /// Whether any proposal (initial or alternative) uses `id`.
    pub fn has_proposal(&self, id: &str) -> bool {
        self.initial_proposal.as_ref().is_some_and(|p| p.id == id)
            || self.alternative_proposals.iter().any(|p| p.id == id)
    }
}
