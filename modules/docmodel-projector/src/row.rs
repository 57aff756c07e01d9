use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docmodel_core::DocumentHeader;
use docmodel_models::WorkstreamState;

/// One projected workstream. Keyed by `workstream_phid` (the document id);
/// every other column is nullable and holds the latest projected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkstreamRow {
    pub workstream_phid: String,
    pub workstream_slug: Option<String>,
    pub workstream_title: Option<String>,
    pub workstream_status: Option<String>,
    pub network_phid: Option<String>,
    pub network_slug: Option<String>,
    pub drive_id: Option<String>,
    pub rfp_phid: Option<String>,
    pub initial_proposal_status: Option<String>,
    pub initial_proposal_author: Option<String>,
    pub sow_phid: Option<String>,
    pub payment_terms_phid: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkstreamRow {
    /// Derive the row from a workstream's header and global state.
    ///
    /// Pure: the same inputs always give the same row, so re-delivering an
    /// event rewrites identical values.
    pub fn derive(
        drive_id: &str,
        header: &DocumentHeader,
        state: &WorkstreamState,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let slug = if header.slug.is_empty() {
            state.title.as_deref().map(slugify)
        } else {
            Some(header.slug.clone())
        };
        let initial = state.initial_proposal.as_ref();

        Self {
            workstream_phid: header.id.clone(),
            workstream_slug: slug.filter(|s| !s.is_empty()),
            workstream_title: state.title.clone(),
            workstream_status: Some(state.status.as_str().to_string()),
            network_phid: state.client.as_ref().map(|c| c.id.clone()),
            network_slug: state
                .client
                .as_ref()
                .map(|c| slugify(&c.name))
                .filter(|s| !s.is_empty()),
            drive_id: Some(drive_id.to_string()),
            rfp_phid: state.rfp.as_ref().map(|r| r.id.clone()),
            initial_proposal_status: initial.map(|p| p.status.as_str().to_string()),
            initial_proposal_author: initial.map(|p| p.author.name.clone()),
            sow_phid: initial.map(|p| p.sow.clone()).filter(|s| !s.is_empty()),
            payment_terms_phid: initial
                .map(|p| p.payment_terms.clone())
                .filter(|s| !s.is_empty()),
            created_at: Some(header.created_at),
            updated_at: Some(updated_at),
        }
    }
}

/// Lowercase, ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_models::workstream::{
        ClientInfo, Proposal, ProposalAuthor, ProposalStatus, RfpRef, WorkstreamStatus,
    };

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Powerhouse  Network!"), "powerhouse-network");
        assert_eq!(slugify("--Arbitrum DAO 2.0--"), "arbitrum-dao-2-0");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn derives_every_column() {
        let header = DocumentHeader::new("docmodel/workstream")
            .with_id("ws-1")
            .with_slug("indexer");
        let state = WorkstreamState {
            title: Some("Indexer".into()),
            status: WorkstreamStatus::Awarded,
            client: Some(ClientInfo {
                id: "net-1".into(),
                name: "Powerhouse Network".into(),
                icon: None,
            }),
            rfp: Some(RfpRef {
                id: "rfp-1".into(),
                title: "Indexer RFP".into(),
            }),
            initial_proposal: Some(Proposal {
                id: "p1".into(),
                sow: "sow-1".into(),
                payment_terms: "pt-1".into(),
                status: ProposalStatus::Accepted,
                author: ProposalAuthor {
                    id: "b-1".into(),
                    name: "Builder One".into(),
                    icon: None,
                },
            }),
            ..Default::default()
        };
        let now = Utc::now();

        let row = WorkstreamRow::derive("drive-1", &header, &state, now);

        assert_eq!(row.workstream_phid, "ws-1");
        assert_eq!(row.workstream_slug.as_deref(), Some("indexer"));
        assert_eq!(row.workstream_status.as_deref(), Some("AWARDED"));
        assert_eq!(row.network_phid.as_deref(), Some("net-1"));
        assert_eq!(row.network_slug.as_deref(), Some("powerhouse-network"));
        assert_eq!(row.drive_id.as_deref(), Some("drive-1"));
        assert_eq!(row.rfp_phid.as_deref(), Some("rfp-1"));
        assert_eq!(row.initial_proposal_status.as_deref(), Some("ACCEPTED"));
        assert_eq!(row.initial_proposal_author.as_deref(), Some("Builder One"));
        assert_eq!(row.sow_phid.as_deref(), Some("sow-1"));
        assert_eq!(row.payment_terms_phid.as_deref(), Some("pt-1"));
        assert_eq!(row.updated_at, Some(now));
    }

    #[test]
    fn empty_state_yields_sparse_row() {
        let header = DocumentHeader::new("docmodel/workstream").with_id("ws-2");
        let row = WorkstreamRow::derive("drive-1", &header, &WorkstreamState::default(), Utc::now());

        assert_eq!(row.workstream_slug, None);
        assert_eq!(row.workstream_status.as_deref(), Some("RFP_DRAFT"));
        assert_eq!(row.network_phid, None);
        assert_eq!(row.initial_proposal_status, None);
    }
}
