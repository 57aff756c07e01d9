//! Lookup of the built-in models by short name or document type.

use std::fmt;
use std::str::FromStr;

use docmodel_core::DocumentModel;
use thiserror::Error;

use crate::{PaymentTerms, Rfp, Workstream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    PaymentTerms,
    Workstream,
    Rfp,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown document model `{0}` (expected payment-terms, workstream or rfp)")]
pub struct UnknownModel(pub String);

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::PaymentTerms, ModelKind::Workstream, ModelKind::Rfp];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::PaymentTerms => "payment-terms",
            ModelKind::Workstream => "workstream",
            ModelKind::Rfp => "rfp",
        }
    }

    pub fn document_type(&self) -> &'static str {
        match self {
            ModelKind::PaymentTerms => PaymentTerms::DOCUMENT_TYPE,
            ModelKind::Workstream => Workstream::DOCUMENT_TYPE,
            ModelKind::Rfp => Rfp::DOCUMENT_TYPE,
        }
    }

    pub fn from_document_type(document_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.document_type() == document_type)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = UnknownModel;

    /// Accepts the short name or the full document type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.document_type() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
