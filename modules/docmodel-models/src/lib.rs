pub mod catalog;
pub mod payment_terms;
pub mod rfp;
pub mod workstream;

pub use catalog::{ModelKind, UnknownModel};
pub use payment_terms::{PaymentTerms, PaymentTermsAction, PaymentTermsState};
pub use rfp::{Rfp, RfpAction, RfpState};
pub use workstream::{Workstream, WorkstreamAction, WorkstreamState};
