//! Everything the gate knows about the external consent runtime: the four
//! purpose categories, the snapshot it reads back, and the narrow source contract.

pub mod fake;
pub mod purpose;
pub mod snapshot;
pub mod source;

pub use fake::FakeConsentSource;
pub use purpose::{Purpose, PurposeMapping};
pub use snapshot::{ConsentSnapshot, Readiness};
pub use source::{set_consent, ConsentSource, SourcePoll};
