//! Observability records for admission and consent decisions.
//!
//! Records are a read-only side channel: nothing in the gate, monitor or
//! replay path ever reads them back to make a decision. They carry event ids,
//! types, levels and counts only, never message text or stack frames.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{BlockReason, GateRecord};
pub use metrics::{compute_stats, GateStats};
pub use recorder::GateRecorder;
