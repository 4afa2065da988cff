pub mod capture;
pub mod scheduler;

pub use capture::{CaptureClient, ReconstructedError, ReplayKind};
pub use scheduler::{ReplayReport, ReplayScheduler};
