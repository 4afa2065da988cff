//! Consent gate for a monitoring SDK.
//!
//! Watches an external consent runtime and decides, per outbound monitoring
//! event, whether it may leave (allow), must not leave (block) or has to wait
//! for a decision (queue). Queued events are replayed through the SDK's
//! capture API once consent is granted, or dropped when it is denied or the
//! decision times out.

/// Diagnostic logging that only fires when the integration runs with `debug` on.
macro_rules! verbose {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            ::tracing::debug!(target: "consent_gate", $($arg)+);
        }
    };
}

pub mod config;
pub mod consent;
pub mod error;
pub mod fallback;
pub mod gate;
pub mod integration;
pub mod monitor;
pub mod policy;
pub mod protocol;
pub mod replay;
pub mod session;
pub mod telemetry;

pub use config::{Backoff, GateConfig, PollSchedule};
pub use consent::{ConsentSnapshot, ConsentSource, FakeConsentSource, Purpose, PurposeMapping, Readiness};
pub use error::{CaptureError, ConsentError};
pub use gate::Admission;
pub use integration::{ConsentIntegration, GateStatus, INTEGRATION_NAME};
pub use protocol::{EventHint, Level, MonitoringEvent};
pub use replay::CaptureClient;
