use std::fmt;

use uuid::Uuid;

use crate::error::CaptureError;
use crate::protocol::{EventHint, ExceptionValue, Level, MonitoringEvent};

const FALLBACK_ERROR_MESSAGE: &str = "Queued error";

/// Public capture entry points of the monitoring SDK. Injected once at
/// construction and only called during replay, never during admission.
pub trait CaptureClient: Send + Sync {
    fn capture_exception(&self, error: &ReconstructedError) -> Result<Uuid, CaptureError>;

    fn capture_message(&self, message: &str, level: Level) -> Result<Uuid, CaptureError>;

    fn capture_event(&self, event: MonitoringEvent, hint: &EventHint) -> Result<Uuid, CaptureError>;
}

/// Error rebuilt from a queued exception event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedError {
    pub kind: Option<String>,
    pub message: String,
    /// One `filename:lineno` line per frame, `None` if the event had no stacktrace.
    pub stack: Option<String>,
}

impl ReconstructedError {
    pub fn from_exception(exception: &ExceptionValue) -> Self {
        let message = exception
            .value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string();

        let stack = exception.stacktrace.as_ref().map(|trace| {
            trace
                .frames
                .iter()
                .map(|frame| {
                    format!(
                        "{}:{}",
                        frame.filename.as_deref().unwrap_or("unknown"),
                        frame.lineno.unwrap_or(0)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        });

        Self {
            kind: exception.ty.clone(),
            message,
            stack,
        }
    }
}

impl fmt::Display for ReconstructedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ReconstructedError {}

/// Which capture API a queued event goes back through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayKind {
    Exception,
    Message,
    Generic,
}

impl ReplayKind {
    pub fn classify(event: &MonitoringEvent) -> Self {
        if event.primary_exception().is_some() {
            ReplayKind::Exception
        } else if event.message_text().is_some() {
            ReplayKind::Message
        } else {
            ReplayKind::Generic
        }
    }
}
