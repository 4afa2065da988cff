use thiserror::Error;

/// Failures surfaced by the configuration and consent-source layers.
/// Nothing here ever crosses `process_event`; the gate absorbs and logs.
#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown consent purpose: {0}")]
    UnknownPurpose(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returned by a `CaptureClient` when a resubmission could not be handed to the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("monitoring transport unavailable")]
    TransportUnavailable,

    #[error("capture rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, ConsentError>;
