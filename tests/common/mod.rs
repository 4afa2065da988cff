#![allow(dead_code)]

use std::collections::HashSet;

use parking_lot::Mutex;
use uuid::Uuid;

use consent_gate::policy::{SdkConfigurator, SdkOptions};
use consent_gate::replay::ReconstructedError;
use consent_gate::{CaptureClient, CaptureError, EventHint, Level, MonitoringEvent, PurposeMapping};

#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Exception(ReconstructedError),
    Message(String, Level),
    Event(Uuid),
}

/// Capture client that remembers every call. Calls whose 0-based index is in
/// `failing` return `TransportUnavailable` (but are still recorded).
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Captured>>,
    failing: HashSet<usize>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(indices: &[usize]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: indices.iter().copied().collect(),
        }
    }

    pub fn calls(&self) -> Vec<Captured> {
        self.calls.lock().clone()
    }

    fn push(&self, captured: Captured) -> Result<Uuid, CaptureError> {
        let mut calls = self.calls.lock();
        let index = calls.len();
        calls.push(captured);
        if self.failing.contains(&index) {
            Err(CaptureError::TransportUnavailable)
        } else {
            Ok(Uuid::new_v4())
        }
    }
}

impl CaptureClient for RecordingClient {
    fn capture_exception(&self, error: &ReconstructedError) -> Result<Uuid, CaptureError> {
        self.push(Captured::Exception(error.clone()))
    }

    fn capture_message(&self, message: &str, level: Level) -> Result<Uuid, CaptureError> {
        self.push(Captured::Message(message.to_string(), level))
    }

    fn capture_event(&self, event: MonitoringEvent, _hint: &EventHint) -> Result<Uuid, CaptureError> {
        self.push(Captured::Event(event.event_id))
    }
}

#[derive(Default)]
pub struct RecordingConfigurator {
    pushed: Mutex<Vec<SdkOptions>>,
}

impl RecordingConfigurator {
    pub fn pushed(&self) -> Vec<SdkOptions> {
        self.pushed.lock().clone()
    }
}

impl SdkConfigurator for RecordingConfigurator {
    fn reconfigure(&self, options: &SdkOptions) {
        self.pushed.lock().push(options.clone());
    }
}

pub fn mapping() -> PurposeMapping {
    PurposeMapping::new("functional", "analytics", "marketing", "preferences")
}
