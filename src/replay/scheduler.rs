use tracing::debug;
use uuid::Uuid;

use super::capture::{CaptureClient, ReconstructedError, ReplayKind};
use crate::error::CaptureError;
use crate::gate::QueuedEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub attempted: usize,
    pub failed: usize,
    /// Dropped unreplayed because consent was no longer granted at drain time.
    pub discarded: usize,
}

impl ReplayReport {
    pub fn is_empty(&self) -> bool {
        self.attempted == 0 && self.discarded == 0
    }
}

/// Re-offers queued events to the SDK's capture API once consent is granted.
/// The original transmission was suppressed, not delayed, so each event has
/// to be captured again.
#[derive(Debug, Clone, Default)]
pub struct ReplayScheduler {
    debug: bool,
}

impl ReplayScheduler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Replays `batch` in arrival order. `granted` is the consent state sampled
    /// once when the batch was drained; if it is false the whole batch is discarded.
    /// A failed resubmission is logged (debug only) and the loop moves on.
    pub fn replay(&self, batch: Vec<QueuedEvent>, granted: bool, client: &dyn CaptureClient) -> ReplayReport {
        let mut report = ReplayReport::default();
        if batch.is_empty() {
            return report;
        }

        if !granted {
            verbose!(self.debug, count = batch.len(), "Discarding queued events due to no consent");
            report.discarded = batch.len();
            return report;
        }

        verbose!(self.debug, count = batch.len(), "Processing queued events");

        for queued in batch {
            let event_id = queued.event.event_id;
            verbose!(self.debug, %event_id, kind = ?ReplayKind::classify(&queued.event), "Re-sending queued event");
            report.attempted += 1;

            if let Err(err) = Self::resubmit(queued, client) {
                report.failed += 1;
                verbose!(self.debug, %event_id, error = %err, "Replay of queued event failed");
            }
        }

        debug!(attempted = report.attempted, failed = report.failed, "Replay finished");
        report
    }

    fn resubmit(queued: QueuedEvent, client: &dyn CaptureClient) -> Result<Uuid, CaptureError> {
        let QueuedEvent { event, hint } = queued;

        if let Some(exception) = event.primary_exception() {
            return client.capture_exception(&ReconstructedError::from_exception(exception));
        }
        if let Some(text) = event.message_text() {
            return client.capture_message(text, event.level.unwrap_or_default());
        }
        client.capture_event(event, &hint)
    }
}
