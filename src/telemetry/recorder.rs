use std::collections::VecDeque;

use tracing::info;

use super::event::GateRecord;
use super::metrics::{compute_stats, GateStats};

const MAX_RECORDS: usize = 10_000;

/// Bounded in-process log of gate records. Oldest records fall off first.
#[derive(Debug)]
pub struct GateRecorder {
    buffer: VecDeque<GateRecord>,
}

impl GateRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(256),
        }
    }

    /// Appends the record and mirrors it to the `consent_gate::events` log target.
    pub fn record(&mut self, record: GateRecord) {
        info!(target: "consent_gate::events", record = ?record, "{}", record.headline());

        if self.buffer.len() >= MAX_RECORDS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &GateRecord> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn stats(&self) -> GateStats {
        compute_stats(&self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for GateRecorder {
    fn default() -> Self {
        Self::new()
    }
}
