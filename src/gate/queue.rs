use std::collections::VecDeque;

use crate::protocol::{EventHint, MonitoringEvent};

/// An event held back while no consent decision exists, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEvent {
    pub event: MonitoringEvent,
    pub hint: EventHint,
}

/// Unbounded FIFO of events admitted while `NotReady`.
#[derive(Debug, Default)]
pub struct EventQueue {
    entries: VecDeque<QueuedEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the depth after the push.
    pub fn push(&mut self, event: MonitoringEvent, hint: EventHint) -> usize {
        self.entries.push_back(QueuedEvent { event, hint });
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Swaps the queue for an empty one and hands back everything, oldest first.
    pub fn drain_all(&mut self) -> Vec<QueuedEvent> {
        std::mem::take(&mut self.entries).into()
    }

    /// Drops everything. Returns how many entries were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.entries.len();
        self.entries.clear();
        discarded
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedEvent> {
        self.entries.iter()
    }
}
