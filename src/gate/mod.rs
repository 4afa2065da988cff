pub mod queue;

pub use queue::{EventQueue, QueuedEvent};

use crate::consent::Readiness;
use crate::protocol::{EventHint, MonitoringEvent};
use crate::telemetry::{BlockReason, GateRecord, GateRecorder};

/// Fate of one event offered for transmission.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Transmit unchanged.
    Allow(MonitoringEvent),
    /// Must not be transmitted.
    Block,
    /// Held for replay; not transmitted now. Carries the queue depth after the push.
    Queue { depth: usize },
}

impl Admission {
    /// What the SDK's processing pipeline gets back: the event, or nothing.
    pub fn into_event(self) -> Option<MonitoringEvent> {
        match self {
            Admission::Allow(event) => Some(event),
            Admission::Block | Admission::Queue { .. } => None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allow(_))
    }
}

/// Classifies each event as allow, block or queue from the current readiness.
/// Never waits: the only side effects are the queue push and the record.
/// A closed gate blocks everything regardless of readiness.
#[derive(Debug, Default)]
pub struct EventAdmissionGate {
    queue: EventQueue,
    closed: bool,
    debug: bool,
}

impl EventAdmissionGate {
    pub fn new(debug: bool) -> Self {
        Self {
            queue: EventQueue::new(),
            closed: false,
            debug,
        }
    }

    pub fn admit(
        &mut self,
        readiness: Readiness,
        event: MonitoringEvent,
        hint: EventHint,
        recorder: &mut GateRecorder,
    ) -> Admission {
        if self.closed {
            verbose!(self.debug, event_id = %event.event_id, "Event blocked - consent gate closed");
            recorder.record(GateRecord::blocked(&event, BlockReason::GateClosed));
            return Admission::Block;
        }

        match readiness {
            Readiness::ReadyGranted => {
                verbose!(self.debug, event_id = %event.event_id, "Event allowed - consent granted");
                recorder.record(GateRecord::allowed(&event));
                Admission::Allow(event)
            }
            Readiness::ReadyDenied => {
                verbose!(self.debug, event_id = %event.event_id, "Event blocked - consent not granted");
                recorder.record(GateRecord::blocked(&event, BlockReason::NoFunctionalConsent));
                Admission::Block
            }
            Readiness::NotReady => {
                verbose!(self.debug, event_id = %event.event_id, "Event queued - waiting for consent");
                let record = GateRecord::queued(&event, self.queue.len() + 1);
                let depth = self.queue.push(event, hint);
                recorder.record(record);
                Admission::Queue { depth }
            }
        }
    }

    /// Discards the queue and blocks every later event. Returns how many were discarded.
    pub fn close(&mut self) -> usize {
        self.closed = true;
        self.discard()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn drain(&mut self) -> Vec<QueuedEvent> {
        self.queue.drain_all()
    }

    pub fn discard(&mut self) -> usize {
        let discarded = self.queue.clear();
        if discarded > 0 {
            verbose!(self.debug, discarded, "Clearing queued events");
        }
        discarded
    }
}
