use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consent::ConsentSnapshot;
use crate::protocol::{Level, MonitoringEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    NoFunctionalConsent,
    /// The integration was cleaned up; nothing can decide or replay any more.
    GateClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum GateRecord {
    EventAllowed {
        event_type: Option<String>,
        event_id: Uuid,
        level: Option<Level>,
    },

    EventBlocked {
        reason: BlockReason,
        event_type: Option<String>,
        event_id: Uuid,
        level: Option<Level>,
    },

    EventQueued {
        event_type: Option<String>,
        event_id: Uuid,
        queue_size: usize, // depth after the push
    },

    ConsentGranted {
        queued_events: usize,
    },

    ConsentDenied {
        discarded_events: usize,
    },

    ConsentChanged {
        from: bool,
        to: bool,
        new_state: ConsentSnapshot,
    },

    ConsentTimeout {
        discarded_events: usize,
    },

    ReplayFinished {
        attempted: usize,
        failed: usize,
        discarded: usize,
    },
}

impl GateRecord {
    pub fn allowed(event: &MonitoringEvent) -> Self {
        GateRecord::EventAllowed {
            event_type: event.event_type.clone(),
            event_id: event.event_id,
            level: event.level,
        }
    }

    pub fn blocked(event: &MonitoringEvent, reason: BlockReason) -> Self {
        GateRecord::EventBlocked {
            reason,
            event_type: event.event_type.clone(),
            event_id: event.event_id,
            level: event.level,
        }
    }

    pub fn queued(event: &MonitoringEvent, queue_size: usize) -> Self {
        GateRecord::EventQueued {
            event_type: event.event_type.clone(),
            event_id: event.event_id,
            queue_size,
        }
    }

    /// Human-readable headline, used as the log message.
    pub fn headline(&self) -> &'static str {
        match self {
            GateRecord::EventAllowed { .. } => "Monitoring event allowed",
            GateRecord::EventBlocked { .. } => "Monitoring event blocked",
            GateRecord::EventQueued { .. } => "Monitoring event queued",
            GateRecord::ConsentGranted { .. } => "Consent granted",
            GateRecord::ConsentDenied { .. } => "Consent denied",
            GateRecord::ConsentChanged { .. } => "Consent status changed",
            GateRecord::ConsentTimeout { .. } => "Consent timeout",
            GateRecord::ReplayFinished { .. } => "Queued events replayed",
        }
    }
}
