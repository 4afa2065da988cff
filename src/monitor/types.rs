use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::consent::ConsentSnapshot;

/// What the monitor decided on a step. The integration turns these into
/// queue replays, queue discards and SDK reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorSignal {
    /// A consent check found functional consent granted.
    Granted { snapshot: ConsentSnapshot },

    /// A consent check found functional consent missing or denied.
    Denied { snapshot: ConsentSnapshot },

    /// Steady-state polling observed a different flag or snapshot.
    Changed {
        from: bool,
        to: bool,
        previous: ConsentSnapshot,
        snapshot: ConsentSnapshot,
    },

    /// The fallback deadline passed before any consent check ran.
    TimedOut,
}

impl MonitorSignal {
    /// Signals that must flush whatever was queued while undecided: a check that
    /// found consent, or a denied -> granted change.
    pub fn opens_replay(&self) -> bool {
        matches!(
            self,
            MonitorSignal::Granted { .. } | MonitorSignal::Changed { from: false, to: true, .. }
        )
    }

    pub fn snapshot(&self) -> Option<ConsentSnapshot> {
        match self {
            MonitorSignal::Granted { snapshot }
            | MonitorSignal::Denied { snapshot }
            | MonitorSignal::Changed { snapshot, .. } => Some(*snapshot),
            MonitorSignal::TimedOut => None,
        }
    }
}

/// Pending deadlines of the three independent timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSet {
    pub timeout: Option<Instant>,
    pub availability: Option<Instant>,
    pub change: Option<Instant>,
}

impl TimerSet {
    /// Earliest pending deadline.
    pub fn next(&self) -> Option<Instant> {
        [self.timeout, self.availability, self.change]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn pending(&self) -> usize {
        [self.timeout, self.availability, self.change]
            .iter()
            .filter(|t| t.is_some())
            .count()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}
