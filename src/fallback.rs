use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    Idle,
    Armed { deadline: Instant },
    /// A consent check won the race.
    Disarmed,
    /// The deadline won the race and forced a denial.
    Fired,
}

/// One-shot deadline that bounds how long the gate may stay `NotReady`.
/// Fires at most once, and never after a consent check has disarmed it.
#[derive(Debug, Clone)]
pub struct TimeoutFallback {
    timeout: Duration,
    state: FallbackState,
}

impl TimeoutFallback {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, state: FallbackState::Idle }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> FallbackState {
        self.state
    }

    /// Arms from `Idle` only; re-arming a settled fallback is ignored.
    /// A timeout too large to represent as a deadline never fires.
    pub fn arm(&mut self, now: Instant) {
        if self.state != FallbackState::Idle {
            return;
        }
        self.state = match now.checked_add(self.timeout) {
            Some(deadline) => FallbackState::Armed { deadline },
            None => {
                warn!(timeout = ?self.timeout, "Consent timeout out of range, fallback disabled");
                FallbackState::Disarmed
            }
        };
    }

    /// Returns true if a pending deadline was cancelled.
    pub fn disarm(&mut self) -> bool {
        match self.state {
            FallbackState::Armed { .. } => {
                self.state = FallbackState::Disarmed;
                true
            }
            FallbackState::Idle => {
                self.state = FallbackState::Disarmed;
                false
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            FallbackState::Armed { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.state, FallbackState::Armed { deadline } if now >= deadline)
    }

    /// Consumes the deadline. True only for the single transition `Armed -> Fired`.
    pub fn fire(&mut self) -> bool {
        if let FallbackState::Armed { .. } = self.state {
            self.state = FallbackState::Fired;
            true
        } else {
            false
        }
    }

    pub fn has_fired(&self) -> bool {
        self.state == FallbackState::Fired
    }
}
