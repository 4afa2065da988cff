use tokio::time::Instant;
use tracing::debug;

use crate::config::{GateConfig, PollSchedule};
use crate::consent::{ConsentSnapshot, ConsentSource, PurposeMapping, Readiness, SourcePoll};
use crate::fallback::TimeoutFallback;
use crate::monitor::types::{MonitorSignal, TimerSet};

/// Owns readiness and the last consent snapshot, and moves them forward from
/// an external pollable source.
///
/// The monitor never sleeps. Every step takes `now` explicitly and reschedules
/// its own deadlines; a driver (see `ConsentIntegration`) sleeps until
/// `timers().next()` and calls `advance`. Tests drive it the same way with
/// hand-picked instants.
pub struct ConsentMonitor {
    mapping: PurposeMapping,
    availability_poll: PollSchedule,
    change_poll: PollSchedule,
    resume_after_timeout: bool,
    debug: bool,

    readiness: Readiness,
    snapshot: ConsentSnapshot,
    checks: u64,

    fallback: TimeoutFallback,
    availability_at: Option<Instant>,
    availability_attempts: u32,
    change_at: Option<Instant>,
}

impl ConsentMonitor {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            mapping: config.purpose_mapping.clone(),
            availability_poll: config.availability_poll,
            change_poll: config.change_poll,
            resume_after_timeout: config.resume_after_timeout,
            debug: config.debug,
            readiness: Readiness::NotReady,
            snapshot: ConsentSnapshot::default(),
            checks: 0,
            fallback: TimeoutFallback::new(config.timeout()),
            availability_at: None,
            availability_attempts: 0,
            change_at: None,
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn snapshot(&self) -> ConsentSnapshot {
        self.snapshot
    }

    pub fn mapping(&self) -> &PurposeMapping {
        &self.mapping
    }

    pub fn fallback(&self) -> &TimeoutFallback {
        &self.fallback
    }

    /// Number of consent checks performed so far.
    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub fn timers(&self) -> TimerSet {
        TimerSet {
            timeout: self.fallback.deadline(),
            availability: self.availability_at,
            change: self.change_at,
        }
    }

    pub fn is_polling_availability(&self) -> bool {
        self.availability_at.is_some()
    }

    pub fn is_polling_changes(&self) -> bool {
        self.change_at.is_some()
    }

    /// Discovery. Arms the fallback, then either checks consent right away
    /// (runtime already ready) or starts availability polling.
    pub fn initialize(&mut self, source: &dyn ConsentSource, now: Instant) -> Vec<MonitorSignal> {
        verbose!(self.debug, "Initializing consent monitoring");
        self.fallback.arm(now);

        match source.poll_once(&self.mapping) {
            SourcePoll::Ready(snapshot) => {
                verbose!(self.debug, "Consent API is ready");
                self.record_check(snapshot, now)
            }
            poll => {
                verbose!(self.debug, ?poll, "Consent API not ready, polling");
                self.availability_attempts = 0;
                self.availability_at = Some(now + self.availability_poll.delay(0));
                Vec::new()
            }
        }
    }

    /// Reads flag and snapshot together, marks the monitor ready and disarms the
    /// fallback. Starts steady-state change polling if it isn't running yet.
    pub fn check_consent(&mut self, source: &dyn ConsentSource, now: Instant) -> Vec<MonitorSignal> {
        let snapshot = source.read_snapshot(&self.mapping);
        self.record_check(snapshot, now)
    }

    fn record_check(&mut self, snapshot: ConsentSnapshot, now: Instant) -> Vec<MonitorSignal> {
        let granted = snapshot.functional_granted();
        verbose!(self.debug, granted, ?snapshot, "Consent check result");

        self.readiness = Readiness::from_granted(granted);
        self.snapshot = snapshot;
        self.checks += 1;

        if self.fallback.disarm() {
            debug!("Consent decided before timeout, fallback disarmed");
        }

        if self.change_at.is_none() {
            self.change_at = Some(now + self.change_poll.delay(0));
        }

        if granted {
            vec![MonitorSignal::Granted { snapshot }]
        } else {
            vec![MonitorSignal::Denied { snapshot }]
        }
    }

    /// One availability poll. Hands over to `check_consent` and stops polling
    /// once the runtime reports ready.
    pub fn on_availability_tick(&mut self, source: &dyn ConsentSource, now: Instant) -> Vec<MonitorSignal> {
        if self.availability_at.is_none() {
            return Vec::new();
        }

        if let SourcePoll::Ready(snapshot) = source.poll_once(&self.mapping) {
            verbose!(self.debug, attempts = self.availability_attempts, "Consent API became ready");
            self.availability_at = None;
            return self.record_check(snapshot, now);
        }

        self.availability_attempts = self.availability_attempts.saturating_add(1);
        self.availability_at = Some(now + self.availability_poll.delay(self.availability_attempts));
        Vec::new()
    }

    /// Forces `ReadyDenied` if no consent check has happened yet. Does not
    /// start change polling.
    pub fn on_timeout(&mut self) -> Vec<MonitorSignal> {
        if !self.fallback.fire() {
            return Vec::new();
        }

        verbose!(self.debug, "Consent timeout reached, proceeding without consent");
        self.readiness = Readiness::ReadyDenied;

        if !self.resume_after_timeout {
            self.availability_at = None;
        }

        vec![MonitorSignal::TimedOut]
    }

    /// One steady-state poll. Emits `Changed` only when the granted flag or
    /// any category differs from the stored values.
    pub fn on_change_tick(&mut self, source: &dyn ConsentSource, now: Instant) -> Vec<MonitorSignal> {
        if self.change_at.is_none() {
            return Vec::new();
        }
        self.change_at = Some(now + self.change_poll.delay(0));

        let snapshot = source.read_snapshot(&self.mapping);
        let granted = snapshot.functional_granted();
        let was_granted = self.readiness.is_granted();

        if granted == was_granted && snapshot == self.snapshot {
            return Vec::new();
        }

        verbose!(self.debug, from = was_granted, to = granted, "Consent changed");
        let previous = self.snapshot;
        self.readiness = Readiness::from_granted(granted);
        self.snapshot = snapshot;

        vec![MonitorSignal::Changed {
            from: was_granted,
            to: granted,
            previous,
            snapshot,
        }]
    }

    /// Runs every timer whose deadline is at or before `now`, in the order
    /// availability, timeout, change. Each due timer fires once.
    pub fn advance(&mut self, source: &dyn ConsentSource, now: Instant) -> Vec<MonitorSignal> {
        let mut signals = Vec::new();

        if self.availability_at.is_some_and(|at| now >= at) {
            signals.extend(self.on_availability_tick(source, now));
        }
        if self.fallback.is_due(now) {
            signals.extend(self.on_timeout());
        }
        if self.change_at.is_some_and(|at| now >= at) {
            signals.extend(self.on_change_tick(source, now));
        }

        signals
    }

    /// Cancels all three timers. Safe from any state, any number of times.
    pub fn cleanup(&mut self) {
        self.fallback.disarm();
        self.availability_at = None;
        self.change_at = None;
    }
}
