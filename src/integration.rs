use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::GateConfig;
use crate::consent::{ConsentSnapshot, ConsentSource, Readiness};
use crate::gate::{Admission, EventAdmissionGate, QueuedEvent};
use crate::monitor::{ConsentMonitor, MonitorSignal};
use crate::policy::{SdkConfigurator, SdkOptions};
use crate::protocol::{EventHint, MonitoringEvent};
use crate::replay::{CaptureClient, ReplayScheduler};
use crate::session::ConsentSession;
use crate::telemetry::{GateRecord, GateRecorder, GateStats};

pub const INTEGRATION_NAME: &str = "ConsentGateIntegration";

/// Read-only view of the gate for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStatus {
    pub readiness: Readiness,
    pub snapshot: ConsentSnapshot,
    pub queue_len: usize,
    pub pending_timers: usize,
}

struct Core {
    monitor: ConsentMonitor,
    gate: EventAdmissionGate,
    recorder: GateRecorder,
    session: Option<ConsentSession>,
}

/// Work that runs after the state lock is released, so capture calls that
/// re-enter `process_event` never deadlock.
#[derive(Default)]
struct Followup {
    replays: Vec<(Vec<QueuedEvent>, bool)>,
    options: Option<SdkOptions>,
}

impl Core {
    fn apply(&mut self, signals: Vec<MonitorSignal>) -> Followup {
        let mut followup = Followup::default();

        for signal in signals {
            match &signal {
                MonitorSignal::Granted { .. } => {
                    self.recorder.record(GateRecord::ConsentGranted {
                        queued_events: self.gate.queue_len(),
                    });
                }
                MonitorSignal::Denied { .. } => {
                    let discarded = self.gate.discard();
                    self.recorder.record(GateRecord::ConsentDenied { discarded_events: discarded });
                }
                MonitorSignal::Changed { from, to, snapshot, .. } => {
                    self.recorder.record(GateRecord::ConsentChanged {
                        from: *from,
                        to: *to,
                        new_state: *snapshot,
                    });
                    if !*to {
                        info!("Consent revoked, future events will be blocked");
                    }
                }
                MonitorSignal::TimedOut => {
                    let discarded = self.gate.discard();
                    self.recorder.record(GateRecord::ConsentTimeout { discarded_events: discarded });
                }
            }

            if signal.opens_replay() {
                // Swap the queue out under the lock; consent is sampled once for the whole batch.
                let batch = self.gate.drain();
                followup.replays.push((batch, self.monitor.readiness().is_granted()));
            }

            if let Some(session) = self.session.as_mut() {
                // A timeout carries no snapshot: reconcile as if nothing was granted.
                let consent = signal.snapshot().unwrap_or_default();
                followup.options = Some(session.update_consent(consent).clone());
            }
        }

        followup
    }
}

struct Shared {
    core: Mutex<Core>,
    source: Arc<dyn ConsentSource>,
    client: Arc<dyn CaptureClient>,
    configurator: Option<Arc<dyn SdkConfigurator>>,
    scheduler: ReplayScheduler,
}

impl Shared {
    fn step<F>(&self, f: F)
    where
        F: FnOnce(&mut ConsentMonitor, &dyn ConsentSource, Instant) -> Vec<MonitorSignal>,
    {
        let followup = {
            let mut core = self.core.lock();
            let signals = f(&mut core.monitor, self.source.as_ref(), Instant::now());
            if signals.is_empty() {
                return;
            }
            core.apply(signals)
        };
        self.run(followup);
    }

    fn run(&self, followup: Followup) {
        for (batch, granted) in followup.replays {
            let report = self.scheduler.replay(batch, granted, self.client.as_ref());
            if !report.is_empty() {
                self.core.lock().recorder.record(GateRecord::ReplayFinished {
                    attempted: report.attempted,
                    failed: report.failed,
                    discarded: report.discarded,
                });
            }
        }

        if let (Some(configurator), Some(options)) = (&self.configurator, followup.options) {
            configurator.reconfigure(&options);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.core.lock().monitor.timers().next()
    }
}

/// Timer loop. Sleeps until the monitor's earliest deadline, then lets every
/// due timer fire. Ends when no timer is pending or on cancellation.
async fn drive(shared: Arc<Shared>, cancel: CancellationToken) {
    loop {
        let Some(deadline) = shared.next_deadline() else {
            break;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep_until(deadline) => {
                shared.step(|monitor, source, now| monitor.advance(source, now));
            }
        }
    }
}

/// Consent-gating event processor for the monitoring SDK.
///
/// `setup_once` starts discovery, `process_event` is the per-event admission
/// entry point, and `cleanup` is the host's teardown hook. None of them
/// return errors or panic on consent-source trouble.
pub struct ConsentIntegration {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    driver: Mutex<Option<JoinHandle<()>>>,
    started: AtomicBool,
    debug: bool,
}

pub struct ConsentIntegrationBuilder {
    config: GateConfig,
    source: Arc<dyn ConsentSource>,
    client: Arc<dyn CaptureClient>,
    configurator: Option<(Arc<dyn SdkConfigurator>, SdkOptions)>,
}

impl ConsentIntegrationBuilder {
    /// Pushes reconciled SDK options to `configurator` on every consent decision.
    pub fn configurator(mut self, configurator: Arc<dyn SdkConfigurator>, original: SdkOptions) -> Self {
        self.configurator = Some((configurator, original));
        self
    }

    pub fn build(self) -> ConsentIntegration {
        let (configurator, session) = match self.configurator {
            Some((configurator, original)) => (Some(configurator), Some(ConsentSession::new(original))),
            None => (None, None),
        };

        let core = Core {
            monitor: ConsentMonitor::new(&self.config),
            gate: EventAdmissionGate::new(self.config.debug),
            recorder: GateRecorder::new(),
            session,
        };

        ConsentIntegration {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
                source: self.source,
                client: self.client,
                configurator,
                scheduler: ReplayScheduler::new(self.config.debug),
            }),
            cancel: CancellationToken::new(),
            driver: Mutex::new(None),
            started: AtomicBool::new(false),
            debug: self.config.debug,
        }
    }
}

impl ConsentIntegration {
    pub fn builder(
        config: GateConfig,
        source: Arc<dyn ConsentSource>,
        client: Arc<dyn CaptureClient>,
    ) -> ConsentIntegrationBuilder {
        ConsentIntegrationBuilder {
            config,
            source,
            client,
            configurator: None,
        }
    }

    pub fn new(config: GateConfig, source: Arc<dyn ConsentSource>, client: Arc<dyn CaptureClient>) -> Self {
        Self::builder(config, source, client).build()
    }

    pub fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    /// Starts consent discovery. Checks the source once synchronously, then
    /// hands the timers to a background task on the current tokio runtime.
    /// Later calls, and calls after `cleanup`, are ignored.
    pub fn setup_once(&self) {
        if self.cancel.is_cancelled() || self.started.swap(true, Ordering::SeqCst) {
            verbose!(self.debug, "Consent integration already set up");
            return;
        }

        verbose!(self.debug, "Setting up consent integration");
        self.shared.step(|monitor, source, now| monitor.initialize(source, now));

        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(drive(self.shared.clone(), self.cancel.clone()));
                *self.driver.lock() = Some(task);
            }
            Err(_) => {
                warn!("No tokio runtime available, consent polling and timeout are not running");
            }
        }
    }

    /// Tri-state admission decision for one event.
    pub fn admit(&self, event: MonitoringEvent, hint: EventHint) -> Admission {
        let mut core = self.shared.core.lock();
        let readiness = core.monitor.readiness();
        let Core { gate, recorder, .. } = &mut *core;
        gate.admit(readiness, event, hint, recorder)
    }

    /// Event-processor entry point: the event to transmit, or `None` to drop it.
    pub fn process_event(&self, event: MonitoringEvent, hint: EventHint) -> Option<MonitoringEvent> {
        self.admit(event, hint).into_event()
    }

    /// Cancels every timer, discards the queue and closes the gate. Idempotent.
    pub fn cleanup(&self) {
        self.cancel.cancel();
        if let Some(task) = self.driver.lock().take() {
            task.abort();
        }

        let mut core = self.shared.core.lock();
        core.monitor.cleanup();
        let discarded = core.gate.close();
        verbose!(self.debug, discarded, "Consent integration cleaned up");
    }

    pub fn status(&self) -> GateStatus {
        let core = self.shared.core.lock();
        GateStatus {
            readiness: core.monitor.readiness(),
            snapshot: core.monitor.snapshot(),
            queue_len: core.gate.queue_len(),
            pending_timers: core.monitor.timers().pending(),
        }
    }

    pub fn stats(&self) -> GateStats {
        self.shared.core.lock().recorder.stats()
    }

    pub fn records(&self) -> Vec<GateRecord> {
        self.shared.core.lock().recorder.records().cloned().collect()
    }

    /// Options most recently pushed to the configurator, if one is attached.
    pub fn sdk_options(&self) -> Option<SdkOptions> {
        self.shared
            .core
            .lock()
            .session
            .as_ref()
            .map(|session| session.options().clone())
    }
}

impl Drop for ConsentIntegration {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
