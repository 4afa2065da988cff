mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{mapping, Captured, RecordingClient, RecordingConfigurator};

use consent_gate::policy::SdkOptions;
use consent_gate::telemetry::{BlockReason, GateRecord};
use consent_gate::{
    ConsentIntegration, EventHint, FakeConsentSource, GateConfig, Level, MonitoringEvent, Readiness,
};

fn config(timeout_ms: u64) -> GateConfig {
    GateConfig::new(mapping()).with_timeout(Duration::from_millis(timeout_ms))
}

async fn sleep_ms(n: u64) {
    tokio::time::sleep(Duration::from_millis(n)).await;
}

fn integration(
    timeout_ms: u64,
    source: &Arc<FakeConsentSource>,
    client: &Arc<RecordingClient>,
) -> ConsentIntegration {
    ConsentIntegration::new(config(timeout_ms), source.clone(), client.clone())
}

#[tokio::test(start_paused = true)]
async fn test_absent_runtime_times_out_and_discards_queue() {
    let source = Arc::new(FakeConsentSource::absent());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(500, &source, &client);
    gate.setup_once();

    for i in 0..3 {
        let out = gate.process_event(MonitoringEvent::message(&format!("early {}", i), Level::Info), EventHint::default());
        assert!(out.is_none(), "Undecided events must not be transmitted");
    }
    assert_eq!(gate.status().queue_len, 3);

    sleep_ms(600).await;

    let status = gate.status();
    assert_eq!(status.readiness, Readiness::ReadyDenied);
    assert_eq!(status.queue_len, 0);

    let stats = gate.stats();
    assert_eq!(stats.timeouts, 1);
    assert_eq!(stats.discarded, 3);
    assert!(client.calls().is_empty(), "Nothing is replayed after a timeout");

    // Decided: later events are blocked, not queued.
    assert!(gate.process_event(MonitoringEvent::message("late", Level::Info), EventHint::default()).is_none());
    assert_eq!(gate.status().queue_len, 0);
    assert_eq!(gate.stats().blocked, 1);

    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_ready_runtime_allows_identical_event() {
    let source = Arc::new(FakeConsentSource::new().ready());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(10_000, &source, &client);
    gate.setup_once();

    assert_eq!(gate.status().readiness, Readiness::ReadyGranted);

    let event = MonitoringEvent::exception("Error", "boom", vec![]);
    let out = gate.process_event(event.clone(), EventHint::default());

    assert_eq!(out, Some(event));
    assert!(client.calls().is_empty(), "Live events go through the pipeline, not replay");
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_queued_message_replays_once_runtime_loads() {
    let source = Arc::new(FakeConsentSource::new());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(10_000, &source, &client);
    gate.setup_once();

    assert!(gate
        .process_event(MonitoringEvent::message("queued hello", Level::Warning), EventHint::default())
        .is_none());

    sleep_ms(150).await;
    source.mark_ready();
    sleep_ms(100).await;

    assert_eq!(client.calls(), vec![Captured::Message("queued hello".into(), Level::Warning)]);
    assert_eq!(gate.status().readiness, Readiness::ReadyGranted);
    assert_eq!(gate.status().queue_len, 0);

    let records = gate.records();
    assert!(records.contains(&GateRecord::ConsentGranted { queued_events: 1 }));
    assert!(records.contains(&GateRecord::ReplayFinished { attempted: 1, failed: 0, discarded: 0 }));
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_denied_then_granted_has_nothing_to_replay() {
    let source = Arc::new(FakeConsentSource::new().with_consent("functional", false).ready());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(10_000, &source, &client);
    gate.setup_once();

    assert_eq!(gate.status().readiness, Readiness::ReadyDenied);
    assert!(gate.process_event(MonitoringEvent::message("blocked", Level::Info), EventHint::default()).is_none());

    source.grant("functional", true);
    sleep_ms(1_100).await;

    assert_eq!(gate.status().readiness, Readiness::ReadyGranted);
    assert!(client.calls().is_empty(), "Blocked events are gone for good");

    let stats = gate.stats();
    assert_eq!(stats.changes, 1);
    assert_eq!(stats.replayed, 0);

    let event = MonitoringEvent::message("now allowed", Level::Info);
    assert_eq!(gate.process_event(event.clone(), EventHint::default()), Some(event));
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_flip_and_flip_back_recorded_twice() {
    let source = Arc::new(FakeConsentSource::new().ready());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(10_000, &source, &client);
    gate.setup_once();

    sleep_ms(500).await;
    source.grant("functional", false);
    sleep_ms(1_000).await;
    source.grant("functional", true);
    sleep_ms(600).await;

    let changes: Vec<_> = gate
        .records()
        .into_iter()
        .filter_map(|record| match record {
            GateRecord::ConsentChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();

    assert_eq!(changes, vec![(true, false), (false, true)]);
    assert_eq!(gate.status().readiness, Readiness::ReadyGranted);
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_stops_every_timer() {
    let source = Arc::new(FakeConsentSource::new());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(500, &source, &client);
    gate.setup_once();

    gate.process_event(MonitoringEvent::message("a", Level::Info), EventHint::default());
    gate.process_event(MonitoringEvent::message("b", Level::Info), EventHint::default());

    for _ in 0..3 {
        gate.cleanup();
        let status = gate.status();
        assert_eq!(status.pending_timers, 0);
        assert_eq!(status.queue_len, 0);
    }

    source.mark_ready();
    sleep_ms(1_000).await;

    let stats = gate.stats();
    assert_eq!(stats.timeouts, 0, "Timeout must not fire after cleanup");
    assert_eq!(stats.grants, 0, "Availability polling must not resume after cleanup");
    assert_eq!(gate.status().readiness, Readiness::NotReady);
    assert!(client.calls().is_empty());

    // A cleaned-up integration cannot be restarted.
    gate.setup_once();
    assert_eq!(gate.status().pending_timers, 0);
}

#[tokio::test(start_paused = true)]
async fn test_events_after_cleanup_are_blocked_not_queued() {
    let source = Arc::new(FakeConsentSource::new());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(500, &source, &client);
    gate.setup_once();
    gate.cleanup();

    for i in 0..1_000 {
        let out = gate.process_event(MonitoringEvent::message(&format!("after {}", i), Level::Info), EventHint::default());
        assert!(out.is_none());
    }

    assert_eq!(gate.status().queue_len, 0, "A cleaned-up gate must not keep collecting events");
    let stats = gate.stats();
    assert_eq!(stats.blocked, 1_000);
    assert_eq!(stats.queued, 0);
    assert!(gate.records().iter().any(|r| matches!(
        r,
        GateRecord::EventBlocked { reason: BlockReason::GateClosed, .. }
    )));

    // Still closed once the runtime shows up.
    source.mark_ready();
    sleep_ms(1_000).await;
    assert!(gate.process_event(MonitoringEvent::message("late", Level::Info), EventHint::default()).is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_late_runtime_after_timeout_grants() {
    let source = Arc::new(FakeConsentSource::new());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(300, &source, &client);
    gate.setup_once();

    gate.process_event(MonitoringEvent::message("lost", Level::Info), EventHint::default());
    sleep_ms(350).await;
    assert_eq!(gate.status().readiness, Readiness::ReadyDenied);

    source.mark_ready();
    sleep_ms(200).await;

    assert_eq!(gate.status().readiness, Readiness::ReadyGranted);
    assert!(client.calls().is_empty(), "Events discarded at timeout stay discarded");

    let records = gate.records();
    let timeout_at = records.iter().position(|r| matches!(r, GateRecord::ConsentTimeout { .. }));
    let granted_at = records.iter().position(|r| matches!(r, GateRecord::ConsentGranted { .. }));
    assert!(timeout_at.is_some() && granted_at.is_some());
    assert!(timeout_at < granted_at);
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_setup_once_is_idempotent() {
    let source = Arc::new(FakeConsentSource::new().ready());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(10_000, &source, &client);

    gate.setup_once();
    gate.setup_once();
    sleep_ms(2_500).await;

    let grants = gate
        .records()
        .iter()
        .filter(|r| matches!(r, GateRecord::ConsentGranted { .. }))
        .count();
    assert_eq!(grants, 1);
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_replay_failure_is_swallowed() {
    let source = Arc::new(FakeConsentSource::new());
    let client = Arc::new(RecordingClient::failing_at(&[0]));
    let gate = integration(10_000, &source, &client);
    gate.setup_once();

    gate.process_event(MonitoringEvent::exception("Error", "first", vec![]), EventHint::default());
    gate.process_event(MonitoringEvent::transaction("/second"), EventHint::default());

    source.mark_ready();
    sleep_ms(150).await;

    assert_eq!(client.calls().len(), 2);
    let stats = gate.stats();
    assert_eq!(stats.replayed, 1);
    assert_eq!(stats.replay_failures, 1);
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_configurator_receives_reconciled_options() {
    let source = Arc::new(FakeConsentSource::new().ready());
    let client = Arc::new(RecordingClient::new());
    let configurator = Arc::new(RecordingConfigurator::default());
    let gate = ConsentIntegration::builder(config(10_000), source.clone(), client.clone())
        .configurator(configurator.clone(), SdkOptions::default())
        .build();

    gate.setup_once();

    let pushed = configurator.pushed();
    assert_eq!(pushed.len(), 1);
    let options = &pushed[0];
    assert_eq!(options.traces_sample_rate, 0.0);
    assert!(!options.has_integration("BrowserTracing"));
    assert!(!options.has_integration("Replay"));
    assert!(options.has_integration("GlobalHandlers"));
    assert!(options.auto_session_tracking);
    assert_eq!(gate.sdk_options().as_ref(), Some(options));

    // Granting analytics later brings tracing back.
    source.grant("analytics", true);
    sleep_ms(1_100).await;

    let latest = gate.sdk_options().unwrap();
    assert_eq!(latest.traces_sample_rate, 1.0);
    assert!(latest.has_integration("BrowserTracing"));
    assert_eq!(configurator.pushed().len(), 2);
    gate.cleanup();
}

#[tokio::test(start_paused = true)]
async fn test_timeout_pushes_fully_restricted_options() {
    let source = Arc::new(FakeConsentSource::absent());
    let client = Arc::new(RecordingClient::new());
    let configurator = Arc::new(RecordingConfigurator::default());
    let gate = ConsentIntegration::builder(config(500), source, client)
        .configurator(configurator.clone(), SdkOptions::default())
        .build();

    gate.setup_once();
    assert!(configurator.pushed().is_empty(), "No decision yet");

    sleep_ms(600).await;

    let pushed = configurator.pushed();
    assert_eq!(pushed.len(), 1);
    assert!(!pushed[0].auto_session_tracking);
    assert!(pushed[0].integrations.is_empty());
    gate.cleanup();
}

#[test]
fn test_setup_without_runtime_still_checks_once() {
    let source = Arc::new(FakeConsentSource::new().ready());
    let client = Arc::new(RecordingClient::new());
    let gate = integration(10_000, &source, &client);

    gate.setup_once();

    assert_eq!(gate.status().readiness, Readiness::ReadyGranted);
    let event = MonitoringEvent::message("sync", Level::Info);
    assert_eq!(gate.process_event(event.clone(), EventHint::default()), Some(event));
    gate.cleanup();
}
