use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use consent_gate::consent::set_consent;
use consent_gate::policy::{SdkConfigurator, SdkOptions};
use consent_gate::protocol::Frame;
use consent_gate::replay::ReconstructedError;
use consent_gate::{
    CaptureClient, CaptureError, ConsentIntegration, EventHint, FakeConsentSource, GateConfig, Level,
    MonitoringEvent, Purpose, PurposeMapping,
};

/// Stands in for the SDK transport: every capture is logged and acknowledged.
struct TracingCaptureClient;

impl CaptureClient for TracingCaptureClient {
    fn capture_exception(&self, error: &ReconstructedError) -> Result<Uuid, CaptureError> {
        info!(error = %error, stack = ?error.stack, "[CAPTURE] exception");
        Ok(Uuid::new_v4())
    }

    fn capture_message(&self, message: &str, level: Level) -> Result<Uuid, CaptureError> {
        info!(text = message, ?level, "[CAPTURE] message");
        Ok(Uuid::new_v4())
    }

    fn capture_event(&self, event: MonitoringEvent, _hint: &EventHint) -> Result<Uuid, CaptureError> {
        info!(event_id = %event.event_id, event_type = ?event.event_type, "[CAPTURE] event");
        Ok(event.event_id)
    }
}

struct TracingConfigurator;

impl SdkConfigurator for TracingConfigurator {
    fn reconfigure(&self, options: &SdkOptions) {
        info!(
            traces = options.traces_sample_rate,
            replays = options.replays_session_sample_rate,
            pii = options.send_default_pii,
            integrations = ?options.integrations,
            "[SDK] options reconfigured"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = match std::env::args().nth(1) {
        Some(path) => GateConfig::from_path(&path).with_context(|| format!("loading config from {}", path))?,
        None => GateConfig::new(PurposeMapping::new("functional", "analytics", "marketing", "preferences"))
            .with_timeout(Duration::from_secs(3))
            .with_debug(true),
    };
    let mapping = config.purpose_mapping.clone();
    let change_interval = Duration::from_millis(config.change_poll.interval_ms);

    // Consent runtime that knows our purposes but hasn't loaded yet.
    let source = Arc::new(
        FakeConsentSource::new()
            .with_purposes(&[
                mapping.functional.as_str(),
                mapping.analytics.as_str(),
                mapping.marketing.as_str(),
                mapping.preferences.as_str(),
            ])
            .with_consent(&mapping.functional, true),
    );

    let integration = ConsentIntegration::builder(config, source.clone(), Arc::new(TracingCaptureClient))
        .configurator(Arc::new(TracingConfigurator), SdkOptions::default())
        .build();

    info!("{} booting...", integration.name());
    integration.setup_once();

    // 1. Undecided: everything is held back.
    let early = vec![
        MonitoringEvent::exception(
            "TypeError",
            "undefined is not a function",
            vec![Frame { filename: Some("app.js".into()), lineno: Some(42) }],
        ),
        MonitoringEvent::message("checkout started", Level::Info),
        MonitoringEvent::transaction("/checkout"),
    ];
    for event in early {
        let passed = integration.process_event(event, EventHint::default());
        info!(passed = passed.is_some(), status = ?integration.status(), "Offered event while undecided");
    }

    // 2. Runtime loads with functional consent: the queue is replayed.
    tokio::time::sleep(Duration::from_millis(250)).await;
    source.mark_ready();
    tokio::time::sleep(Duration::from_millis(200)).await;
    info!(status = ?integration.status(), "After consent runtime became ready");

    let live = integration.process_event(MonitoringEvent::message("payment ok", Level::Info), EventHint::default());
    info!(passed = live.is_some(), "Offered event with consent");

    // 3. The user withdraws functional consent; the next change poll picks it up.
    set_consent(&*source, &[(Purpose::Functional, false)], &mapping);
    tokio::time::sleep(change_interval + Duration::from_millis(100)).await;

    let late = integration.process_event(MonitoringEvent::message("payment retry", Level::Warning), EventHint::default());
    info!(passed = late.is_some(), "Offered event after withdrawal");

    info!(stats = ?integration.stats(), "Session summary");
    integration.cleanup();
    info!(status = ?integration.status(), "Shut down");

    Ok(())
}
