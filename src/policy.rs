//! Maps a consent snapshot onto the monitoring SDK's options: which features
//! stay on, which sample rates drop to zero, which integrations are removed.

use serde::{Deserialize, Serialize};

use crate::consent::{ConsentSnapshot, Purpose};

pub const FUNCTIONAL_INTEGRATIONS: &[&str] =
    &["GlobalHandlers", "TryCatch", "LinkedErrors", "Breadcrumbs", "HttpContext"];
pub const ANALYTICS_INTEGRATIONS: &[&str] = &["BrowserTracing", "BrowserProfilingIntegration"];
pub const MARKETING_INTEGRATIONS: &[&str] = &["Replay"];
pub const PREFERENCES_INTEGRATIONS: &[&str] = &["Dedupe"];

/// Consent-sensitive subset of the SDK's options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkOptions {
    pub auto_session_tracking: bool,
    pub capture_unhandled_rejections: bool,
    pub send_default_pii: bool,
    pub traces_sample_rate: f64,
    pub profiles_sample_rate: f64,
    pub replays_session_sample_rate: f64,
    pub replays_on_error_sample_rate: f64,
    pub integrations: Vec<String>,
}

impl Default for SdkOptions {
    fn default() -> Self {
        let integrations = FUNCTIONAL_INTEGRATIONS
            .iter()
            .chain(ANALYTICS_INTEGRATIONS)
            .chain(MARKETING_INTEGRATIONS)
            .chain(PREFERENCES_INTEGRATIONS)
            .map(|name| name.to_string())
            .collect();

        Self {
            auto_session_tracking: true,
            capture_unhandled_rejections: true,
            send_default_pii: false,
            traces_sample_rate: 1.0,
            profiles_sample_rate: 1.0,
            replays_session_sample_rate: 0.1,
            replays_on_error_sample_rate: 1.0,
            integrations,
        }
    }
}

impl SdkOptions {
    pub fn has_integration(&self, name: &str) -> bool {
        self.integrations.iter().any(|i| i == name)
    }
}

/// Receives the reconciled options whenever consent is decided or changes.
pub trait SdkConfigurator: Send + Sync {
    fn reconfigure(&self, options: &SdkOptions);
}

/// Effective options for `consent`.
///
/// Settings come back from `original` when a category is granted and are
/// zeroed, switched off or removed when it is not. Re-granting a category
/// restores its integrations.
pub fn reconcile(original: &SdkOptions, consent: &ConsentSnapshot) -> SdkOptions {
    let mut next = original.clone();

    for purpose in Purpose::ALL {
        if consent.is_granted(purpose) {
            continue;
        }

        match purpose {
            Purpose::Functional => {
                next.auto_session_tracking = false;
                next.capture_unhandled_rejections = false;
            }
            Purpose::Analytics => {
                next.traces_sample_rate = 0.0;
                next.profiles_sample_rate = 0.0;
            }
            Purpose::Marketing => {
                next.replays_session_sample_rate = 0.0;
                next.replays_on_error_sample_rate = 0.0;
            }
            Purpose::Preferences => next.send_default_pii = false,
        }

        let restricted = restricted_integrations(purpose);
        next.integrations.retain(|name| !restricted.contains(&name.as_str()));
    }

    next
}

pub fn restricted_integrations(purpose: Purpose) -> &'static [&'static str] {
    match purpose {
        Purpose::Functional => FUNCTIONAL_INTEGRATIONS,
        Purpose::Analytics => ANALYTICS_INTEGRATIONS,
        Purpose::Marketing => MARKETING_INTEGRATIONS,
        Purpose::Preferences => PREFERENCES_INTEGRATIONS,
    }
}
