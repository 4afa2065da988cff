use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

use crate::consent::{ConsentSnapshot, Purpose};
use crate::policy::{reconcile, SdkOptions};
use crate::protocol::{Breadcrumb, Level, UserContext};

/// Consent context for one host session.
///
/// Holds the last consent payload and the options the developer configured,
/// so each request or event handler gets it passed in rather than reading
/// shared process state.
#[derive(Debug, Clone)]
pub struct ConsentSession {
    consent: ConsentSnapshot,
    original: SdkOptions,
    current: SdkOptions,
}

impl ConsentSession {
    /// The developer's options apply unchanged until the first consent update.
    pub fn new(original: SdkOptions) -> Self {
        Self {
            consent: ConsentSnapshot::default(),
            current: original.clone(),
            original,
        }
    }

    pub fn consent(&self) -> ConsentSnapshot {
        self.consent
    }

    pub fn original_options(&self) -> &SdkOptions {
        &self.original
    }

    pub fn options(&self) -> &SdkOptions {
        &self.current
    }

    /// Stores the new payload and returns the reconciled options.
    pub fn update_consent(&mut self, consent: ConsentSnapshot) -> &SdkOptions {
        self.consent = consent;
        self.current = reconcile(&self.original, &consent);
        info!(?consent, integrations = self.current.integrations.len(), "Monitoring options updated for consent");
        &self.current
    }

    /// Breadcrumb for a named host event. Requires functional consent.
    pub fn custom_event_breadcrumb(&self, name: &str, data: Value) -> Option<Breadcrumb> {
        if name.is_empty() || !self.consent.is_granted(Purpose::Functional) {
            return None;
        }
        Some(Breadcrumb {
            message: format!("Custom event: {}", name),
            category: "custom".to_string(),
            level: Level::Info,
            data,
        })
    }

    /// Tags attached on every page view.
    pub fn page_tags(&self, url: &str, title: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("page.url".to_string(), url.to_string());
        tags.insert("page.title".to_string(), title.to_string());
        tags
    }

    /// User context for a page view, when the host knows who the visitor is.
    pub fn page_user(&self, user_id: Option<&str>) -> Option<UserContext> {
        user_id.filter(|id| !id.is_empty()).map(|id| UserContext { id: id.to_string() })
    }
}
