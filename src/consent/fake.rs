use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::purpose::Purpose;
use super::source::ConsentSource;

/// In-memory consent runtime. Availability and answers are scripted by the
/// caller, which makes it the stand-in for the page runtime in tests and the demo binary.
#[derive(Debug)]
pub struct FakeConsentSource {
    inner: RwLock<FakeState>,
}

#[derive(Debug)]
struct FakeState {
    present: bool,
    ready: bool,
    purposes: Vec<String>,
    consent: BTreeMap<String, bool>,
}

impl FakeConsentSource {
    /// Installed but not ready, with the default purposes
    /// (`functional` granted, everything else denied).
    pub fn new() -> Self {
        let purposes: Vec<String> = Purpose::ALL.iter().map(|p| p.as_str().to_string()).collect();
        let consent = Purpose::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), *p == Purpose::Functional))
            .collect();

        Self {
            inner: RwLock::new(FakeState {
                present: true,
                ready: false,
                purposes,
                consent,
            }),
        }
    }

    /// Not installed at all.
    pub fn absent() -> Self {
        let source = Self::new();
        source.set_present(false);
        source
    }

    pub fn ready(self) -> Self {
        self.mark_ready();
        self
    }

    pub fn with_purposes(self, ids: &[&str]) -> Self {
        {
            let mut state = self.inner.write();
            state.purposes = ids.iter().map(|id| id.to_string()).collect();
            state.consent.retain(|id, _| ids.contains(&id.as_str()));
        }
        self
    }

    pub fn with_consent(self, purpose_id: &str, granted: bool) -> Self {
        self.grant(purpose_id, granted);
        self
    }

    pub fn mark_ready(&self) {
        let mut state = self.inner.write();
        state.present = true;
        state.ready = true;
        debug!("Fake consent API is ready");
    }

    pub fn set_present(&self, present: bool) {
        let mut state = self.inner.write();
        state.present = present;
        if !present {
            state.ready = false;
        }
    }

    /// Sets one purpose directly, bypassing the unknown-id check.
    pub fn grant(&self, purpose_id: &str, granted: bool) {
        let mut state = self.inner.write();
        if !state.purposes.iter().any(|p| p == purpose_id) {
            state.purposes.push(purpose_id.to_string());
        }
        state.consent.insert(purpose_id.to_string(), granted);
    }

    pub fn set_all(&self, granted: bool) {
        let mut state = self.inner.write();
        let ids = state.purposes.clone();
        for id in ids {
            state.consent.insert(id, granted);
        }
    }

    pub fn get_all(&self) -> BTreeMap<String, bool> {
        let state = self.inner.read();
        state
            .purposes
            .iter()
            .map(|id| (id.clone(), state.consent.get(id).copied().unwrap_or(false)))
            .collect()
    }
}

impl Default for FakeConsentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentSource for FakeConsentSource {
    fn is_present(&self) -> bool {
        self.inner.read().present
    }

    fn api_ready(&self) -> bool {
        let state = self.inner.read();
        state.present && state.ready
    }

    fn get(&self, purpose_id: &str) -> Option<bool> {
        let state = self.inner.read();
        if !state.purposes.iter().any(|p| p == purpose_id) {
            debug!(purpose_id, available = ?state.purposes, "Purpose does not exist");
            return None;
        }
        Some(state.consent.get(purpose_id).copied().unwrap_or(false))
    }

    fn set(&self, preferences: &BTreeMap<String, bool>) {
        let mut state = self.inner.write();
        for (id, granted) in preferences {
            if state.purposes.iter().any(|p| p == id) {
                state.consent.insert(id.clone(), *granted);
            } else {
                warn!(purpose_id = %id, "Ignoring consent for unknown purpose");
            }
        }
    }
}
