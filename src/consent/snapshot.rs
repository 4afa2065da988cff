use serde::{Deserialize, Serialize};

use super::purpose::Purpose;

/// Last observed per-category consent. `None` means the runtime did not know the purpose.
/// Replaced wholesale on every poll, compared by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsentSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<bool>,
}

impl ConsentSnapshot {
    /// Every category explicitly set to `granted`.
    pub fn uniform(granted: bool) -> Self {
        Self {
            functional: Some(granted),
            analytics: Some(granted),
            marketing: Some(granted),
            preferences: Some(granted),
        }
    }

    pub fn with(mut self, purpose: Purpose, granted: bool) -> Self {
        *self.slot_mut(purpose) = Some(granted);
        self
    }

    pub fn get(&self, purpose: Purpose) -> Option<bool> {
        match purpose {
            Purpose::Functional => self.functional,
            Purpose::Analytics => self.analytics,
            Purpose::Marketing => self.marketing,
            Purpose::Preferences => self.preferences,
        }
    }

    /// Unknown counts as denied.
    pub fn is_granted(&self, purpose: Purpose) -> bool {
        self.get(purpose).unwrap_or(false)
    }

    /// The flag the admission gate keys on.
    pub fn functional_granted(&self) -> bool {
        self.is_granted(Purpose::Functional)
    }

    fn slot_mut(&mut self, purpose: Purpose) -> &mut Option<bool> {
        match purpose {
            Purpose::Functional => &mut self.functional,
            Purpose::Analytics => &mut self.analytics,
            Purpose::Marketing => &mut self.marketing,
            Purpose::Preferences => &mut self.preferences,
        }
    }
}

/// Whether a consent decision exists yet, and which way it went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readiness {
    #[default]
    NotReady,
    ReadyDenied,
    ReadyGranted,
}

impl Readiness {
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            Readiness::ReadyGranted
        } else {
            Readiness::ReadyDenied
        }
    }

    pub fn is_ready(&self) -> bool {
        !matches!(self, Readiness::NotReady)
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Readiness::ReadyGranted)
    }
}
