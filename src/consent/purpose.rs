use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConsentError;

/// Consent categories the gate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Error capture and session tracking. Gates every event.
    Functional,
    /// Performance tracing and profiling.
    Analytics,
    /// Session replay.
    Marketing,
    /// PII and personalised context.
    Preferences,
}

impl Purpose {
    pub const ALL: [Purpose; 4] = [
        Purpose::Functional,
        Purpose::Analytics,
        Purpose::Marketing,
        Purpose::Preferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Functional => "functional",
            Purpose::Analytics => "analytics",
            Purpose::Marketing => "marketing",
            Purpose::Preferences => "preferences",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = ConsentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "functional" => Ok(Purpose::Functional),
            "analytics" => Ok(Purpose::Analytics),
            "marketing" => Ok(Purpose::Marketing),
            "preferences" => Ok(Purpose::Preferences),
            other => Err(ConsentError::UnknownPurpose(other.to_string())),
        }
    }
}

/// Category -> purpose id understood by the consent runtime.
/// Fixed for the lifetime of one monitor. The ids must match the consent runtime's own configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurposeMapping {
    pub functional: String,
    pub analytics: String,
    pub marketing: String,
    pub preferences: String,
}

impl PurposeMapping {
    pub fn new(functional: &str, analytics: &str, marketing: &str, preferences: &str) -> Self {
        Self {
            functional: functional.to_string(),
            analytics: analytics.to_string(),
            marketing: marketing.to_string(),
            preferences: preferences.to_string(),
        }
    }

    /// One purpose id governs all four categories.
    pub fn single(purpose_id: &str) -> Self {
        Self::new(purpose_id, purpose_id, purpose_id, purpose_id)
    }

    pub fn id_for(&self, purpose: Purpose) -> &str {
        match purpose {
            Purpose::Functional => &self.functional,
            Purpose::Analytics => &self.analytics,
            Purpose::Marketing => &self.marketing,
            Purpose::Preferences => &self.preferences,
        }
    }

    pub fn validate(&self) -> Result<(), ConsentError> {
        for purpose in Purpose::ALL {
            if self.id_for(purpose).trim().is_empty() {
                return Err(ConsentError::InvalidConfig(format!(
                    "purpose id for '{}' must not be empty",
                    purpose
                )));
            }
        }
        Ok(())
    }
}
