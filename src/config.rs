use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consent::PurposeMapping;
use crate::error::{ConsentError, Result};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const AVAILABILITY_POLL_MS: u64 = 100;
pub const CHANGE_POLL_MS: u64 = 1_000;

/// How the wait between two polls evolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    #[default]
    Fixed,
    /// Interval grows by `factor` after every unsuccessful poll, capped at `max_interval_ms`.
    Exponential { factor: f64, max_interval_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollSchedule {
    pub interval_ms: u64,
    #[serde(default)]
    pub backoff: Backoff,
}

impl PollSchedule {
    pub fn fixed(interval_ms: u64) -> Self {
        Self { interval_ms, backoff: Backoff::Fixed }
    }

    pub fn exponential(interval_ms: u64, factor: f64, max_interval_ms: u64) -> Self {
        Self {
            interval_ms,
            backoff: Backoff::Exponential { factor, max_interval_ms },
        }
    }

    fn availability_default() -> Self {
        Self::fixed(AVAILABILITY_POLL_MS)
    }

    fn change_default() -> Self {
        Self::fixed(CHANGE_POLL_MS)
    }

    /// Wait before poll number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => Duration::from_millis(self.interval_ms),
            Backoff::Exponential { factor, max_interval_ms } => {
                let grown = self.interval_ms as f64 * factor.powi(attempt.min(64) as i32);
                let capped = grown.min(max_interval_ms as f64).max(self.interval_ms as f64);
                Duration::from_millis(capped as u64)
            }
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(ConsentError::InvalidConfig(format!("{} interval must be non-zero", name)));
        }
        if let Backoff::Exponential { factor, max_interval_ms } = self.backoff {
            if !(factor >= 1.0) {
                return Err(ConsentError::InvalidConfig(format!(
                    "{} backoff factor must be >= 1.0, got {}",
                    name, factor
                )));
            }
            if max_interval_ms < self.interval_ms {
                return Err(ConsentError::InvalidConfig(format!(
                    "{} max interval {}ms is below the base interval {}ms",
                    name, max_interval_ms, self.interval_ms
                )));
            }
        }
        Ok(())
    }
}

/// Construction-time options for the consent integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// How long events may sit in the queue before the gate decides "no consent".
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Enables the verbose diagnostic channel.
    #[serde(default)]
    pub debug: bool,

    /// Required. No sensible default exists.
    pub purpose_mapping: PurposeMapping,

    #[serde(default = "PollSchedule::availability_default")]
    pub availability_poll: PollSchedule,

    #[serde(default = "PollSchedule::change_default")]
    pub change_poll: PollSchedule,

    /// Keep polling for the runtime after the timeout forced a denial, so a late
    /// runtime can still grant consent. When false the timeout decision is terminal.
    #[serde(default = "default_resume_after_timeout")]
    pub resume_after_timeout: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_resume_after_timeout() -> bool {
    true
}

impl GateConfig {
    pub fn new(purpose_mapping: PurposeMapping) -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            debug: false,
            purpose_mapping,
            availability_poll: PollSchedule::availability_default(),
            change_poll: PollSchedule::change_default(),
            resume_after_timeout: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_availability_poll(mut self, schedule: PollSchedule) -> Self {
        self.availability_poll = schedule;
        self
    }

    pub fn with_change_poll(mut self, schedule: PollSchedule) -> Self {
        self.change_poll = schedule;
        self
    }

    pub fn with_resume_after_timeout(mut self, resume: bool) -> Self {
        self.resume_after_timeout = resume;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: GateConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.purpose_mapping.validate()?;
        self.availability_poll.validate("availability poll")?;
        self.change_poll.validate("change poll")?;
        Ok(())
    }
}
