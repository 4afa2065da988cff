use std::collections::BTreeMap;

use tracing::warn;

use super::purpose::{Purpose, PurposeMapping};
use super::snapshot::ConsentSnapshot;

/// Result of asking the consent runtime once whether it can answer yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePoll {
    /// No consent runtime on the page at all.
    Absent,
    /// Runtime present but still loading its configuration.
    NotReady,
    Ready(ConsentSnapshot),
}

impl SourcePoll {
    pub fn is_ready(&self) -> bool {
        matches!(self, SourcePoll::Ready(_))
    }
}

/// The narrow contract the gate needs from an external consent runtime.
///
/// The runtime has no push notifications, so the monitor polls through
/// `poll_once` / `read_snapshot`. Implementations must be cheap to call.
pub trait ConsentSource: Send + Sync {
    /// `false` when the runtime is not installed. Absence is treated exactly like "not ready".
    fn is_present(&self) -> bool {
        true
    }

    /// True once the runtime has loaded its purpose configuration.
    fn api_ready(&self) -> bool;

    /// Current consent for one purpose id, `None` if the id is unknown to the runtime.
    fn get(&self, purpose_id: &str) -> Option<bool>;

    /// Partial update keyed by purpose id.
    fn set(&self, preferences: &BTreeMap<String, bool>);

    /// Reads all four categories. An absent runtime yields an empty snapshot.
    fn read_snapshot(&self, mapping: &PurposeMapping) -> ConsentSnapshot {
        if !self.is_present() {
            return ConsentSnapshot::default();
        }
        ConsentSnapshot {
            functional: self.get(&mapping.functional),
            analytics: self.get(&mapping.analytics),
            marketing: self.get(&mapping.marketing),
            preferences: self.get(&mapping.preferences),
        }
    }

    fn poll_once(&self, mapping: &PurposeMapping) -> SourcePoll {
        if !self.is_present() {
            return SourcePoll::Absent;
        }
        if !self.api_ready() {
            return SourcePoll::NotReady;
        }
        SourcePoll::Ready(self.read_snapshot(mapping))
    }
}

/// Writes category-level choices through to the runtime, translating each
/// category into its purpose id. Returns `false` (and writes nothing) when the runtime is absent.
pub fn set_consent(
    source: &dyn ConsentSource,
    choices: &[(Purpose, bool)],
    mapping: &PurposeMapping,
) -> bool {
    if !source.is_present() {
        warn!("Consent runtime absent, dropping consent update");
        return false;
    }

    let preferences: BTreeMap<String, bool> = choices
        .iter()
        .map(|(purpose, granted)| (mapping.id_for(*purpose).to_string(), *granted))
        .collect();

    source.set(&preferences);
    true
}
