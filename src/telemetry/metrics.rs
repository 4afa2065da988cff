use std::collections::VecDeque;

use super::event::GateRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateStats {
    pub allowed: u64,
    pub blocked: u64,
    pub queued: u64,
    pub max_queue_depth: usize,
    pub grants: u64,
    pub denials: u64,
    pub changes: u64,
    pub timeouts: u64,
    pub replayed: u64,
    pub replay_failures: u64,
    /// Queued events thrown away by denial, timeout or a voided replay.
    pub discarded: u64,
}

pub fn compute_stats(records: &VecDeque<GateRecord>) -> GateStats {
    let mut stats = GateStats::default();

    for record in records {
        match record {
            GateRecord::EventAllowed { .. } => stats.allowed += 1,
            GateRecord::EventBlocked { .. } => stats.blocked += 1,
            GateRecord::EventQueued { queue_size, .. } => {
                stats.queued += 1;
                stats.max_queue_depth = stats.max_queue_depth.max(*queue_size);
            }
            GateRecord::ConsentGranted { .. } => stats.grants += 1,
            GateRecord::ConsentDenied { discarded_events } => {
                stats.denials += 1;
                stats.discarded += *discarded_events as u64;
            }
            GateRecord::ConsentChanged { .. } => stats.changes += 1,
            GateRecord::ConsentTimeout { discarded_events } => {
                stats.timeouts += 1;
                stats.discarded += *discarded_events as u64;
            }
            GateRecord::ReplayFinished { attempted, failed, discarded } => {
                stats.replayed += (*attempted - *failed) as u64;
                stats.replay_failures += *failed as u64;
                stats.discarded += *discarded as u64;
            }
        }
    }

    stats
}
