pub mod monitor;
pub mod types;

pub use monitor::ConsentMonitor;
pub use types::{MonitorSignal, TimerSet};
