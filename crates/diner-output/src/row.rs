//! Plain data row types written by output backends.

use diner_sim::{LifecycleEvent, Stage, StationStats};

/// One lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRow {
    pub customer_id: u32,
    /// Simulated minutes since the start of the run.
    pub at_minutes:  f64,
    pub stage:       &'static str,
    pub kind:        &'static str,
}

impl From<&LifecycleEvent> for EventRow {
    fn from(e: &LifecycleEvent) -> Self {
        Self {
            customer_id: e.customer.0,
            at_minutes:  e.at.minutes(),
            stage:       e.stage.as_str(),
            kind:        e.kind.as_str(),
        }
    }
}

/// Counters of one pool-backed stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationRow {
    pub stage:              &'static str,
    pub capacity:           usize,
    pub uses:               u64,
    pub total_service_time: f64,
    /// `None` when nobody was served.
    pub mean_service_time:  Option<f64>,
    pub wait_violations:    u64,
    pub peak_in_use:        usize,
}

impl StationRow {
    pub fn new(stage: Stage, stats: &StationStats) -> Self {
        Self {
            stage:              stage.as_str(),
            capacity:           stats.capacity,
            uses:               stats.uses,
            total_service_time: stats.total_service_time,
            mean_service_time:  stats.mean_service_time(),
            wait_violations:    stats.wait_violations,
            peak_in_use:        stats.peak_in_use,
        }
    }
}
