//! Run statistics: per-station counters, rejections, and ratings.

use std::collections::BTreeMap;

use crate::{Rejection, Stage};

/// Counters for one pool-backed stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationStats {
    /// Service grants.
    pub uses:               u64,
    /// Sum of drawn service durations (minutes) for completed services.
    pub total_service_time: f64,
    /// Stage waits that exceeded the tolerance.
    pub wait_violations:    u64,
    /// Highest simultaneous in-use count observed.
    pub peak_in_use:        usize,
    /// Configured server count.
    pub capacity:           usize,
}

impl StationStats {
    /// Mean service duration per grant, or `None` if nobody was served.
    pub fn mean_service_time(&self) -> Option<f64> {
        (self.uses > 0).then(|| self.total_service_time / self.uses as f64)
    }
}

/// Aggregated outcome of a run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimStats {
    /// Customers created by the arrival generator.
    pub generated:                u64,
    /// Customers whose ticket service completed.
    pub admitted:                 u64,
    pub rejected_queue_full:      u64,
    pub rejected_restaurant_full: u64,
    /// Customers still at the ticket stage when the run stopped.
    pub pending_at_ticket:        u64,
    pub departures:               u64,
    /// Sum of final ratings; individual ratings may be negative.
    pub rating_sum:               f64,
    /// Sum of final ratings floored at zero.
    pub clamped_rating_sum:       f64,
    pub peak_occupancy:           usize,
    pub stations:                 BTreeMap<Stage, StationStats>,
}

impl SimStats {
    pub(crate) fn record_rejection(&mut self, reason: Rejection) {
        match reason {
            Rejection::QueueFull => self.rejected_queue_full += 1,
            Rejection::RestaurantFull => self.rejected_restaurant_full += 1,
        }
    }

    pub(crate) fn station_mut(&mut self, stage: Stage) -> &mut StationStats {
        self.stations.entry(stage).or_default()
    }

    pub fn station(&self, stage: Stage) -> Option<&StationStats> {
        self.stations.get(&stage)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_queue_full + self.rejected_restaurant_full
    }

    /// Mean final rating over departed customers.
    pub fn mean_rating(&self) -> Option<f64> {
        (self.departures > 0).then(|| self.rating_sum / self.departures as f64)
    }

    pub fn mean_clamped_rating(&self) -> Option<f64> {
        (self.departures > 0).then(|| self.clamped_rating_sum / self.departures as f64)
    }

    /// Fraction of generated customers turned away.
    pub fn rejection_rate(&self) -> Option<f64> {
        (self.generated > 0).then(|| self.rejected() as f64 / self.generated as f64)
    }

    /// Total wait violations across every stage.
    pub fn wait_violations(&self) -> u64 {
        self.stations.values().map(|s| s.wait_violations).sum()
    }

    /// `admitted + rejected + pending_at_ticket == generated`.
    pub fn is_balanced(&self) -> bool {
        self.admitted + self.rejected() + self.pending_at_ticket == self.generated
    }
}
