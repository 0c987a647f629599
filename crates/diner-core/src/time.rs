//! Simulation time model.
//!
//! # Design
//!
//! Time is a continuous count of simulated minutes since the run started,
//! wrapped in `SimTime`.  Service and inter-arrival durations are drawn from
//! exponential distributions, so an integer tick would quantise them; an
//! `f64` keeps the draws exact.
//!
//! `SimTime` is totally ordered through [`f64::total_cmp`], which lets it key
//! a `BinaryHeap` directly.  Constructors reject NaN, so the total order
//! agrees with the numeric order for every value that can exist.

use std::cmp::Ordering;
use std::fmt;

/// Minutes in one simulated hour.  The arrival-rate table is keyed by hour.
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// An absolute point on the simulated timeline, in minutes.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Wrap a minute count.  Returns `None` for NaN, infinite, or negative
    /// values.
    pub fn from_minutes(minutes: f64) -> Option<SimTime> {
        (minutes.is_finite() && minutes >= 0.0).then_some(SimTime(minutes))
    }

    /// The start of simulated hour `hours`.
    #[inline]
    pub fn from_hours(hours: u32) -> SimTime {
        SimTime(f64::from(hours) * MINUTES_PER_HOUR)
    }

    #[inline]
    pub fn minutes(self) -> f64 {
        self.0
    }

    /// Index of the simulated hour containing `self` (0 for `[0, 60)`).
    #[inline]
    pub fn hour_index(self) -> usize {
        (self.0 / MINUTES_PER_HOUR).floor() as usize
    }

    /// Start of the hour after the one containing `self`.
    pub fn next_hour_boundary(self) -> SimTime {
        SimTime(((self.0 / MINUTES_PER_HOUR).floor() + 1.0) * MINUTES_PER_HOUR)
    }

    /// Minutes elapsed from `earlier` to `self`; zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, minutes: f64) -> SimTime {
        SimTime(self.0 + minutes)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}m", self.0)
    }
}
