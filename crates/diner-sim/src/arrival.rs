//! Arrival generation: the per-hour rate table, scripted arrivals, and the
//! generator state that feeds new customers into the restaurant.

use std::collections::VecDeque;

use diner_core::{CustomerId, DISH_COUNT, DishSet, SimRng, SimTime};

use crate::{Customer, SimError, SimResult};

// ── ArrivalSchedule ───────────────────────────────────────────────────────────

/// Piecewise-constant arrival rate keyed by elapsed simulated hour.
///
/// Entry `h` is the mean number of arrivals per minute during
/// `[60h, 60(h+1))`.  A zero entry closes the door for that hour.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrivalSchedule {
    rates_per_minute: Vec<f64>,
}

impl ArrivalSchedule {
    pub fn new(rates_per_minute: Vec<f64>) -> Self {
        Self { rates_per_minute }
    }

    /// The same rate for `hours` consecutive hours.
    pub fn constant(rate_per_minute: f64, hours: usize) -> Self {
        Self::new(vec![rate_per_minute; hours])
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates_per_minute
    }

    /// Rate in force at `t`, or `None` past the end of the table.
    pub fn rate_at(&self, t: SimTime) -> Option<f64> {
        self.rates_per_minute.get(t.hour_index()).copied()
    }

    /// First instant not covered by the table.
    pub fn covered_until(&self) -> SimTime {
        SimTime::from_hours(self.rates_per_minute.len() as u32)
    }

    /// The table must cover `[0, horizon)` with finite, non-negative rates.
    pub fn validate(&self, horizon: SimTime) -> SimResult<()> {
        if let Some((hour, rate)) = self
            .rates_per_minute
            .iter()
            .enumerate()
            .find(|&(_, r)| !(r.is_finite() && *r >= 0.0))
        {
            return Err(SimError::Config(format!(
                "arrival rate for hour {hour} must be finite and non-negative, got {rate}"
            )));
        }
        if self.covered_until() < horizon {
            return Err(SimError::Config(format!(
                "arrival-rate table covers {} hours, which ends before the horizon {horizon}",
                self.rates_per_minute.len()
            )));
        }
        Ok(())
    }
}

// ── Scripted arrivals ─────────────────────────────────────────────────────────

/// A customer with a fixed arrival time and fixed dish preferences, used in
/// place of the stochastic arrival stream.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptedCustomer {
    pub at:     SimTime,
    pub dishes: DishSet,
}

impl ScriptedCustomer {
    pub fn new(at: SimTime, dishes: DishSet) -> Self {
        Self { at, dishes }
    }
}

pub(crate) enum ArrivalSource {
    Stochastic,
    /// Sorted by arrival time.
    Scripted(VecDeque<ScriptedCustomer>),
}

// ── ArrivalGenerator ──────────────────────────────────────────────────────────

/// State of the single arrival flow.
///
/// The flow itself (slot acquisition, scheduling) is driven from
/// [`crate::flow`]; this type only decides *when* the next customer comes and
/// *who* it is.
pub(crate) struct ArrivalGenerator {
    source:  ArrivalSource,
    next_id: CustomerId,
    horizon: SimTime,
}

impl ArrivalGenerator {
    pub(crate) fn new(source: ArrivalSource, horizon: SimTime) -> Self {
        Self { source, next_id: CustomerId(0), horizon }
    }

    /// Customers created so far.
    pub(crate) fn generated(&self) -> u32 {
        self.next_id.0
    }

    /// Time of the very first arrival, if any falls before the horizon.
    pub(crate) fn first_arrival(&self) -> Option<SimTime> {
        let at = match &self.source {
            ArrivalSource::Stochastic => SimTime::ZERO,
            ArrivalSource::Scripted(script) => script.front()?.at,
        };
        (at < self.horizon).then_some(at)
    }

    /// Time of the arrival after one happening at `now`, or `None` once the
    /// horizon is reached.
    pub(crate) fn next_arrival(
        &self,
        now:      SimTime,
        schedule: &ArrivalSchedule,
        rng:      &mut SimRng,
    ) -> SimResult<Option<SimTime>> {
        let next = match &self.source {
            ArrivalSource::Scripted(script) => script.front().map(|c| c.at),
            ArrivalSource::Stochastic => {
                let mut t = now;
                loop {
                    let Some(rate) = schedule.rate_at(t) else {
                        break None;
                    };
                    if rate > 0.0 {
                        break Some(t + rng.exp(rate)?);
                    }
                    // Closed hour: skip to the next one.
                    t = t.next_hour_boundary();
                    if t >= self.horizon {
                        break None;
                    }
                }
            }
        };
        Ok(next.filter(|&t| t < self.horizon))
    }

    /// Create the customer arriving at `now`.
    pub(crate) fn make_customer(
        &mut self,
        now:           SimTime,
        probabilities: &[f64; DISH_COUNT],
        rng:           &mut SimRng,
    ) -> Customer {
        let dishes = match &mut self.source {
            ArrivalSource::Stochastic => rng.dish_preferences(probabilities),
            ArrivalSource::Scripted(script) => {
                script.pop_front().map(|c| c.dishes).unwrap_or_default()
            }
        };
        let id = self.next_id;
        self.next_id = id.next();
        Customer::new(id, now, dishes)
    }
}
