//! Restaurant configuration and startup validation.
//!
//! All rates are "events per simulated minute"; a station with
//! `service_rate = 0.5` takes two minutes per customer on average.

use diner_core::{DISH_COUNT, Dish, SimTime};

use crate::{ArrivalSchedule, SimError, SimResult};

/// Server count and mean service rate of one station.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConfig {
    pub servers:      usize,
    pub service_rate: f64,
}

impl StationConfig {
    pub const fn new(servers: usize, service_rate: f64) -> Self {
        Self { servers, service_rate }
    }
}

/// What happens to the ticket-queue admission counter when the capacity gate
/// rejects a customer who was still waiting for a ticket server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdmissionResetPolicy {
    /// Clear the counter.  Under-counts the queue when several waiters are
    /// rejected at different instants; kept as the reference behavior.
    #[default]
    ResetToZero,
    /// Remove only the rejected customer from the count.
    Decrement,
}

/// Every tunable of a restaurant run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestaurantConfig {
    pub ticket:      StationConfig,
    pub drinks:      StationConfig,
    pub appetizer:   StationConfig,
    pub main_course: StationConfig,
    pub dessert:     StationConfig,

    /// Tables.  Also the occupancy bound enforced by the capacity gate.
    pub seating_capacity: usize,
    /// Mean dining rate at a table.
    pub seating_rate:     f64,

    /// Maximum number of customers queued for a ticket server.
    pub max_ticket_queue: usize,

    /// Per-hour arrival rates.
    pub arrivals: ArrivalSchedule,

    /// Stage wait (minutes) above which a customer's rating is penalised.
    pub wait_tolerance: f64,

    /// Probability that a new customer wants each dish, in `Dish::ALL` order.
    pub dish_probabilities: [f64; DISH_COUNT],

    pub admission_reset: AdmissionResetPolicy,
}

impl Default for RestaurantConfig {
    /// A five-hour lunch service with a peak in the third hour.
    fn default() -> Self {
        Self {
            ticket:             StationConfig::new(2, 0.5),
            drinks:             StationConfig::new(2, 1.0),
            appetizer:          StationConfig::new(2, 0.4),
            main_course:        StationConfig::new(3, 0.2),
            dessert:            StationConfig::new(1, 0.5),
            seating_capacity:   30,
            seating_rate:       1.0 / 30.0,
            max_ticket_queue:   10,
            arrivals:           ArrivalSchedule::new(vec![0.5, 1.0, 1.5, 1.0, 0.5]),
            wait_tolerance:     10.0,
            dish_probabilities: [0.9, 0.4, 0.8, 0.3],
            admission_reset:    AdmissionResetPolicy::ResetToZero,
        }
    }
}

impl RestaurantConfig {
    /// The food station serving `dish`.
    pub fn station(&self, dish: Dish) -> &StationConfig {
        match dish {
            Dish::Drinks => &self.drinks,
            Dish::Appetizer => &self.appetizer,
            Dish::MainCourse => &self.main_course,
            Dish::Dessert => &self.dessert,
        }
    }

    /// Check every field against a run of length `horizon`.
    ///
    /// Called by [`SimBuilder::build`][crate::SimBuilder::build] before any
    /// simulated event runs.
    pub fn validate(&self, horizon: SimTime) -> SimResult<()> {
        if horizon <= SimTime::ZERO {
            return Err(SimError::Config("run horizon must be positive".into()));
        }

        check_station("ticket", &self.ticket)?;
        for dish in Dish::ALL {
            check_station(dish.as_str(), self.station(dish))?;
        }

        if self.seating_capacity == 0 {
            return Err(SimError::Config("seating capacity must be positive".into()));
        }
        check_rate("seating rate", self.seating_rate)?;

        if !(self.wait_tolerance.is_finite() && self.wait_tolerance > 0.0) {
            return Err(SimError::Config(format!(
                "wait tolerance must be finite and positive, got {}",
                self.wait_tolerance
            )));
        }

        for (dish, &p) in Dish::ALL.iter().zip(&self.dish_probabilities) {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Config(format!(
                    "{dish} probability must lie in [0, 1], got {p}"
                )));
            }
        }

        self.arrivals.validate(horizon)
    }
}

fn check_station(name: &str, station: &StationConfig) -> SimResult<()> {
    if station.servers == 0 {
        return Err(SimError::Config(format!("{name} server count must be positive")));
    }
    check_rate(&format!("{name} service rate"), station.service_rate)
}

fn check_rate(what: &str, rate: f64) -> SimResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SimError::Config(format!("{what} must be finite and positive, got {rate}")))
    }
}
