//! `diner-sim` — the restaurant model driven by the `diner-des` kernel.
//!
//! # Customer pipeline
//!
//! ```text
//! arrival generator ─▶ ticket (bounded queue, races the capacity gate)
//!                        │ admitted: occupancy += 1
//!                        ▼
//!                  food stations, wanted subset in random order
//!                        │
//!                        ▼
//!                  seating (skipped if nothing was wanted) ─▶ departure
//! ```
//!
//! The capacity gate fires when occupancy reaches the seating capacity and
//! rejects everyone still queued or mid-service at the ticket stage.  The
//! next departure re-arms it under a new generation.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`config`]     | `RestaurantConfig`, `StationConfig`, validation        |
//! | [`arrival`]    | `ArrivalSchedule`, `ScriptedCustomer`                  |
//! | [`customer`]   | `Customer`, wait penalties                             |
//! | [`restaurant`] | `Restaurant` aggregate, `AdmissionCounter`             |
//! | `flow`         | customer and generator state machines (private)        |
//! | [`event`]      | `LifecycleEvent`, `Stage`, `EventKind`, `Rejection`    |
//! | [`stats`]      | `SimStats`, `StationStats`                             |
//! | [`observer`]   | `SimObserver`, `NoopObserver`, `EventLog`              |
//! | [`builder`]    | `SimBuilder`                                           |
//! | [`sim`]        | `Sim` event loop                                       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use diner_core::SimTime;
//! use diner_sim::{RestaurantConfig, run};
//!
//! let report = run(SimTime::from_hours(5), 42, RestaurantConfig::default())?;
//! println!("admitted {}", report.stats.admitted);
//! ```

pub mod arrival;
pub mod builder;
pub mod config;
pub mod customer;
pub mod error;
pub mod event;
mod flow;
pub mod observer;
pub mod restaurant;
pub mod sim;
pub mod stats;

#[cfg(test)]
mod tests;

use diner_core::SimTime;

pub use arrival::{ArrivalSchedule, ScriptedCustomer};
pub use builder::SimBuilder;
pub use config::{AdmissionResetPolicy, RestaurantConfig, StationConfig};
pub use customer::{Customer, WaitViolation, wait_penalty};
pub use error::{SimError, SimResult};
pub use event::{EventKind, LifecycleEvent, Rejection, Stage};
pub use observer::{EventLog, NoopObserver, SimObserver, Tee};
pub use restaurant::{AdmissionCounter, Restaurant};
pub use sim::Sim;
pub use stats::{SimStats, StationStats};

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub stats:      SimStats,
    pub events:     Vec<LifecycleEvent>,
    pub final_time: SimTime,
}

/// Build a simulation from `config`, run it to `horizon`, and return the
/// statistics together with every lifecycle event.
pub fn run(horizon: SimTime, seed: u64, config: RestaurantConfig) -> SimResult<RunReport> {
    let mut sim = SimBuilder::new(config, horizon, seed).build()?;
    let mut log = EventLog::new();
    sim.run(&mut log)?;
    Ok(RunReport {
        stats:      sim.stats(),
        events:     log.events,
        final_time: sim.now(),
    })
}
