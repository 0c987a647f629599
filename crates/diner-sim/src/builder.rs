//! Fluent builder for constructing a [`Sim`].

use diner_core::{SimRng, SimTime};
use diner_des::Scheduler;
use tracing::debug;

use crate::arrival::{ArrivalGenerator, ArrivalSource};
use crate::flow::{Flow, GeneratorFlow, Wake};
use crate::{Restaurant, RestaurantConfig, ScriptedCustomer, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`RestaurantConfig`] — stations, seating, arrival table, tolerances
/// - horizon — simulated time after which no customer is generated
/// - seed — drives every random draw of the run
///
/// # Optional inputs
///
/// | Method                       | Default                              |
/// |------------------------------|--------------------------------------|
/// | `.with_customer_script(v)`   | Stochastic arrivals from the config  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(RestaurantConfig::default(), SimTime::from_hours(5), 42)
///     .build()?;
/// let mut log = EventLog::new();
/// sim.run(&mut log)?;
/// ```
pub struct SimBuilder {
    config:  RestaurantConfig,
    horizon: SimTime,
    seed:    u64,
    script:  Option<Vec<ScriptedCustomer>>,
}

impl SimBuilder {
    pub fn new(config: RestaurantConfig, horizon: SimTime, seed: u64) -> Self {
        Self { config, horizon, seed, script: None }
    }

    /// Replace the stochastic arrival stream with fixed customers.
    ///
    /// Entries are stably sorted by arrival time, so customers sharing a
    /// timestamp keep their relative order.  Entries at or past the horizon
    /// are never generated.  The config's arrival table is still validated.
    pub fn with_customer_script(mut self, mut script: Vec<ScriptedCustomer>) -> Self {
        script.sort_by(|a, b| a.at.cmp(&b.at));
        self.script = Some(script);
        self
    }

    /// Validate the configuration, create the restaurant, and schedule the
    /// arrival generator at time zero.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate(self.horizon)?;

        let source = match self.script {
            Some(script) => ArrivalSource::Scripted(script.into()),
            None => ArrivalSource::Stochastic,
        };

        let restaurant = Restaurant::new(&self.config)?;
        let mut scheduler = Scheduler::new();
        let generator = scheduler.register_flow();
        if generator.index() != 0 {
            return Err(SimError::Invariant(format!(
                "arrival generator registered as {generator}"
            )));
        }
        scheduler.schedule_now(generator, Wake::Start)?;

        let flows = vec![Some(Flow::Arrivals(GeneratorFlow::new(ArrivalGenerator::new(
            source,
            self.horizon,
        ))))];

        debug!(seed = self.seed, horizon = %self.horizon, "simulation built");
        Ok(Sim {
            config: self.config,
            horizon: self.horizon,
            seed: self.seed,
            scheduler,
            restaurant,
            rng: SimRng::new(self.seed),
            flows,
        })
    }
}
