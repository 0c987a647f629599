//! The `Sim` struct and its event loop.

use diner_core::{SimRng, SimTime};
use diner_des::{Resumption, Scheduler};
use tracing::{info, trace};

use crate::flow::{Flow, FlowCtx, Wake};
use crate::{Restaurant, RestaurantConfig, SimError, SimObserver, SimResult, SimStats};

/// The simulation runner.
///
/// `Sim` owns every piece of run state (clock, restaurant, RNG, flows), so
/// independent replications can live on separate threads.  Each loop
/// iteration pops the earliest resumption and runs exactly one flow to its
/// next suspension point:
///
/// ```text
/// while let Some(r) = scheduler.pop_until(limit):
///     clock = r.at
///     flows[r.flow].resume(r.wake)   // may schedule, queue, fire the gate
/// ```
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub(crate) config:     RestaurantConfig,
    pub(crate) horizon:    SimTime,
    pub(crate) seed:       u64,
    pub(crate) scheduler:  Scheduler<Wake>,
    pub(crate) restaurant: Restaurant,
    pub(crate) rng:        SimRng,
    /// Indexed by `FlowId`; `None` once a flow has finished.
    pub(crate) flows:      Vec<Option<Flow>>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the arrival horizon.
    ///
    /// Customers still inside the restaurant at the horizon stay where they
    /// are; call [`run_to_completion`][Self::run_to_completion] to let them
    /// finish.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.run_until(self.horizon, observer)
    }

    /// Process every resumption at or before `limit`, then leave the clock at
    /// `limit`.
    pub fn run_until<O: SimObserver>(&mut self, limit: SimTime, observer: &mut O) -> SimResult<()> {
        info!(seed = self.seed, from = %self.now(), until = %limit, "running simulation");
        while let Some(r) = self.scheduler.pop_until(limit) {
            self.dispatch(r, observer)?;
        }
        self.scheduler.advance_to(limit);
        self.finish_run(observer);
        Ok(())
    }

    /// Process every pending resumption, however late.  No customer is
    /// generated at or past the horizon, so this always terminates.
    pub fn run_to_completion<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(seed = self.seed, from = %self.now(), "draining simulation");
        while let Some(r) = self.scheduler.pop_next() {
            self.dispatch(r, observer)?;
        }
        self.finish_run(observer);
        Ok(())
    }

    /// Statistics so far, with `pending_at_ticket` and pool peaks filled in.
    pub fn stats(&self) -> SimStats {
        let mut stats = self.restaurant.stats_with_peaks();
        stats.pending_at_ticket = self
            .flows
            .iter()
            .flatten()
            .filter(|f| f.is_at_ticket())
            .count() as u64;
        stats
    }

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &RestaurantConfig {
        &self.config
    }

    /// Read-only view of pools, gate, and occupancy.
    pub fn restaurant(&self) -> &Restaurant {
        &self.restaurant
    }

    /// Flows that have not finished yet (the arrival generator included).
    pub fn live_flows(&self) -> usize {
        self.flows.iter().flatten().count()
    }

    /// Flow slots allocated so far.  Finished customers hand their slot to
    /// later arrivals, so this follows peak concurrency, not arrivals.
    pub fn flow_slots(&self) -> usize {
        self.flows.len()
    }

    // ── Event loop ────────────────────────────────────────────────────────

    fn dispatch<O: SimObserver>(&mut self, r: Resumption<Wake>, observer: &mut O) -> SimResult<()> {
        trace!(flow = %r.flow, at = %r.at, wake = ?r.wake, "resuming flow");
        let slot = r.flow.index();
        let mut flow = self
            .flows
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or_else(|| SimError::Invariant(format!("{} resumed after finishing", r.flow)))?;

        let mut ctx = FlowCtx {
            scheduler:  &mut self.scheduler,
            restaurant: &mut self.restaurant,
            rng:        &mut self.rng,
            config:     &self.config,
            flows:      &mut self.flows,
            observer,
        };
        let finished = flow.resume(r.flow, r.wake, &mut ctx)?;
        if finished {
            self.scheduler.retire_flow(r.flow)?;
        } else {
            self.flows[slot] = Some(flow);
        }
        Ok(())
    }

    fn finish_run<O: SimObserver>(&self, observer: &mut O) {
        let stats = self.stats();
        info!(
            at = %self.now(),
            generated = stats.generated,
            admitted = stats.admitted,
            rejected = stats.rejected(),
            departures = stats.departures,
            "simulation paused"
        );
        observer.on_run_end(&stats);
    }
}
