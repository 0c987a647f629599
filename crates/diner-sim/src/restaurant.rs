//! The `Restaurant` aggregate: every pool, the capacity gate, occupancy, the
//! ticket-queue admission counter, and the statistics accumulators.
//!
//! Flows borrow it mutably for one resumption at a time, so no mutation ever
//! spans a suspension point.

use diner_core::{DISH_COUNT, Dish};
use diner_des::{CapacityGate, GateFiring, ResourcePool};
use tracing::debug;

use crate::{AdmissionResetPolicy, RestaurantConfig, SimError, SimResult, SimStats, Stage};

/// Bounded count of customers waiting for a ticket server.
#[derive(Debug)]
pub struct AdmissionCounter {
    queued: usize,
    max:    usize,
    policy: AdmissionResetPolicy,
}

impl AdmissionCounter {
    pub fn new(max: usize, policy: AdmissionResetPolicy) -> Self {
        Self { queued: 0, max, policy }
    }

    pub fn queued(&self) -> usize {
        self.queued
    }

    /// Count one more waiter, or return `false` if the queue is saturated.
    pub fn try_admit(&mut self) -> bool {
        if self.queued >= self.max {
            return false;
        }
        self.queued += 1;
        true
    }

    /// A waiter reached a ticket server.
    pub fn on_granted(&mut self) {
        self.queued = self.queued.saturating_sub(1);
    }

    /// A waiter lost its race against the capacity gate.
    pub fn on_gate_rejection(&mut self) {
        match self.policy {
            AdmissionResetPolicy::ResetToZero => self.queued = 0,
            AdmissionResetPolicy::Decrement => self.on_granted(),
        }
    }
}

#[derive(Debug)]
pub struct Restaurant {
    pub ticket:    ResourcePool,
    /// Food stations in `Dish::ALL` order.
    pub stations:  [ResourcePool; DISH_COUNT],
    pub seating:   ResourcePool,
    /// Single slot serializing the arrival generator.
    pub generator: ResourcePool,
    pub gate:      CapacityGate,
    pub admission: AdmissionCounter,
    pub stats:     SimStats,
    occupancy:     usize,
    capacity:      usize,
}

impl Restaurant {
    pub fn new(config: &RestaurantConfig) -> SimResult<Self> {
        let mut stats = SimStats::default();
        stats.station_mut(Stage::Ticket).capacity = config.ticket.servers;
        for dish in Dish::ALL {
            stats.station_mut(Stage::food(dish)).capacity = config.station(dish).servers;
        }
        stats.station_mut(Stage::Seating).capacity = config.seating_capacity;

        Ok(Self {
            ticket: ResourcePool::new("ticket", config.ticket.servers)?,
            stations: [
                ResourcePool::new("drinks", config.drinks.servers)?,
                ResourcePool::new("appetizer", config.appetizer.servers)?,
                ResourcePool::new("main_course", config.main_course.servers)?,
                ResourcePool::new("dessert", config.dessert.servers)?,
            ],
            seating: ResourcePool::new("seating", config.seating_capacity)?,
            generator: ResourcePool::new("generator", 1)?,
            gate: CapacityGate::new(),
            admission: AdmissionCounter::new(config.max_ticket_queue, config.admission_reset),
            stats,
            occupancy: 0,
            capacity: config.seating_capacity,
        })
    }

    /// Pool backing `stage`, or `None` for `Stage::Exit`.
    pub fn pool(&self, stage: Stage) -> Option<&ResourcePool> {
        match stage {
            Stage::Ticket => Some(&self.ticket),
            Stage::Seating => Some(&self.seating),
            Stage::Exit => None,
            food => food.dish().map(|d| &self.stations[d.index()]),
        }
    }

    pub fn pool_mut(&mut self, stage: Stage) -> Option<&mut ResourcePool> {
        match stage {
            Stage::Ticket => Some(&mut self.ticket),
            Stage::Seating => Some(&mut self.seating),
            Stage::Exit => None,
            food => food.dish().map(|d| &mut self.stations[d.index()]),
        }
    }

    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count an admitted customer.  Returns the gate firing when occupancy
    /// reaches capacity; the caller wakes the subscribers.
    pub fn enter(&mut self) -> SimResult<Option<GateFiring>> {
        if self.occupancy >= self.capacity {
            return Err(SimError::Invariant(format!(
                "admission would raise occupancy above capacity {}",
                self.capacity
            )));
        }
        self.occupancy += 1;
        self.stats.peak_occupancy = self.stats.peak_occupancy.max(self.occupancy);
        if self.occupancy < self.capacity {
            return Ok(None);
        }
        let firing = self.gate.fire()?;
        debug!(
            generation = firing.generation,
            woken = firing.woken.len(),
            "restaurant full, capacity gate fired"
        );
        Ok(Some(firing))
    }

    /// Count a departure and re-arm the gate if it had fired.
    pub fn depart(&mut self) -> SimResult<()> {
        if self.occupancy == 0 {
            return Err(SimError::Invariant("departure with zero occupancy".into()));
        }
        self.occupancy -= 1;
        if let Some(generation) = self.gate.rearm() {
            debug!(generation, occupancy = self.occupancy, "capacity gate re-armed");
        }
        Ok(())
    }

    /// Copy of the statistics with pool peaks filled in.
    pub(crate) fn stats_with_peaks(&self) -> SimStats {
        let mut stats = self.stats.clone();
        for stage in Stage::STATIONS {
            let peak = self.pool(stage).map_or(0, ResourcePool::peak_in_use);
            stats.station_mut(stage).peak_in_use = peak;
        }
        stats
    }
}
