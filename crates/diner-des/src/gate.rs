//! `CapacityGate` — a one-shot broadcast signal that can be re-armed.
//!
//! The gate is `Armed` until [`fire`][CapacityGate::fire] is called, which
//! hands every current subscriber back to the caller and flips the gate to
//! `Fired`.  [`rearm`][CapacityGate::rearm] replaces a fired gate with a fresh
//! `Armed` one under the next generation number.
//!
//! Subscribers hold on to the generation they subscribed under.  A wake that
//! carries a different generation is not theirs, so re-arming can never
//! resume a flow that already observed an earlier firing.

use std::fmt;

use diner_core::FlowId;

use crate::{DesError, DesResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateState {
    Armed,
    Fired,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GateState::Armed => "armed",
            GateState::Fired => "fired",
        })
    }
}

/// Result of [`CapacityGate::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateWait {
    /// The gate is armed; the flow will be handed back when it fires.
    Pending { generation: u64 },
    /// The current generation has already fired.  The flow is not subscribed
    /// and should treat the gate as the winner of its race right away.
    AlreadyFired { generation: u64 },
}

/// Everything a caller needs to wake the subscribers of one firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateFiring {
    pub generation: u64,
    /// Subscribers in subscription order.
    pub woken:      Vec<FlowId>,
}

#[derive(Debug)]
pub struct CapacityGate {
    state:       GateState,
    generation:  u64,
    subscribers: Vec<FlowId>,
}

impl Default for CapacityGate {
    fn default() -> Self {
        Self {
            state:       GateState::Armed,
            generation:  0,
            subscribers: Vec::new(),
        }
    }
}

impl CapacityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_fired(&self) -> bool {
        self.state == GateState::Fired
    }

    /// `true` if the gate fired during `generation` (either it is the current
    /// fired generation, or a later one has since been armed).
    pub fn has_fired(&self, generation: u64) -> bool {
        generation < self.generation || (generation == self.generation && self.is_fired())
    }

    /// Register `flow` for the current generation.
    pub fn subscribe(&mut self, flow: FlowId) -> GateWait {
        if self.is_fired() {
            return GateWait::AlreadyFired { generation: self.generation };
        }
        if !self.subscribers.contains(&flow) {
            self.subscribers.push(flow);
        }
        GateWait::Pending { generation: self.generation }
    }

    /// Withdraw `flow`.  Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, flow: FlowId) -> bool {
        match self.subscribers.iter().position(|&s| s == flow) {
            Some(i) => {
                self.subscribers.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Fire the current generation and drain its subscribers.
    ///
    /// Firing an already fired gate is an invariant violation: occupancy can
    /// only reach capacity once per generation.
    pub fn fire(&mut self) -> DesResult<GateFiring> {
        if self.is_fired() {
            return Err(DesError::GateAlreadyFired { generation: self.generation });
        }
        self.state = GateState::Fired;
        Ok(GateFiring {
            generation: self.generation,
            woken:      std::mem::take(&mut self.subscribers),
        })
    }

    /// Replace a fired gate with a fresh armed one.  Returns the new
    /// generation, or `None` if the gate was still armed (nothing to do).
    pub fn rearm(&mut self) -> Option<u64> {
        if !self.is_fired() {
            return None;
        }
        self.generation += 1;
        self.state = GateState::Armed;
        self.subscribers.clear();
        Some(self.generation)
    }
}
