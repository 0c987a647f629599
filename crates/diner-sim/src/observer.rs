//! Simulation observer trait for event logging and data collection.

use crate::{LifecycleEvent, SimStats};

/// Callbacks invoked by [`Sim`][crate::Sim] while it runs.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  The core never formats text; observers
/// decide how (and whether) to render events.
///
/// # Example — rejection counter
///
/// ```rust,ignore
/// struct Rejections(usize);
///
/// impl SimObserver for Rejections {
///     fn on_event(&mut self, event: &LifecycleEvent) {
///         if matches!(event.kind, EventKind::RejectedQueueFull | EventKind::RejectedRestaurantFull) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called for every lifecycle event, in simulated-time order.
    fn on_event(&mut self, _event: &LifecycleEvent) {}

    /// Called once when a `run_*` call returns, with the statistics so far.
    fn on_run_end(&mut self, _stats: &SimStats) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Collects every event in emission order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventLog {
    pub events: Vec<LifecycleEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events concerning one customer, in order.
    pub fn for_customer(
        &self,
        customer: diner_core::CustomerId,
    ) -> impl Iterator<Item = &LifecycleEvent> + '_ {
        self.events.iter().filter(move |e| e.customer == customer)
    }
}

impl SimObserver for EventLog {
    fn on_event(&mut self, event: &LifecycleEvent) {
        self.events.push(*event);
    }
}

/// Fans every callback out to two observers.
pub struct Tee<'a, A: SimObserver, B: SimObserver> {
    pub first:  &'a mut A,
    pub second: &'a mut B,
}

impl<A: SimObserver, B: SimObserver> SimObserver for Tee<'_, A, B> {
    fn on_event(&mut self, event: &LifecycleEvent) {
        self.first.on_event(event);
        self.second.on_event(event);
    }

    fn on_run_end(&mut self, stats: &SimStats) {
        self.first.on_run_end(stats);
        self.second.on_run_end(stats);
    }
}
