//! `Scheduler` — the discrete-event clock and pending-resumption queue.
//!
//! # Ordering
//!
//! Resumptions are popped in ascending simulated time.  Equal timestamps
//! resolve in insertion order: every entry carries a monotonically increasing
//! sequence number that breaks ties, so a fixed seed always replays the same
//! interleaving.
//!
//! # Cancellation
//!
//! Each registered flow owns a *wait token*.  An entry records the token of
//! its flow at the moment it was scheduled; [`Scheduler::cancel`] advances the
//! token, which turns every outstanding entry for that flow stale.  Stale
//! entries stay in the heap and are skipped when they surface.  This keeps
//! cancellation O(1) and leaves the heap untouched.
//!
//! # Flow slots
//!
//! A finished flow is handed back with [`Scheduler::retire_flow`].  Its slot
//! goes on a free list and the next [`Scheduler::register_flow`] reuses it,
//! so slot count tracks the peak number of live flows rather than every flow
//! ever created.  Retiring advances the token, so nothing queued for the old
//! occupant can reach the new one.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use diner_core::{FlowId, SimTime};
use tracing::trace;

use crate::{DesError, DesResult};

/// A popped, still-valid resumption handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Resumption<W> {
    pub at:   SimTime,
    pub flow: FlowId,
    pub wake: W,
}

struct Entry<W> {
    at:    SimTime,
    seq:   u64,
    flow:  FlowId,
    token: u64,
    wake:  W,
}

impl<W> PartialEq for Entry<W> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<W> Eq for Entry<W> {}

impl<W> PartialOrd for Entry<W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<W> Ord for Entry<W> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default).
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Simulated clock plus a priority queue of flow resumptions carrying a wake
/// payload `W`.
pub struct Scheduler<W> {
    now:       SimTime,
    queue:     BinaryHeap<Entry<W>>,
    next_seq:  u64,
    /// Current wait token per flow slot, indexed by `FlowId`.
    tokens:    Vec<u64>,
    live:      Vec<bool>,
    /// Retired slots awaiting reuse.
    free:      Vec<FlowId>,
    /// Count of stale entries skipped so far.
    discarded: u64,
}

impl<W> Default for Scheduler<W> {
    fn default() -> Self {
        Self {
            now:       SimTime::ZERO,
            queue:     BinaryHeap::new(),
            next_seq:  0,
            tokens:    Vec::new(),
            live:      Vec::new(),
            free:      Vec::new(),
            discarded: 0,
        }
    }
}

impl<W> Scheduler<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Register a new flow and return its handle.  Handles are dense and
    /// start at `FlowId(0)`, so callers can index a parallel `Vec` with them.
    /// A retired slot is reused before a new one is added.
    pub fn register_flow(&mut self) -> FlowId {
        if let Some(id) = self.free.pop() {
            self.live[id.index()] = true;
            return id;
        }
        let id = FlowId(self.tokens.len() as u32);
        self.tokens.push(0);
        self.live.push(true);
        id
    }

    /// Hand a finished flow's slot back for reuse.  Every entry still queued
    /// for it turns stale.
    pub fn retire_flow(&mut self, flow: FlowId) -> DesResult<()> {
        self.check_live(flow)?;
        let i = flow.index();
        self.tokens[i] += 1;
        self.live[i] = false;
        self.free.push(flow);
        Ok(())
    }

    /// Slots allocated so far, live or retired.
    pub fn flow_slots(&self) -> usize {
        self.tokens.len()
    }

    /// Registered flows not yet retired.
    pub fn live_flows(&self) -> usize {
        self.tokens.len() - self.free.len()
    }

    fn check_live(&self, flow: FlowId) -> DesResult<()> {
        match self.live.get(flow.index()) {
            Some(true) => Ok(()),
            _ => Err(DesError::UnknownFlow(flow)),
        }
    }

    /// Enqueue a resumption of `flow` at `now + delay`.
    ///
    /// `delay` must be finite and non-negative; anything else is a kernel
    /// invariant violation.
    pub fn schedule(&mut self, flow: FlowId, delay: f64, wake: W) -> DesResult<()> {
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(DesError::InvalidDelay { flow, delay });
        }
        self.check_live(flow)?;
        let token = self.tokens[flow.index()];
        self.queue.push(Entry {
            at: self.now + delay,
            seq: self.next_seq,
            flow,
            token,
            wake,
        });
        self.next_seq += 1;
        Ok(())
    }

    /// Enqueue a resumption of `flow` at the current instant, after every
    /// resumption already queued for this instant.
    #[inline]
    pub fn schedule_now(&mut self, flow: FlowId, wake: W) -> DesResult<()> {
        self.schedule(flow, 0.0, wake)
    }

    /// Invalidate every resumption currently queued for `flow`.
    pub fn cancel(&mut self, flow: FlowId) -> DesResult<()> {
        self.check_live(flow)?;
        self.tokens[flow.index()] += 1;
        Ok(())
    }

    /// Pop the earliest valid resumption at or before `limit`, advancing the
    /// clock to its timestamp.
    ///
    /// Returns `None` once nothing valid remains at or before `limit`; the
    /// clock is left where it was.
    pub fn pop_until(&mut self, limit: SimTime) -> Option<Resumption<W>> {
        self.pop_valid(Some(limit))
    }

    /// Pop the earliest valid resumption regardless of time.
    pub fn pop_next(&mut self) -> Option<Resumption<W>> {
        self.pop_valid(None)
    }

    fn pop_valid(&mut self, limit: Option<SimTime>) -> Option<Resumption<W>> {
        while let Some(head) = self.queue.peek() {
            if limit.is_some_and(|l| head.at > l) {
                return None;
            }
            let entry = self.queue.pop()?;
            if self.tokens[entry.flow.index()] != entry.token {
                self.discarded += 1;
                trace!(flow = %entry.flow, at = %entry.at, "discarding cancelled resumption");
                continue;
            }
            self.now = entry.at;
            return Some(Resumption {
                at:   entry.at,
                flow: entry.flow,
                wake: entry.wake,
            });
        }
        None
    }

    /// Move the clock forward to `t` (no-op if `t` is not later than now).
    pub fn advance_to(&mut self, t: SimTime) {
        if t > self.now {
            self.now = t;
        }
    }

    /// Timestamp of the earliest queued entry (which may be stale).
    pub fn peek_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|e| e.at)
    }

    /// Queued entries, stale ones included.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Stale entries skipped since construction.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
