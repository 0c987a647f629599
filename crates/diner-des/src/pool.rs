//! `ResourcePool` — a bounded-capacity station with a FIFO wait list.
//!
//! A pool never resumes anyone itself.  `release` reports which waiter (if
//! any) inherited the freed slot, and the caller schedules that waiter's
//! resumption.  The slot is transferred directly, so `in_use` does not dip
//! between the release and the hand-over and no newcomer can jump the queue.

use std::collections::VecDeque;

use diner_core::FlowId;

use crate::{DesError, DesResult};

/// Outcome of [`ResourcePool::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A slot was free; the caller holds it now.
    Granted,
    /// All slots are busy; the caller was appended to the wait list.
    Queued { position: usize },
}

#[derive(Debug)]
pub struct ResourcePool {
    name:        &'static str,
    capacity:    usize,
    in_use:      usize,
    peak_in_use: usize,
    waiters:     VecDeque<FlowId>,
}

impl ResourcePool {
    /// Create a pool with `capacity` slots.  Zero capacity is rejected.
    pub fn new(name: &'static str, capacity: usize) -> DesResult<Self> {
        if capacity == 0 {
            return Err(DesError::ZeroCapacity { pool: name });
        }
        Ok(Self {
            name,
            capacity,
            in_use: 0,
            peak_in_use: 0,
            waiters: VecDeque::new(),
        })
    }

    /// Take a slot if one is free, otherwise join the back of the wait list.
    pub fn acquire(&mut self, flow: FlowId) -> DesResult<Acquire> {
        if self.waiters.contains(&flow) {
            return Err(DesError::AlreadyQueued { pool: self.name, flow });
        }
        if self.in_use < self.capacity {
            self.in_use += 1;
            self.peak_in_use = self.peak_in_use.max(self.in_use);
            return Ok(Acquire::Granted);
        }
        self.waiters.push_back(flow);
        Ok(Acquire::Queued { position: self.waiters.len() - 1 })
    }

    /// Give back one slot.
    ///
    /// If a flow is waiting, the slot passes straight to the head of the wait
    /// list and that flow is returned; the caller must resume it.
    pub fn release(&mut self) -> DesResult<Option<FlowId>> {
        if self.in_use == 0 {
            return Err(DesError::ReleaseWithoutAcquire { pool: self.name });
        }
        match self.waiters.pop_front() {
            Some(next) => Ok(Some(next)),
            None => {
                self.in_use -= 1;
                Ok(None)
            }
        }
    }

    /// Withdraw a queued request.  Returns `false` if `flow` was not waiting
    /// (already granted, or never queued).
    pub fn cancel(&mut self, flow: FlowId) -> bool {
        match self.waiters.iter().position(|&w| w == flow) {
            Some(i) => {
                self.waiters.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Highest `in_use` ever observed.
    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }

    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_waiting(&self, flow: FlowId) -> bool {
        self.waiters.contains(&flow)
    }
}
