//! `diner-des` — discrete-event kernel: scheduler, resource pools, and the
//! capacity gate.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`scheduler`] | `Scheduler<W>` — min-heap of flow resumptions             |
//! | [`pool`]      | `ResourcePool` — bounded capacity, FIFO wait list         |
//! | [`gate`]      | `CapacityGate` — resettable one-shot broadcast signal     |
//! | [`error`]     | `DesError`, `DesResult<T>`                                |
//!
//! # Execution model (summary)
//!
//! Flows are plain state machines owned by the caller.  The scheduler only
//! knows `FlowId`s and an opaque wake payload `W`:
//!
//! ```text
//! loop:
//!   r = scheduler.pop_until(limit)   // earliest resumption, FIFO on ties
//!   clock = r.at
//!   flows[r.flow].resume(r.wake)     // runs to its next suspension point
//! ```
//!
//! A flow suspends by scheduling itself (timed wait), by queueing on a
//! [`ResourcePool`], or by subscribing to a [`CapacityGate`].  Whoever ends
//! the suspension (a timer, a `release` handing over a slot, a gate firing)
//! deregisters the flow everywhere else in the same step, so a flow is never
//! resumed twice for one wait.

pub mod error;
pub mod gate;
pub mod pool;
pub mod scheduler;


pub use error::{DesError, DesResult};
pub use gate::{CapacityGate, GateFiring, GateState, GateWait};
pub use pool::{Acquire, ResourcePool};
pub use scheduler::{Resumption, Scheduler};
