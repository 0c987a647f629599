//! `diner-core` — foundational types for the `rust_diner` restaurant simulator.
//!
//! This crate is a dependency of every other `diner-*` crate.  It has no
//! `diner-*` dependencies and minimal external ones (`rand`, `rand_distr`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`ids`]   | `CustomerId`, `FlowId`                                    |
//! | [`time`]  | `SimTime` (simulated minutes)                             |
//! | [`rng`]   | `SimRng` — seeded exponential / Bernoulli variates        |
//! | [`dish`]  | `Dish`, `DishSet`                                         |
//! | [`error`] | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod dish;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dish::{DISH_COUNT, Dish, DishSet};
pub use error::{CoreError, CoreResult};
pub use ids::{CustomerId, FlowId};
pub use rng::SimRng;
pub use time::{MINUTES_PER_HOUR, SimTime};
