//! `diner-output` — run output writers for the rust_diner simulator.
//!
//! | Backend | Files created                    |
//! |---------|----------------------------------|
//! | CSV     | `events.csv`, `stations.csv`     |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `diner_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use diner_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{EventRow, StationRow};
pub use writer::OutputWriter;
