//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use diner_sim::{LifecycleEvent, SimObserver, SimStats};

use crate::row::{EventRow, StationRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes lifecycle events and station statistics to
/// any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    events:     u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, events: 0, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Events written so far.
    pub fn events_written(&self) -> u64 {
        self.events
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_event(&mut self, event: &LifecycleEvent) {
        let result = self.writer.write_event(&EventRow::from(event));
        if result.is_ok() {
            self.events += 1;
        }
        self.store_err(result);
    }

    fn on_run_end(&mut self, stats: &SimStats) {
        let rows: Vec<StationRow> = stats
            .stations
            .iter()
            .map(|(&stage, s)| StationRow::new(stage, s))
            .collect();
        let result = self.writer.write_stations(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
