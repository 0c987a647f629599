//! The `OutputWriter` trait implemented by backend writers.

use crate::{EventRow, OutputResult, StationRow};

/// A sink for run output.
///
/// Errors surface through [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error]
/// when the writer is driven by the observer.
pub trait OutputWriter {
    /// Append one lifecycle event.
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()>;

    /// Replace the station table with `rows`.
    ///
    /// Called at the end of every `run_*` call, so the table always reflects
    /// the latest statistics.
    fn write_stations(&mut self, rows: &[StationRow]) -> OutputResult<()>;

    /// Flush buffered rows.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
