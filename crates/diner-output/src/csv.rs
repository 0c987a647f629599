//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `events.csv`
//! - `stations.csv`

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, StationRow};

const EVENT_HEADER: [&str; 4] = ["customer_id", "at_minutes", "stage", "kind"];
const STATION_HEADER: [&str; 7] = [
    "stage",
    "capacity",
    "uses",
    "total_service_time",
    "mean_service_time",
    "wait_violations",
    "peak_in_use",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    events:        Writer<File>,
    stations_path: PathBuf,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(EVENT_HEADER)?;

        let stations_path = dir.join("stations.csv");
        let mut stations = Writer::from_path(&stations_path)?;
        stations.write_record(STATION_HEADER)?;
        stations.flush()?;

        Ok(Self { events, stations_path })
    }
}

impl OutputWriter for CsvWriter {
    fn write_event(&mut self, row: &EventRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.customer_id.to_string(),
            format!("{:.6}", row.at_minutes),
            row.stage.to_owned(),
            row.kind.to_owned(),
        ])?;
        Ok(())
    }

    fn write_stations(&mut self, rows: &[StationRow]) -> OutputResult<()> {
        let mut stations = Writer::from_path(&self.stations_path)?;
        stations.write_record(STATION_HEADER)?;
        for row in rows {
            stations.write_record(&[
                row.stage.to_owned(),
                row.capacity.to_string(),
                row.uses.to_string(),
                format!("{:.6}", row.total_service_time),
                row.mean_service_time.map_or_else(String::new, |m| format!("{m:.6}")),
                row.wait_violations.to_string(),
                row.peak_in_use.to_string(),
            ])?;
        }
        stations.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.events.flush()?;
        Ok(())
    }
}
