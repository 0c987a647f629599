//! lunch_rush — a five-hour lunch service at a 30-table restaurant.
//!
//! Customers arrive at a rate that peaks in the third hour, queue for a
//! ticket, collect the dishes they want from four food stations, eat, and
//! leave.  The run writes `events.csv` and `stations.csv` to
//! `output/lunch_rush` and prints a summary.
//!
//! Usage: `lunch_rush [seed]`.  Set `RUST_LOG=debug` to watch the capacity
//! gate fire and re-arm.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use diner_core::SimTime;
use diner_output::{CsvWriter, OutputWriter, SimOutputObserver};
use diner_sim::{EventKind, LifecycleEvent, RestaurantConfig, SimBuilder, SimObserver, SimStats, Stage};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_SEED: u64  = 42;
const SERVICE_HOURS: u32 = 5;
const OUTPUT_DIR: &str   = "output/lunch_rush";

// ── Observer wrapper to count rejections ─────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:      SimOutputObserver<W>,
    rejections: Vec<(SimTime, EventKind)>,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, rejections: Vec::new() }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_event(&mut self, event: &LifecycleEvent) {
        if matches!(event.kind, EventKind::RejectedQueueFull | EventKind::RejectedRestaurantFull) {
            self.rejections.push((event.at, event.kind));
        }
        self.inner.on_event(event);
    }

    fn on_run_end(&mut self, stats: &SimStats) {
        self.inner.on_run_end(stats);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("seed must be an integer, got {arg:?}"))?,
        None => DEFAULT_SEED,
    };

    println!("=== lunch_rush — rust_diner ===");
    println!("Service: {SERVICE_HOURS} h  |  Seed: {seed}");
    println!();

    // 1. Config and sim.
    let config = RestaurantConfig::default();
    let horizon = SimTime::from_hours(SERVICE_HOURS);
    println!(
        "Tables: {}  |  Ticket queue bound: {}  |  Arrivals/min by hour: {:?}",
        config.seating_capacity,
        config.max_ticket_queue,
        config.arrivals.rates()
    );
    let mut sim = SimBuilder::new(config, horizon, seed).build()?;

    // 2. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 3. Serve until closing time, then let everyone inside finish.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let at_close = sim.stats();
    info!(pending = at_close.pending_at_ticket, occupancy = sim.restaurant().occupancy(), "doors closed");
    sim.run_to_completion(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 4. Summary.
    let stats = sim.stats();
    println!("Simulation complete in {:.3} s (last customer left at {})", elapsed.as_secs_f64(), sim.now());
    println!("  events.csv   : {} rows", obs.inner.events_written());
    println!("  stations.csv : {} rows", stats.stations.len());
    println!();

    println!("Customers generated      : {}", stats.generated);
    println!("  admitted               : {}", stats.admitted);
    println!("  rejected (queue full)  : {}", stats.rejected_queue_full);
    println!("  rejected (restaurant)  : {}", stats.rejected_restaurant_full);
    if let Some(rate) = stats.rejection_rate() {
        println!("  rejection rate         : {:.1}%", rate * 100.0);
    }
    if let Some(&(at, kind)) = obs.rejections.first() {
        println!("  first rejection        : {kind} at {at}");
    }
    println!("Peak occupancy           : {}", stats.peak_occupancy);
    if let (Some(mean), Some(clamped)) = (stats.mean_rating(), stats.mean_clamped_rating()) {
        println!("Mean rating              : {mean:.3} (clamped {clamped:.3})");
    }
    println!();

    // 5. Station table.
    println!("{:<12} {:>6} {:>8} {:>10} {:>10} {:>6}", "Station", "Slots", "Uses", "Mean svc", "Late", "Peak");
    println!("{}", "-".repeat(57));
    for stage in Stage::STATIONS {
        let Some(s) = stats.station(stage) else { continue };
        println!(
            "{:<12} {:>6} {:>8} {:>10} {:>10} {:>6}",
            stage.as_str(),
            s.capacity,
            s.uses,
            s.mean_service_time().map_or_else(|| "-".to_owned(), |m| format!("{m:.2}")),
            s.wait_violations,
            s.peak_in_use,
        );
    }

    Ok(())
}
