//! Integration tests for diner-sim.

use diner_core::{CustomerId, Dish, DishSet, SimTime};

use crate::{
    ArrivalSchedule, EventKind, EventLog, RestaurantConfig, ScriptedCustomer, Sim, SimBuilder,
    Stage, StationConfig,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn t(m: f64) -> SimTime {
    SimTime::from_minutes(m).unwrap()
}

/// Ten hours, every stage at one server with a one-minute mean, and a closed
/// door so only scripted customers arrive.
fn scripted_config() -> RestaurantConfig {
    RestaurantConfig {
        ticket:           StationConfig::new(1, 1.0),
        drinks:           StationConfig::new(1, 1.0),
        appetizer:        StationConfig::new(1, 1.0),
        main_course:      StationConfig::new(1, 1.0),
        dessert:          StationConfig::new(1, 1.0),
        seating_capacity: 30,
        seating_rate:     1.0,
        arrivals:         ArrivalSchedule::constant(0.0, 10),
        ..RestaurantConfig::default()
    }
}

fn scripted(config: RestaurantConfig, customers: &[(f64, &[Dish])]) -> Sim {
    let script = customers
        .iter()
        .map(|&(at, dishes)| ScriptedCustomer::new(t(at), DishSet::of(dishes)))
        .collect();
    SimBuilder::new(config, t(600.0), 1)
        .with_customer_script(script)
        .build()
        .unwrap()
}

const NOTHING: &[Dish] = &[];

fn kinds(log: &EventLog, customer: u32) -> Vec<EventKind> {
    log.for_customer(CustomerId(customer)).map(|e| e.kind).collect()
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn default_config_validates_for_five_hours() {
        RestaurantConfig::default().validate(SimTime::from_hours(5)).unwrap();
    }

    #[test]
    fn rate_table_must_cover_horizon() {
        let err = RestaurantConfig::default()
            .validate(SimTime::from_hours(6))
            .unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn zero_servers_rejected() {
        let config = RestaurantConfig {
            dessert: StationConfig::new(0, 0.5),
            ..RestaurantConfig::default()
        };
        assert!(matches!(config.validate(t(60.0)), Err(SimError::Config(_))));
    }

    #[test]
    fn zero_seating_rejected() {
        let config = RestaurantConfig { seating_capacity: 0, ..RestaurantConfig::default() };
        assert!(config.validate(t(60.0)).is_err());
    }

    #[test]
    fn bad_rates_and_probabilities_rejected() {
        let zero_rate = RestaurantConfig {
            ticket: StationConfig::new(2, 0.0),
            ..RestaurantConfig::default()
        };
        assert!(zero_rate.validate(t(60.0)).is_err());

        let negative_arrivals = RestaurantConfig {
            arrivals: ArrivalSchedule::new(vec![1.0, -0.5]),
            ..RestaurantConfig::default()
        };
        assert!(negative_arrivals.validate(t(60.0)).is_err());

        let bad_probability = RestaurantConfig {
            dish_probabilities: [0.5, 1.5, 0.5, 0.5],
            ..RestaurantConfig::default()
        };
        assert!(bad_probability.validate(t(60.0)).is_err());
    }

    #[test]
    fn zero_horizon_rejected() {
        assert!(RestaurantConfig::default().validate(SimTime::ZERO).is_err());
    }

    #[test]
    fn build_fails_before_any_event_runs() {
        let config = RestaurantConfig { wait_tolerance: 0.0, ..RestaurantConfig::default() };
        assert!(SimBuilder::new(config, t(60.0), 1).build().is_err());
    }
}

// ── Customer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod customer_tests {
    use super::*;
    use crate::customer::INITIAL_RATING;
    use crate::{Customer, wait_penalty};

    #[test]
    fn penalty_is_half_point_per_whole_tolerance() {
        let v = wait_penalty(25.0, 10.0).unwrap();
        assert_eq!(v.penalty, 1.0);
        assert_eq!(wait_penalty(39.9, 10.0).unwrap().penalty, 1.5);
    }

    #[test]
    fn wait_equal_to_tolerance_is_not_penalised() {
        assert!(wait_penalty(10.0, 10.0).is_none());
        assert!(wait_penalty(3.0, 10.0).is_none());
    }

    #[test]
    fn finish_stage_lowers_rating_from_stage_entry() {
        let mut c = Customer::new(CustomerId(0), t(0.0), DishSet::of(&[Dish::Drinks]));
        assert_eq!(c.rating(), INITIAL_RATING);

        assert!(c.finish_stage(t(5.0), 10.0).is_none());
        c.enter_stage(t(100.0));
        let v = c.finish_stage(t(125.0), 10.0).unwrap();
        assert_eq!(v.wait, 25.0);
        assert_eq!(c.rating(), 4.0);
    }

    #[test]
    fn rating_may_go_negative_but_clamped_view_does_not() {
        let mut c = Customer::new(CustomerId(0), t(0.0), DishSet::EMPTY);
        c.finish_stage(t(200.0), 10.0);
        assert_eq!(c.rating(), -5.0);
        assert_eq!(c.clamped_rating(), 0.0);
    }

    #[test]
    fn obtained_dishes_must_be_wanted_and_new() {
        let mut c = Customer::new(CustomerId(3), t(0.0), DishSet::of(&[Dish::Dessert]));
        assert_eq!(c.dishes_owed(), 1);
        assert!(c.mark_obtained(Dish::Drinks).is_err());
        c.mark_obtained(Dish::Dessert).unwrap();
        assert_eq!(c.dishes_owed(), 0);
        assert!(c.mark_obtained(Dish::Dessert).is_err());
        assert!(c.remaining().is_empty());
        assert!(c.wants_any());
    }
}

// ── Admission counter ─────────────────────────────────────────────────────────

#[cfg(test)]
mod admission_tests {
    use crate::{AdmissionCounter, AdmissionResetPolicy};

    #[test]
    fn counter_is_bounded() {
        let mut c = AdmissionCounter::new(2, AdmissionResetPolicy::ResetToZero);
        assert!(c.try_admit());
        assert!(c.try_admit());
        assert!(!c.try_admit());
        c.on_granted();
        assert!(c.try_admit());
    }

    #[test]
    fn zero_bound_admits_nobody() {
        let mut c = AdmissionCounter::new(0, AdmissionResetPolicy::ResetToZero);
        assert!(!c.try_admit());
        assert_eq!(c.queued(), 0);
    }

    #[test]
    fn gate_rejection_policies() {
        let mut reset = AdmissionCounter::new(5, AdmissionResetPolicy::ResetToZero);
        let mut decrement = AdmissionCounter::new(5, AdmissionResetPolicy::Decrement);
        for _ in 0..3 {
            reset.try_admit();
            decrement.try_admit();
        }
        reset.on_gate_rejection();
        decrement.on_gate_rejection();
        assert_eq!(reset.queued(), 0);
        assert_eq!(decrement.queued(), 2);
    }
}

// ── Arrivals ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod arrival_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn closed_hours_are_skipped() {
        let config = RestaurantConfig {
            arrivals: ArrivalSchedule::new(vec![0.0, 2.0]),
            ..RestaurantConfig::default()
        };
        let mut sim = SimBuilder::new(config, SimTime::from_hours(2), 5).build().unwrap();
        let mut log = EventLog::new();
        sim.run(&mut log).unwrap();

        let arrivals: Vec<SimTime> = log
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Arrived)
            .map(|e| e.at)
            .collect();
        assert!(arrivals.len() > 1);
        assert_eq!(arrivals[0], SimTime::ZERO);
        assert!(arrivals[1..].iter().all(|&a| a >= t(60.0) && a < t(120.0)));
    }

    #[test]
    fn nobody_arrives_at_or_after_horizon() {
        let mut sim = SimBuilder::new(RestaurantConfig::default(), t(90.0), 11).build().unwrap();
        let mut log = EventLog::new();
        sim.run(&mut log).unwrap();
        sim.run_to_completion(&mut log).unwrap();

        let arrivals = log.events.iter().filter(|e| e.kind == EventKind::Arrived);
        assert!(arrivals.clone().count() > 0);
        assert!(arrivals.clone().all(|e| e.at < t(90.0)));
        assert_eq!(arrivals.count() as u64, sim.stats().generated);
    }

    #[test]
    fn script_is_sorted_and_truncated_at_horizon() {
        let mut sim = scripted(
            scripted_config(),
            &[(30.0, NOTHING), (10.0, NOTHING), (600.0, NOTHING), (20.0, NOTHING)],
        );
        let mut log = EventLog::new();
        sim.run_to_completion(&mut NoopObserver).unwrap();
        assert_eq!(sim.stats().generated, 3);

        let mut again = scripted(
            scripted_config(),
            &[(30.0, NOTHING), (10.0, NOTHING), (20.0, NOTHING)],
        );
        again.run_to_completion(&mut log).unwrap();
        let first = log.for_customer(CustomerId(0)).next().unwrap();
        assert_eq!(first.at, t(10.0));
    }
}

// ── Customer journeys ─────────────────────────────────────────────────────────

#[cfg(test)]
mod journey_tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::customer::INITIAL_RATING;
    use crate::wait_penalty;

    fn first(log: &EventLog, customer: u32, kind: EventKind) -> SimTime {
        log.for_customer(CustomerId(customer))
            .find(|e| e.kind == kind)
            .map(|e| e.at)
            .unwrap()
    }

    fn penalty(wait: f64, tolerance: f64) -> f64 {
        wait_penalty(wait, tolerance).map_or(0.0, |v| v.penalty)
    }

    #[test]
    fn slow_ticket_service_lowers_rating() {
        let tolerance = 1.0;
        let config = RestaurantConfig {
            ticket: StationConfig::new(1, 0.01),
            wait_tolerance: tolerance,
            ..scripted_config()
        };
        let mut sim = scripted(config, &[(0.0, NOTHING)]);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        let wait = first(&log, 0, EventKind::Admitted).since(first(&log, 0, EventKind::Arrived));
        assert!(wait > tolerance, "ticket took {wait} minutes");

        let stats = sim.stats();
        assert_eq!(stats.departures, 1);
        assert_eq!(stats.station(Stage::Ticket).unwrap().wait_violations, 1);
        assert_eq!(stats.wait_violations(), 1);
        assert_eq!(stats.rating_sum, INITIAL_RATING - (wait / tolerance).floor() * 0.5);
        assert_eq!(stats.clamped_rating_sum, stats.rating_sum.max(0.0));
    }

    #[test]
    fn station_penalty_counts_from_station_entry() {
        let tolerance = 10.0;
        let config = RestaurantConfig {
            ticket: StationConfig::new(1, 1000.0),
            drinks: StationConfig::new(1, 0.05),
            wait_tolerance: tolerance,
            ..scripted_config()
        };
        let drinks: &[Dish] = &[Dish::Drinks];
        let mut sim = scripted(config, &[(0.0, drinks)]);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        let arrived = first(&log, 0, EventKind::Arrived);
        let admitted = first(&log, 0, EventKind::Admitted);
        let served = log
            .for_customer(CustomerId(0))
            .find(|e| e.kind == EventKind::Served && e.stage == Stage::Drinks)
            .map(|e| e.at)
            .unwrap();
        let station_wait = served.since(admitted);
        let expected = INITIAL_RATING
            - penalty(admitted.since(arrived), tolerance)
            - penalty(station_wait, tolerance);

        let stats = sim.stats();
        assert_eq!(stats.departures, 1);
        assert_eq!(stats.rating_sum, expected);
        assert_eq!(
            stats.station(Stage::Drinks).unwrap().wait_violations,
            u64::from(station_wait > tolerance)
        );
        assert_eq!(stats.station(Stage::Seating).unwrap().wait_violations, 0);
    }

    #[test]
    fn generous_tolerance_keeps_full_rating() {
        let config = RestaurantConfig { wait_tolerance: 1e9, ..scripted_config() };
        let everything: &[Dish] = &Dish::ALL;
        let sweet: &[Dish] = &[Dish::Drinks, Dish::Dessert];
        let main: &[Dish] = &[Dish::MainCourse];
        let mut sim = scripted(
            config,
            &[(0.0, everything), (0.0, sweet), (2.0, NOTHING), (5.0, main)],
        );
        sim.run_to_completion(&mut EventLog::new()).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.departures, 4);
        assert_eq!(stats.rating_sum, INITIAL_RATING * stats.departures as f64);
        assert_eq!(stats.clamped_rating_sum, stats.rating_sum);
        assert_eq!(stats.wait_violations(), 0);
        for stage in Stage::STATIONS {
            assert_eq!(stats.station(stage).unwrap().wait_violations, 0, "{stage}");
        }
    }

    #[test]
    fn customer_without_dishes_skips_stations_and_seating() {
        let mut sim = scripted(scripted_config(), &[(0.0, NOTHING), (1.0, NOTHING)]);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        for id in 0..2 {
            assert_eq!(
                kinds(&log, id),
                [EventKind::Arrived, EventKind::Admitted, EventKind::Departed]
            );
        }
        let stats = sim.stats();
        assert_eq!(stats.departures, 2);
        assert_eq!(stats.station(Stage::Seating).unwrap().uses, 0);
        for dish in Dish::ALL {
            assert_eq!(stats.station(Stage::food(dish)).unwrap().uses, 0);
        }
    }

    #[test]
    fn visits_exactly_the_wanted_stations_once() {
        let wanted: [&[Dish]; 3] = [
            &[Dish::Drinks, Dish::MainCourse],
            &Dish::ALL,
            &[Dish::Dessert],
        ];
        let script: Vec<(f64, &[Dish])> =
            wanted.iter().enumerate().map(|(i, &d)| (i as f64 * 3.0, d)).collect();
        let mut sim = scripted(scripted_config(), &script);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        for (id, dishes) in wanted.iter().enumerate() {
            let served: Vec<Stage> = log
                .for_customer(CustomerId(id as u32))
                .filter(|e| e.kind == EventKind::Served && e.stage != Stage::Seating)
                .map(|e| e.stage)
                .collect();
            let unique: BTreeSet<Stage> = served.iter().copied().collect();
            let expected: BTreeSet<Stage> = dishes.iter().map(|&d| Stage::food(d)).collect();
            assert_eq!(served.len(), unique.len(), "customer {id} served a dish twice");
            assert_eq!(unique, expected);

            let kinds = kinds(&log, id as u32);
            assert_eq!(kinds.first(), Some(&EventKind::Arrived));
            assert_eq!(kinds.last(), Some(&EventKind::Departed));
        }
        assert_eq!(sim.stats().station(Stage::Seating).unwrap().uses, 3);
    }

    #[test]
    fn events_are_in_time_order() {
        let report = crate::run(SimTime::from_hours(5), 3, RestaurantConfig::default()).unwrap();
        assert!(!report.events.is_empty());
        assert!(report.events.windows(2).all(|w| w[0].at <= w[1].at));
        assert_eq!(report.final_time, SimTime::from_hours(5));
    }
}

// ── Ticket gate ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod gate_tests {
    use super::*;

    #[test]
    fn zero_queue_bound_rejects_every_arrival() {
        let config = RestaurantConfig { max_ticket_queue: 0, ..RestaurantConfig::default() };
        let mut sim = SimBuilder::new(config, SimTime::from_hours(5), 9).build().unwrap();
        sim.run_to_completion(&mut EventLog::new()).unwrap();

        let stats = sim.stats();
        assert!(stats.generated > 0);
        assert_eq!(stats.rejected_queue_full, stats.generated);
        assert_eq!(stats.admitted, 0);
        assert_eq!(stats.departures, 0);
    }

    #[test]
    fn full_ticket_queue_rejects_newcomers() {
        let config = RestaurantConfig { max_ticket_queue: 1, ..scripted_config() };
        let d: &[Dish] = &[Dish::Drinks];
        let mut sim = scripted(config, &[(0.0, d), (0.0, d), (0.0, d)]);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        // Customer 0 is served at once, 1 waits, 2 finds the queue full.
        assert_eq!(kinds(&log, 2), [EventKind::Arrived, EventKind::RejectedQueueFull]);
        let stats = sim.stats();
        assert_eq!(stats.rejected_queue_full, 1);
        assert_eq!(stats.admitted, 2);
    }

    #[test]
    fn full_restaurant_rejects_queued_customer_then_rearms() {
        let config = RestaurantConfig { seating_capacity: 1, ..scripted_config() };
        let d: &[Dish] = &[Dish::Drinks];
        let mut sim = scripted(config, &[(0.0, d), (0.0, d), (500.0, d)]);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        assert_eq!(kinds(&log, 1), [EventKind::Arrived, EventKind::RejectedRestaurantFull]);
        assert_eq!(kinds(&log, 2).last(), Some(&EventKind::Departed));

        let stats = sim.stats();
        assert_eq!(stats.admitted, 2);
        assert_eq!(stats.rejected_restaurant_full, 1);
        assert_eq!(stats.departures, 2);
        assert_eq!(stats.peak_occupancy, 1);
        assert_eq!(sim.restaurant().occupancy(), 0);
        assert!(!sim.restaurant().gate.is_fired());
        // Fired at customer 0's admission, re-armed, fired again for customer 2,
        // re-armed once more.
        assert_eq!(sim.restaurant().gate.generation(), 2);
    }

    #[test]
    fn gate_interrupts_ticket_service_in_progress() {
        let config = RestaurantConfig {
            seating_capacity: 1,
            ticket: StationConfig::new(2, 1.0),
            ..scripted_config()
        };
        let d: &[Dish] = &[Dish::Appetizer];
        let mut sim = scripted(config, &[(0.0, d), (0.0, d)]);
        let mut log = EventLog::new();
        sim.run_to_completion(&mut log).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.station(Stage::Ticket).unwrap().uses, 2);
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.rejected_restaurant_full, 1);
        assert_eq!(sim.restaurant().ticket.in_use(), 0);

        let rejected = log
            .events
            .iter()
            .filter(|e| e.kind == EventKind::RejectedRestaurantFull)
            .count();
        assert_eq!(rejected, 1);
    }

    #[test]
    fn rejected_customers_release_ticket_servers() {
        let config = RestaurantConfig { seating_capacity: 2, ..RestaurantConfig::default() };
        let mut sim = SimBuilder::new(config, SimTime::from_hours(5), 21).build().unwrap();
        sim.run_to_completion(&mut EventLog::new()).unwrap();

        let r = sim.restaurant();
        assert_eq!(r.ticket.in_use(), 0);
        assert_eq!(r.ticket.queue_len(), 0);
        assert_eq!(r.occupancy(), 0);
        assert!(sim.stats().rejected_restaurant_full > 0);
    }
}

// ── Whole-run properties ──────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;
    use crate::run;

    #[test]
    fn same_seed_same_events() {
        let a = run(SimTime::from_hours(5), 42, RestaurantConfig::default()).unwrap();
        let b = run(SimTime::from_hours(5), 42, RestaurantConfig::default()).unwrap();
        assert_eq!(a, b);

        let c = run(SimTime::from_hours(5), 43, RestaurantConfig::default()).unwrap();
        assert_ne!(a.events, c.events);
    }

    #[test]
    fn customers_are_accounted_for_after_completion() {
        let mut sim = SimBuilder::new(RestaurantConfig::default(), SimTime::from_hours(5), 8)
            .build()
            .unwrap();
        sim.run_to_completion(&mut EventLog::new()).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.pending_at_ticket, 0);
        assert_eq!(
            stats.admitted + stats.rejected_queue_full + stats.rejected_restaurant_full,
            stats.generated
        );
        assert_eq!(stats.departures, stats.admitted);
        assert_eq!(sim.live_flows(), 0);
    }

    #[test]
    fn finished_customers_free_their_flow_slots() {
        let mut sim = SimBuilder::new(RestaurantConfig::default(), SimTime::from_hours(5), 8)
            .build()
            .unwrap();
        sim.run_to_completion(&mut EventLog::new()).unwrap();

        let generated = sim.stats().generated as usize;
        assert!(generated > 100);
        assert!(
            sim.flow_slots() < generated / 2,
            "{} slots for {generated} customers",
            sim.flow_slots()
        );
    }

    #[test]
    fn stats_fill_pool_peaks_from_a_shared_borrow() {
        fn busiest(sim: &Sim) -> usize {
            let stats = sim.stats();
            Stage::STATIONS
                .iter()
                .map(|&stage| stats.station(stage).unwrap().peak_in_use)
                .max()
                .unwrap_or(0)
        }

        let mut sim = SimBuilder::new(RestaurantConfig::default(), SimTime::from_hours(5), 5)
            .build()
            .unwrap();
        assert_eq!(busiest(&sim), 0);
        sim.run(&mut EventLog::new()).unwrap();

        let stats = sim.stats();
        assert!(stats.station(Stage::Ticket).unwrap().peak_in_use > 0);
        assert!(busiest(&sim) <= sim.config().seating_capacity);
        assert_eq!(sim.stats(), stats, "reading stats does not change them");
    }

    #[test]
    fn accounting_balances_at_the_horizon() {
        let report = run(SimTime::from_hours(5), 17, RestaurantConfig::default()).unwrap();
        assert!(report.stats.is_balanced());
    }

    #[test]
    fn capacities_are_never_exceeded() {
        let config = RestaurantConfig {
            seating_capacity: 8,
            arrivals: ArrivalSchedule::constant(3.0, 5),
            ..RestaurantConfig::default()
        };
        let mut sim = SimBuilder::new(config, SimTime::from_hours(5), 99).build().unwrap();
        sim.run_to_completion(&mut EventLog::new()).unwrap();

        let stats = sim.stats();
        assert!(stats.peak_occupancy <= 8);
        for stage in Stage::STATIONS {
            let s = stats.station(stage).unwrap();
            assert!(s.peak_in_use <= s.capacity, "{stage} peak {} > {}", s.peak_in_use, s.capacity);
        }
    }

    #[test]
    fn ratings_never_exceed_initial() {
        let report = run(SimTime::from_hours(5), 4, RestaurantConfig::default()).unwrap();
        let stats = &report.stats;
        assert!(stats.departures > 0);
        let mean = stats.mean_rating().unwrap();
        let clamped = stats.mean_clamped_rating().unwrap();
        assert!(mean <= 5.0);
        assert!(clamped >= mean);
        assert!(clamped >= 0.0);
    }

    #[test]
    fn run_until_can_be_resumed() {
        let mut sim = SimBuilder::new(RestaurantConfig::default(), SimTime::from_hours(5), 2)
            .build()
            .unwrap();
        let mut split = EventLog::new();
        sim.run_until(t(100.0), &mut split).unwrap();
        assert_eq!(sim.now(), t(100.0));
        sim.run(&mut split).unwrap();

        let whole = run(SimTime::from_hours(5), 2, RestaurantConfig::default()).unwrap();
        assert_eq!(split.events, whole.events);
    }

    #[test]
    fn observer_sees_final_stats() {
        struct LastStats(Option<crate::SimStats>);
        impl crate::SimObserver for LastStats {
            fn on_run_end(&mut self, stats: &crate::SimStats) {
                self.0 = Some(stats.clone());
            }
        }

        let mut sim = SimBuilder::new(RestaurantConfig::default(), SimTime::from_hours(1), 6)
            .build()
            .unwrap();
        let mut last = LastStats(None);
        sim.run(&mut last).unwrap();
        assert_eq!(last.0, Some(sim.stats()));
    }
}
