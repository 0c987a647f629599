//! Customer journeys and the arrival generator as explicit state machines.
//!
//! # Customer journey
//!
//! ```text
//! New ──Start──▶ (queue full?) ──▶ Done [rejected_queue_full]
//!                 │
//!                 ▼ race { ticket pool, capacity gate }
//!          TicketQueued ──GateFired──▶ Done [rejected_restaurant_full]
//!                 │ Granted
//!                 ▼ race { service timeout, capacity gate }
//!          TicketServing ──GateFired──▶ Done [rejected_restaurant_full]
//!                 │ Timeout: occupancy += 1, release ticket server
//!                 ▼
//!            ┌─ route ◀──────────────────────────────┐
//!            │   remaining dish? ──▶ StationQueued ──▶ StationServing
//!            │   wanted any?     ──▶ SeatingQueued ──▶ Dining ──▶ depart
//!            └── otherwise       ──▶ depart
//! ```
//!
//! A flow resumes only through the scheduler.  Whoever ends a wait (a timer,
//! a pool hand-over, a gate firing) withdraws the flow from every other wait
//! in the same step.

use diner_core::{Dish, FlowId, SimRng, SimTime};
use diner_des::{Acquire, GateFiring, GateWait, Scheduler};
use tracing::{debug, trace};

use crate::arrival::ArrivalGenerator;
use crate::{
    Customer, EventKind, LifecycleEvent, Rejection, Restaurant, RestaurantConfig, SimError,
    SimObserver, SimResult, Stage,
};

/// Why a flow is being resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    /// First resumption after the flow is created.
    Start,
    /// A pool handed this flow a slot.
    Granted,
    /// A timed wait elapsed.
    Timeout,
    /// The capacity gate fired while this flow was subscribed.
    GateFired { generation: u64 },
}

/// Everything a flow may touch during one resumption.
pub(crate) struct FlowCtx<'a> {
    pub scheduler:  &'a mut Scheduler<Wake>,
    pub restaurant: &'a mut Restaurant,
    pub rng:        &'a mut SimRng,
    pub config:     &'a RestaurantConfig,
    /// Flow slots indexed by `FlowId`; newly spawned flows are pushed here.
    pub flows:      &'a mut Vec<Option<Flow>>,
    pub observer:   &'a mut dyn SimObserver,
}

impl FlowCtx<'_> {
    fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    fn emit(&mut self, customer: &Customer, stage: Stage, kind: EventKind) {
        let event = LifecycleEvent {
            customer: customer.id(),
            stage,
            at: self.now(),
            kind,
        };
        self.observer.on_event(&event);
    }

    /// Release a slot of `stage`'s pool and resume whoever inherits it.
    fn release(&mut self, stage: Stage) -> SimResult<()> {
        let pool = self
            .restaurant
            .pool_mut(stage)
            .ok_or_else(|| SimError::Invariant(format!("stage {stage} has no pool")))?;
        if let Some(next) = pool.release()? {
            // A ticket waiter is also subscribed to the gate; the grant wins.
            self.restaurant.gate.unsubscribe(next);
            self.scheduler.schedule_now(next, Wake::Granted)?;
        }
        Ok(())
    }

    /// Resume every subscriber of a gate firing, pulling each one out of the
    /// ticket wait list and invalidating its pending timer first.
    fn wake_gate_subscribers(&mut self, firing: GateFiring) -> SimResult<()> {
        for flow in firing.woken {
            self.restaurant.ticket.cancel(flow);
            self.scheduler.cancel(flow)?;
            self.scheduler
                .schedule_now(flow, Wake::GateFired { generation: firing.generation })?;
        }
        Ok(())
    }

    fn spawn(&mut self, flow: Flow) -> SimResult<FlowId> {
        let id = self.scheduler.register_flow();
        let slots = self.flows.len();
        if id.index() == slots {
            self.flows.push(Some(flow));
        } else {
            match self.flows.get_mut(id.index()) {
                Some(slot) if slot.is_none() => *slot = Some(flow),
                _ => {
                    return Err(SimError::Invariant(format!(
                        "{id} registered but its slot is not free ({slots} slots)"
                    )));
                }
            }
        }
        self.scheduler.schedule_now(id, Wake::Start)?;
        Ok(id)
    }
}

// ── Flow ──────────────────────────────────────────────────────────────────────

pub(crate) enum Flow {
    Arrivals(GeneratorFlow),
    Customer(CustomerFlow),
}

impl Flow {
    /// Run until the next suspension point.  Returns `true` once the flow has
    /// finished and its slot can be dropped.
    pub(crate) fn resume(&mut self, me: FlowId, wake: Wake, ctx: &mut FlowCtx<'_>) -> SimResult<bool> {
        match self {
            Flow::Arrivals(g) => g.resume(me, wake, ctx),
            Flow::Customer(c) => c.resume(me, wake, ctx),
        }
    }

    /// `true` for customers that have not finished the ticket stage.
    pub(crate) fn is_at_ticket(&self) -> bool {
        matches!(
            self,
            Flow::Customer(CustomerFlow {
                state: CustomerState::New
                    | CustomerState::TicketQueued { .. }
                    | CustomerState::TicketServing { .. },
                ..
            })
        )
    }
}

// ── Arrival generator ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeneratorState {
    New,
    /// Waiting for the generator slot.
    Queued,
    Running,
    Done,
}

pub(crate) struct GeneratorFlow {
    generator: ArrivalGenerator,
    state:     GeneratorState,
}

impl GeneratorFlow {
    pub(crate) fn new(generator: ArrivalGenerator) -> Self {
        Self { generator, state: GeneratorState::New }
    }

    fn resume(&mut self, me: FlowId, wake: Wake, ctx: &mut FlowCtx<'_>) -> SimResult<bool> {
        match (self.state, wake) {
            (GeneratorState::New, Wake::Start) => match ctx.restaurant.generator.acquire(me)? {
                Acquire::Granted => self.begin(me, ctx)?,
                Acquire::Queued { .. } => self.state = GeneratorState::Queued,
            },
            (GeneratorState::Queued, Wake::Granted) => self.begin(me, ctx)?,
            (GeneratorState::Running, Wake::Timeout) => self.arrive(me, ctx)?,
            (state, wake) => {
                return Err(SimError::Invariant(format!(
                    "arrival generator in state {state:?} resumed with {wake:?}"
                )));
            }
        }
        Ok(self.state == GeneratorState::Done)
    }

    fn begin(&mut self, me: FlowId, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        match self.generator.first_arrival() {
            Some(at) => {
                self.state = GeneratorState::Running;
                let delay = at.since(ctx.now());
                ctx.scheduler.schedule(me, delay, Wake::Timeout)?;
                Ok(())
            }
            None => self.finish(ctx),
        }
    }

    fn arrive(&mut self, me: FlowId, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        let now = ctx.now();
        let customer = self
            .generator
            .make_customer(now, &ctx.config.dish_probabilities, ctx.rng);
        trace!(customer = %customer.id(), at = %now, wanted = customer.dish_wanted().len(), "customer generated");
        ctx.restaurant.stats.generated += 1;
        ctx.spawn(Flow::Customer(CustomerFlow::new(customer)))?;

        match self.generator.next_arrival(now, &ctx.config.arrivals, ctx.rng)? {
            Some(at) => {
                ctx.scheduler.schedule(me, at.since(now), Wake::Timeout)?;
                Ok(())
            }
            None => self.finish(ctx),
        }
    }

    fn finish(&mut self, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        self.state = GeneratorState::Done;
        debug!(generated = self.generator.generated(), at = %ctx.now(), "arrival generator finished");
        if ctx.restaurant.generator.release()?.is_some() {
            return Err(SimError::Invariant("a second arrival generator was queued".into()));
        }
        Ok(())
    }
}

// ── Customer journey ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum CustomerState {
    New,
    /// Waiting for a ticket server, subscribed to gate `generation`.
    TicketQueued { generation: u64 },
    /// Holding a ticket server for `service` minutes, subscribed to gate
    /// `generation`.
    TicketServing { generation: u64, service: f64 },
    StationQueued { dish: Dish },
    StationServing { dish: Dish, service: f64 },
    SeatingQueued,
    Dining { service: f64 },
    Done,
}

pub(crate) struct CustomerFlow {
    customer: Customer,
    state:    CustomerState,
}

impl CustomerFlow {
    pub(crate) fn new(customer: Customer) -> Self {
        Self { customer, state: CustomerState::New }
    }

    fn resume(&mut self, me: FlowId, wake: Wake, ctx: &mut FlowCtx<'_>) -> SimResult<bool> {
        use CustomerState as S;

        match (self.state, wake) {
            (S::New, Wake::Start) => self.arrive(me, ctx)?,

            (S::TicketQueued { generation }, Wake::Granted) => {
                if ctx.restaurant.gate.has_fired(generation) {
                    // The gate won while the grant was in flight.
                    ctx.release(Stage::Ticket)?;
                    ctx.restaurant.admission.on_gate_rejection();
                    self.reject(Rejection::RestaurantFull, ctx);
                } else {
                    self.start_ticket_service(me, ctx)?;
                }
            }
            (S::TicketQueued { generation }, Wake::GateFired { generation: fired })
                if generation == fired =>
            {
                ctx.restaurant.admission.on_gate_rejection();
                self.reject(Rejection::RestaurantFull, ctx);
            }

            (S::TicketServing { service, .. }, Wake::Timeout) => {
                self.finish_ticket(me, service, ctx)?;
            }
            (S::TicketServing { generation, .. }, Wake::GateFired { generation: fired })
                if generation == fired =>
            {
                ctx.release(Stage::Ticket)?;
                self.reject(Rejection::RestaurantFull, ctx);
            }

            (S::StationQueued { dish }, Wake::Granted) => self.start_station(me, dish, ctx)?,
            (S::StationServing { dish, service }, Wake::Timeout) => {
                self.finish_station(me, dish, service, ctx)?;
            }

            (S::SeatingQueued, Wake::Granted) => self.start_dining(me, ctx)?,
            (S::Dining { service }, Wake::Timeout) => {
                ctx.release(Stage::Seating)?;
                ctx.restaurant.stats.station_mut(Stage::Seating).total_service_time += service;
                ctx.emit(&self.customer, Stage::Seating, EventKind::Served);
                self.depart(ctx)?;
            }

            (state, wake) => {
                return Err(SimError::Invariant(format!(
                    "{} in state {state:?} resumed with {wake:?}",
                    self.customer.id()
                )));
            }
        }
        Ok(self.state == S::Done)
    }

    // ── Ticket stage ──────────────────────────────────────────────────────

    fn arrive(&mut self, me: FlowId, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        ctx.emit(&self.customer, Stage::Ticket, EventKind::Arrived);

        if !ctx.restaurant.admission.try_admit() {
            self.reject(Rejection::QueueFull, ctx);
            return Ok(());
        }

        let generation = match ctx.restaurant.gate.subscribe(me) {
            GateWait::Pending { generation } => generation,
            GateWait::AlreadyFired { .. } => {
                ctx.restaurant.admission.on_gate_rejection();
                self.reject(Rejection::RestaurantFull, ctx);
                return Ok(());
            }
        };

        match ctx.restaurant.ticket.acquire(me)? {
            Acquire::Granted => self.start_ticket_service(me, ctx),
            Acquire::Queued { position } => {
                trace!(customer = %self.customer.id(), position, "waiting for a ticket server");
                self.state = CustomerState::TicketQueued { generation };
                Ok(())
            }
        }
    }

    /// Holding a ticket server: leave the admission queue and race the
    /// service timer against the gate.
    fn start_ticket_service(&mut self, me: FlowId, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        ctx.restaurant.admission.on_granted();

        let generation = match ctx.restaurant.gate.subscribe(me) {
            GateWait::Pending { generation } => generation,
            GateWait::AlreadyFired { .. } => {
                ctx.release(Stage::Ticket)?;
                self.reject(Rejection::RestaurantFull, ctx);
                return Ok(());
            }
        };

        let service = ctx.rng.exp(ctx.config.ticket.service_rate)?;
        ctx.restaurant.stats.station_mut(Stage::Ticket).uses += 1;
        self.state = CustomerState::TicketServing { generation, service };
        ctx.scheduler.schedule(me, service, Wake::Timeout)?;
        Ok(())
    }

    fn finish_ticket(&mut self, me: FlowId, service: f64, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        ctx.restaurant.gate.unsubscribe(me);
        let firing = ctx.restaurant.enter()?;
        ctx.restaurant.stats.admitted += 1;
        ctx.emit(&self.customer, Stage::Ticket, EventKind::Admitted);

        let violated = self
            .customer
            .finish_stage(ctx.now(), ctx.config.wait_tolerance)
            .is_some();
        let ticket = ctx.restaurant.stats.station_mut(Stage::Ticket);
        ticket.total_service_time += service;
        if violated {
            ticket.wait_violations += 1;
        }

        // Losers of the race leave the ticket wait list before the freed
        // server is handed on.
        if let Some(firing) = firing {
            ctx.wake_gate_subscribers(firing)?;
        }
        ctx.release(Stage::Ticket)?;
        self.route(me, ctx)
    }

    fn reject(&mut self, reason: Rejection, ctx: &mut FlowCtx<'_>) {
        debug!(customer = %self.customer.id(), ?reason, at = %ctx.now(), "customer rejected");
        ctx.restaurant.stats.record_rejection(reason);
        ctx.emit(&self.customer, Stage::Ticket, reason.event_kind());
        self.state = CustomerState::Done;
    }

    // ── Food stations and seating ─────────────────────────────────────────

    fn route(&mut self, me: FlowId, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        let remaining = self.customer.remaining();
        match ctx.rng.choose(&remaining).copied() {
            Some(dish) => {
                self.customer.enter_stage(ctx.now());
                match ctx.restaurant.stations[dish.index()].acquire(me)? {
                    Acquire::Granted => self.start_station(me, dish, ctx),
                    Acquire::Queued { .. } => {
                        self.state = CustomerState::StationQueued { dish };
                        Ok(())
                    }
                }
            }
            None if self.customer.wants_any() => match ctx.restaurant.seating.acquire(me)? {
                Acquire::Granted => self.start_dining(me, ctx),
                Acquire::Queued { .. } => {
                    self.state = CustomerState::SeatingQueued;
                    Ok(())
                }
            },
            None => self.depart(ctx),
        }
    }

    fn start_station(&mut self, me: FlowId, dish: Dish, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        let service = ctx.rng.exp(ctx.config.station(dish).service_rate)?;
        ctx.restaurant.stats.station_mut(Stage::food(dish)).uses += 1;
        self.state = CustomerState::StationServing { dish, service };
        ctx.scheduler.schedule(me, service, Wake::Timeout)?;
        Ok(())
    }

    fn finish_station(
        &mut self,
        me:      FlowId,
        dish:    Dish,
        service: f64,
        ctx:     &mut FlowCtx<'_>,
    ) -> SimResult<()> {
        let stage = Stage::food(dish);
        ctx.release(stage)?;
        self.customer.mark_obtained(dish)?;
        ctx.emit(&self.customer, stage, EventKind::Served);

        let violated = self
            .customer
            .finish_stage(ctx.now(), ctx.config.wait_tolerance)
            .is_some();
        let station = ctx.restaurant.stats.station_mut(stage);
        station.total_service_time += service;
        if violated {
            station.wait_violations += 1;
        }
        self.route(me, ctx)
    }

    fn start_dining(&mut self, me: FlowId, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        let service = ctx.rng.exp(ctx.config.seating_rate)?;
        ctx.restaurant.stats.station_mut(Stage::Seating).uses += 1;
        self.state = CustomerState::Dining { service };
        ctx.scheduler.schedule(me, service, Wake::Timeout)?;
        Ok(())
    }

    fn depart(&mut self, ctx: &mut FlowCtx<'_>) -> SimResult<()> {
        ctx.restaurant.depart()?;
        let stats = &mut ctx.restaurant.stats;
        stats.departures += 1;
        stats.rating_sum += self.customer.rating();
        stats.clamped_rating_sum += self.customer.clamped_rating();
        ctx.emit(&self.customer, Stage::Exit, EventKind::Departed);
        trace!(customer = %self.customer.id(), rating = self.customer.rating(), "customer departed");
        self.state = CustomerState::Done;
        Ok(())
    }
}
