//! Structured lifecycle events emitted by customer flows.

use std::fmt;

use diner_core::{CustomerId, Dish, SimTime};

/// Where in the pipeline an event happened.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Ticket,
    Drinks,
    Appetizer,
    MainCourse,
    Dessert,
    Seating,
    Exit,
}

impl Stage {
    /// Stages backed by a resource pool, in pipeline order.
    pub const STATIONS: [Stage; 6] = [
        Stage::Ticket,
        Stage::Drinks,
        Stage::Appetizer,
        Stage::MainCourse,
        Stage::Dessert,
        Stage::Seating,
    ];

    pub fn food(dish: Dish) -> Stage {
        match dish {
            Dish::Drinks => Stage::Drinks,
            Dish::Appetizer => Stage::Appetizer,
            Dish::MainCourse => Stage::MainCourse,
            Dish::Dessert => Stage::Dessert,
        }
    }

    /// The dish served here, for food stations.
    pub fn dish(self) -> Option<Dish> {
        match self {
            Stage::Drinks => Some(Dish::Drinks),
            Stage::Appetizer => Some(Dish::Appetizer),
            Stage::MainCourse => Some(Dish::MainCourse),
            Stage::Dessert => Some(Dish::Dessert),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ticket => "ticket",
            Stage::Seating => "seating",
            Stage::Exit => "exit",
            food => food.dish().map_or("unknown", Dish::as_str),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// Customer reached the ticket queue.
    Arrived,
    /// Ticket service completed; the customer now counts toward occupancy.
    Admitted,
    RejectedQueueFull,
    RejectedRestaurantFull,
    /// A food station or the seating stage finished with the customer.
    Served,
    /// Customer left after being admitted.
    Departed,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Arrived => "arrived",
            EventKind::Admitted => "admitted",
            EventKind::RejectedQueueFull => "rejected_queue_full",
            EventKind::RejectedRestaurantFull => "rejected_restaurant_full",
            EventKind::Served => "served",
            EventKind::Departed => "departed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the lifecycle event stream.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LifecycleEvent {
    pub customer: CustomerId,
    pub stage:    Stage,
    pub at:       SimTime,
    pub kind:     EventKind,
}

/// Why a customer was turned away.  Expected outcomes, counted in
/// [`SimStats`][crate::SimStats], never raised as errors.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    QueueFull,
    RestaurantFull,
}

impl Rejection {
    pub fn event_kind(self) -> EventKind {
        match self {
            Rejection::QueueFull => EventKind::RejectedQueueFull,
            Rejection::RestaurantFull => EventKind::RejectedRestaurantFull,
        }
    }
}
