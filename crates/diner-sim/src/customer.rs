//! The `Customer` entity and its rating rules.

use diner_core::{CustomerId, Dish, DishSet, SimTime};

use crate::{SimError, SimResult};

/// Rating every customer starts with.
pub const INITIAL_RATING: f64 = 5.0;

/// Rating lost per whole tolerance interval of a violating wait.
pub const PENALTY_PER_TOLERANCE: f64 = 0.5;

/// A stage wait that exceeded the tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaitViolation {
    /// Minutes from stage entry to stage completion.
    pub wait:    f64,
    /// Rating deducted: `floor(wait / tolerance) * 0.5`.
    pub penalty: f64,
}

/// Penalty for a stage wait, or `None` if it does not exceed `tolerance`.
pub fn wait_penalty(wait: f64, tolerance: f64) -> Option<WaitViolation> {
    (wait > tolerance).then(|| WaitViolation {
        wait,
        penalty: (wait / tolerance).floor() * PENALTY_PER_TOLERANCE,
    })
}

/// One walk-in customer.
///
/// Dish preferences are drawn once, when the customer is created, and are
/// never re-rolled.
#[derive(Clone, Debug)]
pub struct Customer {
    id:           CustomerId,
    /// Entry time of the current stage.
    arrival_time: SimTime,
    rating:       f64,
    dish_wanted:  DishSet,
    obtained:     DishSet,
}

impl Customer {
    pub fn new(id: CustomerId, now: SimTime, dish_wanted: DishSet) -> Self {
        Self {
            id,
            arrival_time: now,
            rating: INITIAL_RATING,
            dish_wanted,
            obtained: DishSet::EMPTY,
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// The rating floored at zero.  Only the clamped aggregate uses this.
    pub fn clamped_rating(&self) -> f64 {
        self.rating.max(0.0)
    }

    pub fn dish_wanted(&self) -> DishSet {
        self.dish_wanted
    }

    pub fn obtained(&self) -> DishSet {
        self.obtained
    }

    /// `true` if the customer wanted at least one dish at creation.
    pub fn wants_any(&self) -> bool {
        !self.dish_wanted.is_empty()
    }

    /// Wanted dishes not yet obtained, in station-index order.
    pub fn remaining(&self) -> Vec<Dish> {
        self.dish_wanted.difference(&self.obtained)
    }

    /// Dishes still owed to the customer.
    pub fn dishes_owed(&self) -> usize {
        self.remaining().len()
    }

    /// Reset the stage clock on entering a new stage.
    pub fn enter_stage(&mut self, now: SimTime) {
        self.arrival_time = now;
    }

    /// Record that `dish` was served.
    ///
    /// Serving an unwanted dish, or the same dish twice, breaks the routing
    /// invariant and aborts the run.
    pub fn mark_obtained(&mut self, dish: Dish) -> SimResult<()> {
        if !self.dish_wanted.contains(dish) {
            return Err(SimError::Invariant(format!(
                "{} served {dish}, which it never wanted",
                self.id
            )));
        }
        if !self.obtained.insert(dish) {
            return Err(SimError::Invariant(format!("{} served {dish} twice", self.id)));
        }
        Ok(())
    }

    /// Close the current stage at `now` and apply the wait penalty if the
    /// stage took longer than `tolerance`.
    pub fn finish_stage(&mut self, now: SimTime, tolerance: f64) -> Option<WaitViolation> {
        let violation = wait_penalty(now.since(self.arrival_time), tolerance)?;
        self.rating -= violation.penalty;
        Some(violation)
    }
}
