//! Deterministic random-variate source.
//!
//! # Determinism strategy
//!
//! A run owns exactly one `SimRng`, seeded from the run seed.  Flows execute
//! one at a time in scheduler order, so the sequence of draws (and therefore
//! every sampled duration and preference) is fixed by the seed and the
//! configuration alone.
//!
//! `SmallRng` is the 64-bit Xoshiro256++ generator on 64-bit targets, so a
//! seed reproduces the same stream across runs on the same platform.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::{CoreError, CoreResult, DISH_COUNT, DishSet};

/// Simulation-level RNG: exponential durations, Bernoulli preferences, and
/// uniform routing choices.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with other `rand` distributions.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Draw an exponentially distributed duration with the given `rate`
    /// (events per minute).  Mean is `1 / rate`.
    ///
    /// Rates are validated at startup, so a non-positive or non-finite rate
    /// here is an invariant violation.
    pub fn exp(&mut self, rate: f64) -> CoreResult<f64> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(CoreError::Invariant(format!(
                "exponential rate must be finite and positive, got {rate}"
            )));
        }
        let dist = Exp::new(rate)
            .map_err(|e| CoreError::Invariant(format!("exponential rate {rate}: {e:?}")))?;
        Ok(dist.sample(&mut self.0))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// One independent Bernoulli draw per dish, in `Dish::ALL` order.
    pub fn dish_preferences(&mut self, probabilities: &[f64; DISH_COUNT]) -> DishSet {
        let mut wanted = [false; DISH_COUNT];
        for (slot, &p) in wanted.iter_mut().zip(probabilities) {
            *slot = self.gen_bool(p);
        }
        DishSet::from_flags(wanted)
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
