//! Discrete sampling driven by an explicit [`RandomEngine`].
//!
//! - [`RandomEngine`]: seedable ChaCha8 state; the only entropy source here.
//! - [`TreeSampler`]: sum-tree over weights, O(log n) draws, supports removal.
//! - [`AliasSampler`]: Walker/Vose alias table, O(1) draws with replacement.
//! - [`choice`], [`choice_n`], [`uniform_choice`]: buffer-level entry points,
//!   also bundled with a config in [`Sampler`].
//!
//! Every draw mutates engine state, so engines are passed as `&mut`. Give each
//! thread its own engine (or use [`RandomEngine::with_thread_local`]) to keep
//! runs reproducible under a fixed seed.

mod alias_sampler;
mod choice;
mod tree_sampler;

pub use alias_sampler::AliasSampler;
pub use choice::{
    choice, choice_n, choice_n_in, choice_n_into, choice_slice, uniform_choice,
    uniform_choice_in, uniform_choice_into, uniform_choice_into_with, IdDType, Sampler,
};
pub use tree_sampler::TreeSampler;

use crate::buffer::WeightType;
use crate::error::{Error, Result};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

/// Pseudo-random state shared by all sampling operations of one call site.
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: ChaCha8Rng,
}

thread_local! {
    static THREAD_ENGINE: RefCell<RandomEngine> = RefCell::new(RandomEngine::from_os_rng());
}

impl RandomEngine {
    /// Deterministic engine for a seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Engine seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
        }
    }

    /// Resets the state as if freshly created with `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Uniform integer in `[0, upper)`.
    ///
    /// # Panics
    /// Panics if `upper == 0`.
    #[inline]
    pub fn rand_int(&mut self, upper: usize) -> usize {
        assert!(upper > 0, "rand_int upper bound must be positive");
        self.rng.random_range(0..upper)
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn uniform_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Runs `f` with this thread's engine.
    ///
    /// # Panics
    /// Panics if called re-entrantly from inside `f`.
    pub fn with_thread_local<R>(f: impl FnOnce(&mut RandomEngine) -> R) -> R {
        THREAD_ENGINE.with(|engine| f(&mut engine.borrow_mut()))
    }

    /// Reseeds this thread's engine.
    pub fn seed_thread_local(seed: u64) {
        Self::with_thread_local(|engine| engine.reseed(seed));
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl RngCore for RandomEngine {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.rng.fill_bytes(dst);
    }
}

/// A reusable weighted sampler over `[0, n)`.
pub trait DiscreteSampler {
    /// Draws one index, or `None` once the population is exhausted.
    fn draw(&mut self, rng: &mut RandomEngine) -> Option<usize>;

    /// Size of the population the sampler was built over.
    fn population(&self) -> usize;
}

/// Checks a categorical weight array and returns its total as `f64`.
///
/// Rejects empty arrays, negative or non-finite weights and a zero total.
pub(crate) fn validate_weights<F: WeightType>(weights: &[F]) -> Result<f64> {
    if weights.is_empty() {
        return Err(Error::invalid_weights("population is empty"));
    }
    let mut total = 0.0f64;
    for (i, w) in weights.iter().enumerate() {
        let w = w.to_f64().unwrap_or(f64::NAN);
        if !w.is_finite() {
            return Err(Error::invalid_weights(format!("weight {i} is not finite")));
        }
        if w < 0.0 {
            return Err(Error::invalid_weights(format!("weight {i} is negative ({w})")));
        }
        total += w;
    }
    if total <= 0.0 {
        return Err(Error::invalid_weights("weights sum to zero"));
    }
    Ok(total)
}
