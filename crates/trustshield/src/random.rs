//! Injectable randomness for reward ranges and stochastic checks.
//!
//! Every randomized outcome in the engine is drawn through [`RandomSource`],
//! so tests can pin draws to a bound or replay a seed.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[min, max]`, both inclusive.
    fn range(&self, min: i32, max: i32) -> i32;

    /// `true` with the given probability.
    fn chance(&self, probability: f64) -> bool;
}

fn bounded_probability(probability: f64) -> Option<f64> {
    if probability.is_nan() {
        None
    } else {
        Some(probability.clamp(0.0, 1.0))
    }
}

/// Thread-local RNG; the production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn range(&self, min: i32, max: i32) -> i32 {
        let (lo, hi) = ordered(min, max);
        rand::thread_rng().gen_range(lo..=hi)
    }

    fn chance(&self, probability: f64) -> bool {
        match bounded_probability(probability) {
            Some(p) => rand::thread_rng().gen_bool(p),
            None => false,
        }
    }
}

/// Deterministic RNG for reproducible runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn range(&self, min: i32, max: i32) -> i32 {
        let (lo, hi) = ordered(min, max);
        self.rng.lock().gen_range(lo..=hi)
    }

    fn chance(&self, probability: f64) -> bool {
        match bounded_probability(probability) {
            Some(p) => self.rng.lock().gen_bool(p),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pin {
    Low,
    High,
}

/// Always draws the same end of every range and a fixed chance outcome.
#[derive(Debug, Clone, Copy)]
pub struct PinnedRandom {
    pin: Pin,
    chance: bool,
}

impl PinnedRandom {
    pub fn low() -> Self {
        Self {
            pin: Pin::Low,
            chance: true,
        }
    }

    pub fn high() -> Self {
        Self {
            pin: Pin::High,
            chance: true,
        }
    }

    pub fn with_chance(mut self, outcome: bool) -> Self {
        self.chance = outcome;
        self
    }
}

impl RandomSource for PinnedRandom {
    fn range(&self, min: i32, max: i32) -> i32 {
        let (lo, hi) = ordered(min, max);
        match self.pin {
            Pin::Low => lo,
            Pin::High => hi,
        }
    }

    fn chance(&self, _probability: f64) -> bool {
        self.chance
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Inclusive integer range a score delta is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeltaRange {
    pub min: i32,
    pub max: i32,
}

impl DeltaRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Same range with `min <= max`.
    pub fn normalized(self) -> Self {
        let (min, max) = ordered(self.min, self.max);
        Self { min, max }
    }

    pub fn draw(&self, rng: &dyn RandomSource) -> i32 {
        let range = self.normalized();
        rng.range(range.min, range.max)
    }

    pub fn contains(&self, value: i32) -> bool {
        let range = self.normalized();
        (range.min..=range.max).contains(&value)
    }
}
