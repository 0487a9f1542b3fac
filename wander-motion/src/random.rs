//! Seed-reproducible random source backing every strategy.
//!
//! A 32-bit linear-congruential generator keeps the sequence portable across
//! runs: the same seed always yields the same uniform and Gaussian draws.

use std::f64::consts::TAU;

use crate::constants::{LCG_INCREMENT, LCG_MODULUS, LCG_MULTIPLIER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    seed: u32,
    state: u32,
}

impl SeededRandom {
    /// Create a generator. `None` draws a fresh seed from the thread RNG; the
    /// chosen value is still available through [`SeededRandom::seed`].
    #[must_use]
    pub fn new(seed: Option<u32>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u32>);
        Self { seed, state: seed }
    }

    /// Seed the sequence started from.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        f64::from(self.state) / LCG_MODULUS
    }

    /// Uniform sample in `[min, max)`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Standard-normal sample via Box–Muller.
    pub fn gaussian(&mut self) -> f64 {
        let u = self.nonzero();
        let v = self.nonzero();
        (-2.0 * u.ln()).sqrt() * (TAU * v).cos()
    }

    fn nonzero(&mut self) -> f64 {
        loop {
            let draw = self.next_f64();
            if draw > 0.0 {
                return draw;
            }
        }
    }
}
