//! Seeded random source for reproducible matrix generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic stream of floats in `[0, 1)` derived from a single seed.
///
/// Every draw of a generation run goes through one `RandomSource`, in order.
/// Same seed and same sequence of calls always yield the same values.
#[derive(Debug, Clone)]
pub struct RandomSource {
    /// Seed this stream was created from
    seed: u64,

    /// Underlying generator
    rng: ChaCha8Rng,

    /// Number of values drawn so far
    draws: u64,
}

impl RandomSource {
    /// Creates a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Next value in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen::<f64>()
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.random() < p
    }

    /// Roulette-wheel selection. Returns the index of the chosen weight.
    ///
    /// Consumes exactly one draw for any non-empty input.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: f64 = weights.iter().sum();
        let target = self.random() * total;

        let mut cumulative = 0.0;
        for (i, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if target < cumulative {
                return Some(i);
            }
        }
        // Float rounding can leave target == total
        Some(weights.len() - 1)
    }
}
