//! Deterministic random number generation.
//!
//! RULE: Nothing in the pipeline may call any platform RNG.
//! Cost perturbation draws from a CostRng created locally from an
//! explicit seed, so there is no hidden global generator state.
//! Draws are consumed strictly in input row order.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A seeded, deterministic RNG owned by a single derivation call.
pub struct CostRng {
    inner: Pcg64Mcg,
}

impl CostRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float uniformly in [-bound, +bound).
    /// A bound of zero always yields exactly 0.0 but still consumes a draw.
    pub fn symmetric(&mut self, bound: f64) -> f64 {
        let u = self.next_f64();
        if bound == 0.0 {
            return 0.0;
        }
        -bound + u * (2.0 * bound)
    }
}
