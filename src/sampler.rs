//! Uniform random index sampling for minimal sets.

use rand::distributions::Uniform;
use rand::prelude::*;

/// Draws minimal samples of point indices uniformly, without replacement.
///
/// By default the generator is seeded from thread entropy; a fixed seed
/// makes every draw sequence reproducible.
pub struct UniformSampler {
    rng: StdRng,
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSampler {
    /// Construct with a random seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(thread_rng()).expect("failed to seed StdRng"),
        }
    }

    /// Construct from a fixed seed for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fill `out` with distinct indices drawn uniformly from `[0, n)`.
    ///
    /// Returns `false` when no valid sample exists (`out` larger than the
    /// index range, or an empty request).
    pub fn sample_unique(&mut self, out: &mut [usize], n: usize) -> bool {
        if out.is_empty() || out.len() > n {
            return false;
        }
        let dist = Uniform::new(0, n);
        for i in 0..out.len() {
            // Rejection loop; fine for the small samples of minimal solvers.
            loop {
                let candidate = self.rng.sample(dist);
                if out[..i].iter().all(|&v| v != candidate) {
                    out[i] = candidate;
                    break;
                }
            }
        }
        true
    }
}
