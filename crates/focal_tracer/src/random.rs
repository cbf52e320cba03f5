//! Random number sources for the samplers.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Seed of the fallback PRNG of [`FakeRandom::new`].
const FAKE_RANDOM_SEED: u64 = 1234;

/// A source of uniform random numbers in `[0, 1)`.
///
/// Every sampler draws its randomness through this trait, one number per
/// sampled dimension, so that callers can substitute stratified, replayed
/// or Markov-chain driven sequences.
pub trait NextFloat {
    fn next_float(&mut self) -> f64;
}

impl<R: RngCore> NextFloat for R {
    #[inline]
    fn next_float(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Stratifies the first dimension of every sample.
///
/// Sample `i` of `count` starts with `i / (count - 1)`; all further
/// dimensions come from the wrapped PRNG. Call [`StratifiedRandom::start`]
/// before drawing each sample.
#[derive(Debug, Clone)]
pub struct StratifiedRandom<R = StdRng> {
    pub prng: R,
    pub count: usize,
    dim: usize,
    index: usize,
    next_index: usize,
}

impl<R: RngCore> StratifiedRandom<R> {
    pub fn new(prng: R, count: usize) -> Self {
        Self {
            prng,
            count,
            dim: 0,
            index: 0,
            next_index: 0,
        }
    }

    /// Begin the next stratum.
    pub fn start(&mut self) {
        self.dim = 0;
        self.index = self.next_index;
        self.next_index += 1;
    }
}

impl StratifiedRandom<StdRng> {
    pub fn seeded(seed: u64, count: usize) -> Self {
        Self::new(StdRng::seed_from_u64(seed), count)
    }
}

impl<R: RngCore> NextFloat for StratifiedRandom<R> {
    fn next_float(&mut self) -> f64 {
        let dim = self.dim;
        self.dim += 1;
        if dim == 0 {
            return self.index as f64 / (self.count as f64 - 1.0);
        }
        self.prng.next_float()
    }
}

/// Replays a fixed prefix, then falls back to a PRNG.
///
/// Used to reproduce hand-picked example paths.
#[derive(Debug, Clone)]
pub struct FakeRandom<R = StdRng> {
    pub initial: Vec<f64>,
    pub prng: R,
    dim: usize,
}

impl FakeRandom<StdRng> {
    pub fn new(initial: Vec<f64>) -> Self {
        Self::with_rng(initial, StdRng::seed_from_u64(FAKE_RANDOM_SEED))
    }
}

impl<R: RngCore> FakeRandom<R> {
    pub fn with_rng(initial: Vec<f64>, prng: R) -> Self {
        Self {
            initial,
            prng,
            dim: 0,
        }
    }

    /// Rewind to the start of the fixed prefix.
    pub fn restart(&mut self) {
        self.dim = 0;
    }
}

impl<R: RngCore> NextFloat for FakeRandom<R> {
    fn next_float(&mut self) -> f64 {
        if let Some(&value) = self.initial.get(self.dim) {
            self.dim += 1;
            return value;
        }
        self.prng.next_float()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_next_float_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let u = rng.next_float();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_stratified_first_dimension() {
        let mut rng = StratifiedRandom::seeded(7, 5);

        let mut firsts = Vec::new();
        for _ in 0..5 {
            rng.start();
            firsts.push(rng.next_float());
            // Later dimensions are pseudo-random
            let u = rng.next_float();
            assert!((0.0..1.0).contains(&u));
        }

        assert_eq!(firsts, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_fake_random_replays_prefix() {
        let mut rng = FakeRandom::new(vec![0.9, 0.2, 0.05]);
        assert_eq!(rng.next_float(), 0.9);
        assert_eq!(rng.next_float(), 0.2);
        assert_eq!(rng.next_float(), 0.05);

        let fallback = rng.next_float();
        assert!((0.0..1.0).contains(&fallback));

        rng.restart();
        assert_eq!(rng.next_float(), 0.9);
    }

    #[test]
    fn test_fake_random_fallback_is_deterministic() {
        let mut a = FakeRandom::new(vec![]);
        let mut b = FakeRandom::new(vec![]);
        for _ in 0..10 {
            assert_eq!(a.next_float(), b.next_float());
        }
    }

    #[test]
    fn test_dyn_next_float() {
        let mut rng = StdRng::seed_from_u64(1);
        let source: &mut dyn NextFloat = &mut rng;
        assert!(source.next_float() < 1.0);
    }
}
