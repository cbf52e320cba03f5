//! Primary sample space Metropolis light transport (PSSMLT) bookkeeping.
//!
//! The sampler records every random number a trace consumed. Accepted
//! numbers become the state of the Markov chain; the next proposal
//! perturbs each of them by a small uniform step with wraparound into
//! `[0, 1)`. Dimensions the chain has never accepted are drawn fresh.
//!
//! A chain iteration looks like:
//!
//! ```ignore
//! sampler.start_iteration();
//! let paths = pathtrace(&scene, &mut sampler, &config);
//! if success(&paths) { sampler.accept() } else { sampler.reject() }
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::NextFloat;

/// Default half-width of the small-step mutation.
pub const DEFAULT_STEP_SIZE: f64 = 0.1;

const PSSMLT_SEED: u64 = 123;

/// One dimension of the primary sample vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimarySample {
    /// Value of the current chain state
    pub v: f64,
    /// Value handed out during the current proposal
    pub m: f64,
    /// True once the dimension has been part of an accepted state
    pub accepted: bool,
}

/// Primary sample space Metropolis sampler.
#[derive(Debug, Clone)]
pub struct Pssmlt {
    prng: StdRng,
    pub step_size: f64,
    samples: Vec<PrimarySample>,
    index: usize,
    mutating: bool,
}

impl Default for Pssmlt {
    fn default() -> Self {
        Self::new()
    }
}

impl Pssmlt {
    pub fn new() -> Self {
        Self::with_seed(PSSMLT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            prng: StdRng::seed_from_u64(seed),
            step_size: DEFAULT_STEP_SIZE,
            samples: Vec::new(),
            index: 0,
            mutating: false,
        }
    }

    /// Replace the chain state with the given values.
    ///
    /// The next pass replays them unchanged until a mutation is requested
    /// with [`Pssmlt::start_iteration`].
    pub fn seed(&mut self, values: &[f64]) {
        self.samples = values
            .iter()
            .map(|&v| PrimarySample {
                v,
                m: v,
                accepted: true,
            })
            .collect();
        self.index = 0;
        self.mutating = false;
    }

    /// Rewind the cursor and request a small-step mutation of the
    /// accepted state for the coming pass.
    pub fn start_iteration(&mut self) {
        self.index = 0;
        self.mutating = true;
    }

    /// Commit the current proposal as the new chain state.
    pub fn accept(&mut self) {
        for sample in &mut self.samples {
            sample.v = sample.m;
            sample.accepted = true;
        }
        self.index = 0;
        self.mutating = false;
    }

    /// Discard the current proposal. The chain state is kept for replay.
    pub fn reject(&mut self) {
        self.index = 0;
    }

    /// Naive acceptance coin flip.
    ///
    /// This ignores the contribution ratio and is therefore not a valid
    /// Metropolis-Hastings test; it only drives demonstration chains.
    pub fn random_accept(&mut self) -> bool {
        self.prng.next_float() > 0.5
    }

    /// The recorded primary sample vector.
    pub fn samples(&self) -> &[PrimarySample] {
        &self.samples
    }

    /// Number of dimensions consumed in the current pass.
    pub fn index(&self) -> usize {
        self.index
    }

    fn mutate(&mut self, v: f64) -> f64 {
        wrap_unit(v + self.step_size * (2.0 * self.prng.next_float() - 1.0))
    }
}

/// Wrap `x` into `[0, 1)`.
fn wrap_unit(x: f64) -> f64 {
    let m = x.rem_euclid(1.0);
    // Tiny negative inputs round up to exactly 1
    if m < 1.0 {
        m
    } else {
        0.0
    }
}

impl NextFloat for Pssmlt {
    fn next_float(&mut self) -> f64 {
        let index = self.index;
        self.index += 1;

        let Some(sample) = self.samples.get(index).copied() else {
            let m = self.prng.next_float();
            self.samples.push(PrimarySample {
                v: m,
                m,
                accepted: false,
            });
            return m;
        };

        let m = match (sample.accepted, self.mutating) {
            (true, true) => self.mutate(sample.v),
            (true, false) => sample.v,
            (false, _) => self.prng.next_float(),
        };
        self.samples[index].m = m;
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_values_replay_exactly() {
        let mut pssmlt = Pssmlt::new();
        pssmlt.seed(&[0.6, 0.3]);
        pssmlt.accept();

        assert_eq!(pssmlt.next_float(), 0.6);
        assert_eq!(pssmlt.next_float(), 0.3);
    }

    #[test]
    fn test_fresh_dimensions_are_appended() {
        let mut pssmlt = Pssmlt::new();
        pssmlt.seed(&[0.6]);

        assert_eq!(pssmlt.next_float(), 0.6);
        let fresh = pssmlt.next_float();
        assert!((0.0..1.0).contains(&fresh));

        assert_eq!(pssmlt.samples().len(), 2);
        assert!(!pssmlt.samples()[1].accepted);
        assert_eq!(pssmlt.index(), 2);
    }

    #[test]
    fn test_mutation_is_small_step_with_wraparound() {
        let mut pssmlt = Pssmlt::new();
        pssmlt.step_size = 0.05;
        let state = [0.5, 0.01, 0.99];
        pssmlt.seed(&state);

        for _ in 0..100 {
            pssmlt.start_iteration();
            for &v in &state {
                let m = pssmlt.next_float();
                assert!((0.0..1.0).contains(&m));

                // Distance on the unit circle
                let d = (m - v).abs();
                assert!(d.min(1.0 - d) <= 0.05 + 1e-12);
            }
            pssmlt.reject();
        }
    }

    #[test]
    fn test_wrap_unit_stays_half_open() {
        assert_eq!(wrap_unit(1.0), 0.0);
        assert_eq!(wrap_unit(0.25), 0.25);
        assert!((wrap_unit(2.3) - 0.3).abs() < 1e-12);
        assert!((wrap_unit(-1.75) - 0.25).abs() < 1e-12);
        assert!(wrap_unit(-1e-17) < 1.0);
    }

    #[test]
    fn test_large_steps_stay_in_unit_interval() {
        let mut pssmlt = Pssmlt::new();
        pssmlt.step_size = 2.5;
        pssmlt.seed(&[0.5, 0.0, 0.999]);

        for _ in 0..1000 {
            pssmlt.start_iteration();
            for _ in 0..3 {
                let m = pssmlt.next_float();
                assert!((0.0..1.0).contains(&m), "{} escaped [0, 1)", m);
            }
            pssmlt.accept();
        }
    }

    #[test]
    fn test_reject_keeps_chain_state() {
        let mut pssmlt = Pssmlt::new();
        pssmlt.seed(&[0.25, 0.75]);

        pssmlt.start_iteration();
        let proposal = [pssmlt.next_float(), pssmlt.next_float()];
        assert_ne!(proposal, [0.25, 0.75]);
        pssmlt.reject();

        let state: Vec<_> = pssmlt.samples().iter().map(|s| s.v).collect();
        assert_eq!(state, vec![0.25, 0.75]);
    }

    #[test]
    fn test_accept_commits_proposal() {
        let mut pssmlt = Pssmlt::new();
        pssmlt.seed(&[0.25, 0.75]);

        pssmlt.start_iteration();
        let proposal = [pssmlt.next_float(), pssmlt.next_float()];
        pssmlt.accept();

        assert_eq!(pssmlt.next_float(), proposal[0]);
        assert_eq!(pssmlt.next_float(), proposal[1]);
    }

    #[test]
    fn test_unaccepted_dimensions_are_redrawn() {
        let mut pssmlt = Pssmlt::new();
        let first = pssmlt.next_float();
        pssmlt.reject();

        pssmlt.start_iteration();
        let second = pssmlt.next_float();
        assert_ne!(first, second);
    }

    #[test]
    fn test_random_accept_is_a_fair_coin() {
        let mut pssmlt = Pssmlt::new();
        let accepted = (0..10_000).filter(|_| pssmlt.random_accept()).count();
        assert!((4_500..5_500).contains(&accepted));
    }
}
