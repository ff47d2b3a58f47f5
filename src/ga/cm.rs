//! Crossover/mutation strategies.
//!
//! [`CmPlugin`] is the variation contract a population is bound to.
//! [`SegmentSwapCm`] is the built-in implementation: segment-swap crossover
//! over a sampled, even-sized subset of the population, followed by
//! per-gene flip mutation.

use super::config::CmConfig;
use super::operators::{crossover_count, draw_segment, flip_mutation, pair_mut, swap_segment};
use super::types::{Gene, Individual};
use crate::error::{GaError, Result};
use crate::random::rng_from_option;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

/// Variation operators applied to a population once per generation.
///
/// Implementations own their randomness, so a run is reproducible given the
/// plugin's seed.
pub trait CmPlugin<G, P>: Send {
    /// Recombines individuals in place.
    ///
    /// # Errors
    /// Must return [`GaError::InsufficientPopulation`] for fewer than two
    /// individuals and [`GaError::GenotypeLength`] when genotype lengths
    /// differ.
    fn crossover(&mut self, individuals: &mut [Individual<G, P>]) -> Result<()>;

    /// Mutates one individual in place.
    fn mutate(&mut self, individual: &mut Individual<G, P>) -> Result<()>;

    fn name(&self) -> &str {
        "cm"
    }
}

/// Segment-swap crossover with per-gene flip mutation.
///
/// # Crossover
///
/// 1. Sample [`crossover_count`] distinct individuals
/// 2. Pair them in sampling order (1st with 2nd, 3rd with 4th, ...)
/// 3. For each pair, swap one random segment ([`draw_segment`])
///
/// Individuals not sampled are left untouched for the generation.
///
/// # Mutation
///
/// Each gene flips independently with probability `mutate_rate`.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::{CmConfig, CmPlugin, Individual, SegmentSwapCm};
///
/// let config = CmConfig::default().with_mutate_rate(1.0).with_seed(42);
/// let mut cm = SegmentSwapCm::new(config).unwrap();
///
/// let mut ind: Individual<bool, ()> = Individual::from_genes(vec![true, false]).unwrap();
/// CmPlugin::<bool, ()>::mutate(&mut cm, &mut ind).unwrap();
/// assert_eq!(ind.genes(), &[false, true]);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentSwapCm<R = StdRng> {
    config: CmConfig,
    rng: R,
}

impl SegmentSwapCm<StdRng> {
    /// Creates the plugin, seeding its RNG from `config.seed`.
    ///
    /// # Errors
    /// Returns [`GaError::Configuration`] if a rate is outside `[0, 1]`.
    pub fn new(config: CmConfig) -> Result<Self> {
        config.validate()?;
        let rng = rng_from_option(config.seed);
        Ok(Self { config, rng })
    }
}

impl<R: Rng> SegmentSwapCm<R> {
    /// Creates the plugin with an explicit RNG. `config.seed` is ignored.
    ///
    /// # Errors
    /// Returns [`GaError::Configuration`] if a rate is outside `[0, 1]`.
    pub fn with_rng(config: CmConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &CmConfig {
        &self.config
    }
}

impl<G: Gene, P, R: Rng + Send> CmPlugin<G, P> for SegmentSwapCm<R> {
    fn crossover(&mut self, individuals: &mut [Individual<G, P>]) -> Result<()> {
        let n = individuals.len();
        if n < 2 {
            return Err(GaError::InsufficientPopulation {
                required: 2,
                actual: n,
            });
        }
        let len = individuals[0].len();
        if let Some(odd) = individuals.iter().find(|ind| ind.len() != len) {
            return Err(GaError::GenotypeLength {
                expected: len,
                actual: odd.len(),
            });
        }

        let count = crossover_count(n, self.config.crossover_rate);
        let chosen = index::sample(&mut self.rng, n, count).into_vec();

        for pair in chosen.chunks_exact(2) {
            let (start, end) = draw_segment(len, &mut self.rng);
            let (a, b) = pair_mut(individuals, pair[0], pair[1]);
            swap_segment(a, b, start, end);
        }
        debug!("crossover: {} pairs out of {} individuals", count / 2, n);
        Ok(())
    }

    fn mutate(&mut self, individual: &mut Individual<G, P>) -> Result<()> {
        flip_mutation(individual, self.config.mutate_rate, &mut self.rng);
        Ok(())
    }

    fn name(&self) -> &str {
        "segment_swap"
    }
}
