//! Built-in population generator.

use super::plugins::GeneratePlugin;
use super::population::Population;
use super::types::{Gene, Individual};
use crate::error::{GaError, Result};
use crate::random::rng_from_option;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Fills a population with uniformly random genotypes.
///
/// Each call to [`generate`](GeneratePlugin::generate) continues the same
/// RNG stream, so consecutive populations differ while a seeded generator
/// stays reproducible across processes.
#[derive(Debug, Clone)]
pub struct RandomGenerator<R = StdRng> {
    size: usize,
    genotype_len: usize,
    rng: R,
}

impl RandomGenerator<StdRng> {
    /// # Errors
    /// [`GaError::Configuration`] if `size < 2` or `genotype_len == 0`.
    pub fn new(size: usize, genotype_len: usize, seed: Option<u64>) -> Result<Self> {
        Self::with_rng(size, genotype_len, rng_from_option(seed))
    }
}

impl<R: Rng> RandomGenerator<R> {
    /// Same as [`RandomGenerator::new`] with an explicit RNG.
    pub fn with_rng(size: usize, genotype_len: usize, rng: R) -> Result<Self> {
        if size < 2 {
            return Err(GaError::Configuration(format!(
                "population size must be at least 2, got {size}"
            )));
        }
        if genotype_len == 0 {
            return Err(GaError::Configuration(
                "genotype length must be at least 1".into(),
            ));
        }
        Ok(Self {
            size,
            genotype_len,
            rng,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn genotype_len(&self) -> usize {
        self.genotype_len
    }
}

impl<G, P, R> GeneratePlugin<G, P> for RandomGenerator<R>
where
    G: Gene,
    P: Clone + Send + 'static,
    R: Rng + Send,
{
    fn generate(&mut self) -> Result<Population<G, P>> {
        let mut individuals = Vec::with_capacity(self.size);
        for _ in 0..self.size {
            let mut genes = Vec::with_capacity(self.genotype_len);
            for _ in 0..self.genotype_len {
                genes.push(G::random(&mut self.rng));
            }
            individuals.push(Individual::from_genes(genes)?);
        }
        debug!(
            "generated {} random genotypes of length {}",
            self.size, self.genotype_len
        );
        Population::new(individuals)
    }
}
