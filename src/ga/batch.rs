//! Independent multi-seed runs.

use super::population::Population;
use super::runner::{Ga, GaState};
use super::types::Gene;
use crate::error::{GaError, Result};
use log::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs one orchestrator per seed to completion and collects the final
/// populations, in seed order.
///
/// `build` constructs a fresh orchestrator for a seed. If it comes back
/// [`GaState::Uninitialized`], its population is set up from the configured
/// generator. Runs share nothing, so with the `parallel` feature they execute
/// on the rayon thread pool; the result is identical either way.
///
/// A failing run yields its error in place and does not affect the others.
pub fn run_many<G, P, F>(seeds: &[u64], build: F) -> Vec<Result<Population<G, P>>>
where
    G: Gene,
    P: Clone + Send + 'static,
    F: Fn(u64) -> Result<Ga<G, P>> + Sync,
{
    info!("starting {} independent runs", seeds.len());

    #[cfg(feature = "parallel")]
    let results = seeds
        .par_iter()
        .map(|&seed| run_one(seed, &build))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results = seeds.iter().map(|&seed| run_one(seed, &build)).collect();

    results
}

fn run_one<G, P, F>(seed: u64, build: &F) -> Result<Population<G, P>>
where
    G: Gene,
    P: Clone + Send + 'static,
    F: Fn(u64) -> Result<Ga<G, P>>,
{
    let mut ga = build(seed)?;
    if ga.state() == GaState::Uninitialized {
        ga.setup_population(None)?;
    }
    ga.run()?;
    ga.reset().ok_or_else(|| {
        GaError::Configuration(format!("run with seed {seed} ended without a population"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{CmConfig, IdentityCodec, MaxGenerations, RandomGenerator, SegmentSwapCm};

    fn build(seed: u64) -> Result<Ga<bool, Vec<bool>>> {
        let cm = SegmentSwapCm::new(CmConfig::default().with_mutate_rate(0.05).with_seed(seed))?;
        Ok(Ga::new(cm)
            .with_codec(IdentityCodec)
            .with_generator(RandomGenerator::new(8, 12, Some(seed))?)
            .with_iter_plugin(MaxGenerations::new(5)))
    }

    fn genes(pop: &Population<bool, Vec<bool>>) -> Vec<Vec<bool>> {
        pop.individuals().iter().map(|i| i.genes().to_vec()).collect()
    }

    #[test]
    fn test_runs_every_seed() {
        let results = run_many(&[1, 2, 3], build);
        assert_eq!(results.len(), 3);
        for result in &results {
            let pop = result.as_ref().unwrap();
            assert_eq!(pop.generation(), 5);
            assert_eq!(pop.len(), 8);
            assert!(!pop.is_bound());
        }
    }

    #[test]
    fn test_matches_single_runs() {
        let seeds = [10, 20, 30, 40];
        let batch = run_many(&seeds, build);
        for (seed, result) in seeds.iter().zip(&batch) {
            let single = run_one(*seed, &build).unwrap();
            assert_eq!(genes(result.as_ref().unwrap()), genes(&single));
        }
    }

    #[test]
    fn test_failure_is_isolated() {
        let results = run_many(&[1, 2, 3], |seed| {
            if seed == 2 {
                Err(GaError::Configuration("bad seed".into()))
            } else {
                build(seed)
            }
        });
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(GaError::Configuration(_))));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_empty_seeds() {
        assert!(run_many(&[], build).is_empty());
    }
}
