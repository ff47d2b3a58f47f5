//! GA orchestrator.
//!
//! [`Ga`] binds the strategy plugins to a population and drives it one
//! generation at a time:
//!
//! ```text
//! Uninitialized ──setup_population──▶ PopulationReady ──next──▶ Iterating
//!                                                                 │
//!                                  IterControl::Stop ◀────────────┤
//!                                        ▼                        ▼ error
//!                                     Stopped                   Failed
//! ```
//!
//! [`reset`](Ga::reset) returns to `Uninitialized` from any state.

use super::cm::CmPlugin;
use super::plugins::{
    CodecPlugin, GeneratePlugin, IterControl, IterPlugin, ParamHandle, Selector, SharedCodec,
};
use super::population::{decode, Population};
use super::types::{Gene, Genotype, Phenotype};
use crate::error::{GaError, Result};
use log::{debug, error, info};
use std::sync::Arc;

/// Lifecycle state of a [`Ga`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GaState {
    /// No population yet.
    Uninitialized,
    /// Population bound, no generation run yet.
    PopulationReady,
    /// At least one generation completed, not stopped.
    Iterating,
    /// An iteration plugin ended the run. Terminal until reset.
    Stopped,
    /// A population step or plugin returned an error. Terminal until reset.
    Failed,
}

/// Genetic-algorithm orchestrator.
///
/// # Usage
///
/// ```
/// use u_evolve::ga::{CmConfig, Ga, GaState, IdentityCodec, MaxGenerations, RandomGenerator, SegmentSwapCm};
///
/// let cm = SegmentSwapCm::new(CmConfig::default().with_seed(42)).unwrap();
/// let mut ga = Ga::<bool, Vec<bool>>::new(cm)
///     .with_codec(IdentityCodec)
///     .with_generator(RandomGenerator::new(20, 16, Some(7)).unwrap())
///     .with_iter_plugin(MaxGenerations::new(10));
///
/// ga.setup_population(None).unwrap();
/// assert_eq!(ga.run().unwrap(), GaState::Stopped);
/// assert_eq!(ga.generation(), 10);
/// ```
pub struct Ga<G, P> {
    state: GaState,
    cm: Option<Box<dyn CmPlugin<G, P>>>,
    codecs: Vec<SharedCodec<G, P>>,
    selector: Option<Box<dyn Selector<G, P>>>,
    generator: Option<Box<dyn GeneratePlugin<G, P>>>,
    iter_plugins: Vec<Box<dyn IterPlugin<G, P>>>,
    params: Option<ParamHandle>,
    population: Option<Population<G, P>>,
    last_error: Option<GaError>,
}

impl<G: Gene, P: Clone + Send + 'static> Ga<G, P> {
    /// Creates an orchestrator around a crossover/mutation plugin.
    pub fn new(cm: impl CmPlugin<G, P> + 'static) -> Self {
        Self::from_boxed(Box::new(cm))
    }

    pub fn from_boxed(cm: Box<dyn CmPlugin<G, P>>) -> Self {
        Self {
            state: GaState::Uninitialized,
            cm: Some(cm),
            codecs: Vec::new(),
            selector: None,
            generator: None,
            iter_plugins: Vec::new(),
            params: None,
            population: None,
            last_error: None,
        }
    }

    /// Appends a codec. Phenotype values follow codec registration order.
    pub fn with_codec(self, codec: impl CodecPlugin<G, P> + 'static) -> Self {
        self.with_shared_codec(Arc::new(codec))
    }

    pub fn with_shared_codec(mut self, codec: SharedCodec<G, P>) -> Self {
        self.codecs.push(codec);
        self
    }

    /// Sets the selector applied after every generation.
    pub fn with_selector(mut self, selector: impl Selector<G, P> + 'static) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    /// Sets the generator used when [`setup_population`](Self::setup_population)
    /// receives no population.
    pub fn with_generator(mut self, generator: impl GeneratePlugin<G, P> + 'static) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Appends an iteration plugin. Plugins run in registration order.
    pub fn with_iter_plugin(mut self, plugin: impl IterPlugin<G, P> + 'static) -> Self {
        self.iter_plugins.push(Box::new(plugin));
        self
    }

    /// Attaches an opaque configuration handle for plugins to read.
    pub fn with_params(mut self, params: impl Into<ParamHandle>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn state(&self) -> GaState {
        self.state
    }

    /// The current population, including after `Stopped` or `Failed`.
    pub fn population(&self) -> Option<&Population<G, P>> {
        self.population.as_ref()
    }

    /// The generation counter of the current population, or 0 without one.
    pub fn generation(&self) -> u64 {
        self.population.as_ref().map_or(0, Population::generation)
    }

    /// The error that moved the run to [`GaState::Failed`].
    pub fn last_error(&self) -> Option<&GaError> {
        self.last_error.as_ref()
    }

    pub fn params(&self) -> Option<&ParamHandle> {
        self.params.as_ref()
    }

    pub fn codecs(&self) -> &[SharedCodec<G, P>] {
        &self.codecs
    }

    /// Decodes a genotype with the configured codecs, bypassing any cache.
    ///
    /// # Errors
    /// [`GaError::Configuration`] if no codec is configured.
    pub fn decode(&self, genotype: &Genotype<G>) -> Result<Phenotype<P>> {
        decode(&self.codecs, genotype)
    }

    /// Prepares a run.
    ///
    /// Uses `population` if given, otherwise asks the generator for one, then
    /// binds the crossover/mutation plugin, codecs and selector to it.
    ///
    /// A supplied population is consumed even when setup fails. Check
    /// [`Population::is_bound`] and call [`Population::unbind`] first to
    /// hand over a population that was bound elsewhere.
    ///
    /// # Errors
    /// - [`GaError::NotReady`] outside [`GaState::Uninitialized`]
    /// - [`GaError::Configuration`] without a population and generator, or
    ///   without codecs
    /// - [`GaError::AlreadyBound`] if the supplied population is bound, or
    ///   already has a selector while one is configured here
    /// - anything the generator returns
    pub fn setup_population(&mut self, population: Option<Population<G, P>>) -> Result<()> {
        if self.state != GaState::Uninitialized {
            return Err(GaError::NotReady { state: self.state });
        }
        if self.codecs.is_empty() {
            return Err(GaError::Configuration(
                "at least one codec plugin is required".into(),
            ));
        }

        let mut population = match population {
            Some(population) => population,
            None => {
                let generator = self.generator.as_mut().ok_or_else(|| {
                    GaError::Configuration(
                        "no population supplied and no generate plugin configured".into(),
                    )
                })?;
                generator.generate()?
            }
        };
        if population.is_bound() || (self.selector.is_some() && population.has_selector()) {
            return Err(GaError::AlreadyBound);
        }

        let cm = self.cm.take().ok_or_else(|| {
            GaError::Configuration("crossover/mutation plugin is not available".into())
        })?;
        population.bind(cm, self.codecs.clone())?;
        if let Some(selector) = self.selector.take() {
            population.bind_selector(selector)?;
        }

        info!(
            "population ready: {} individuals, genotype length {}",
            population.len(),
            population.genotype_len()
        );
        self.population = Some(population);
        self.state = GaState::PopulationReady;
        for plugin in self.iter_plugins.iter_mut() {
            plugin.on_setup();
        }
        Ok(())
    }

    /// Runs one generation followed by the iteration plugin chain.
    ///
    /// Returns the resulting state: [`GaState::Iterating`] to continue or
    /// [`GaState::Stopped`] when a plugin ended the run. A stop is not an
    /// error.
    ///
    /// # Errors
    /// - [`GaError::NotReady`] unless the state is `PopulationReady` or
    ///   `Iterating`; the state is left unchanged
    /// - any error from the population step or a plugin; the state becomes
    ///   [`GaState::Failed`] and the error is kept in
    ///   [`last_error`](Self::last_error)
    pub fn next(&mut self) -> Result<GaState> {
        if !matches!(self.state, GaState::PopulationReady | GaState::Iterating) {
            return Err(GaError::NotReady { state: self.state });
        }
        let population = self
            .population
            .as_mut()
            .ok_or(GaError::NotReady { state: self.state })?;

        self.state = GaState::Iterating;
        if let Err(err) = population.iter_next() {
            return Err(self.fail(err));
        }

        let mut plugins = std::mem::take(&mut self.iter_plugins);
        let outcome = self.run_chain(&mut plugins);
        self.iter_plugins = plugins;

        match outcome {
            Ok(None) => Ok(GaState::Iterating),
            Ok(Some(plugin)) => {
                info!(
                    "stopped by `{}` after generation {}",
                    plugin,
                    self.generation()
                );
                self.state = GaState::Stopped;
                Ok(GaState::Stopped)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Calls [`next`](Self::next) until the run leaves `Iterating`.
    ///
    /// At least one iteration plugin must eventually stop the run, for
    /// instance [`MaxGenerations`](super::MaxGenerations).
    pub fn run(&mut self) -> Result<GaState> {
        loop {
            let state = self.next()?;
            if state != GaState::Iterating {
                return Ok(state);
            }
        }
    }

    /// Returns to [`GaState::Uninitialized`].
    ///
    /// Takes the strategies back from the population, resets every
    /// iteration plugin and clears the stored error. The previous
    /// population is returned unbound.
    pub fn reset(&mut self) -> Option<Population<G, P>> {
        let mut population = self.population.take();
        if let Some(bindings) = population.as_mut().and_then(Population::unbind) {
            self.cm = Some(bindings.cm);
            self.selector = bindings.selector;
        }
        for plugin in self.iter_plugins.iter_mut() {
            plugin.reset();
        }
        self.last_error = None;
        self.state = GaState::Uninitialized;
        debug!("orchestrator reset");
        population
    }

    /// Runs the chain; returns the name of the plugin that stopped it.
    fn run_chain(&self, plugins: &mut [Box<dyn IterPlugin<G, P>>]) -> Result<Option<String>> {
        for plugin in plugins.iter_mut() {
            if plugin.on_generation(self)? == IterControl::Stop {
                return Ok(Some(plugin.name().to_string()));
            }
        }
        Ok(None)
    }

    fn fail(&mut self, err: GaError) -> GaError {
        error!("run failed at generation {}: {}", self.generation(), err);
        self.state = GaState::Failed;
        self.last_error = Some(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{
        CmConfig, IdentityCodec, Individual, MaxGenerations, RandomGenerator, SegmentSwapCm,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Bits = Vec<bool>;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn cm(seed: u64) -> SegmentSwapCm {
        SegmentSwapCm::new(
            CmConfig::default()
                .with_mutate_rate(0.05)
                .with_crossover_rate(0.8)
                .with_seed(seed),
        )
        .unwrap()
    }

    fn engine(seed: u64) -> Ga<bool, Bits> {
        Ga::new(cm(seed))
            .with_codec(IdentityCodec)
            .with_generator(RandomGenerator::new(10, 12, Some(seed)).unwrap())
    }

    /// Stops at a fixed generation.
    struct StopAt(u64);

    impl IterPlugin<bool, Bits> for StopAt {
        fn on_generation(&mut self, ga: &Ga<bool, Bits>) -> Result<IterControl> {
            Ok(if ga.generation() >= self.0 {
                IterControl::Stop
            } else {
                IterControl::Continue
            })
        }

        fn name(&self) -> &str {
            "stop_at"
        }
    }

    /// Fails at a fixed generation.
    struct FailAt(u64);

    impl IterPlugin<bool, Bits> for FailAt {
        fn on_generation(&mut self, ga: &Ga<bool, Bits>) -> Result<IterControl> {
            if ga.generation() >= self.0 {
                return Err(GaError::plugin("fail_at", "boom"));
            }
            Ok(IterControl::Continue)
        }
    }

    /// Counts invocations through a shared counter.
    struct Counter(Arc<AtomicUsize>);

    impl IterPlugin<bool, Bits> for Counter {
        fn on_generation(&mut self, _: &Ga<bool, Bits>) -> Result<IterControl> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(IterControl::Continue)
        }

        fn reset(&mut self) {
            self.0.store(0, Ordering::SeqCst);
        }
    }

    /// Reads the param handle through the orchestrator context.
    struct RequireParams;

    impl IterPlugin<bool, Bits> for RequireParams {
        fn on_generation(&mut self, ga: &Ga<bool, Bits>) -> Result<IterControl> {
            match ga.params() {
                Some(p) if p.as_str() == "profile:test" => Ok(IterControl::Continue),
                _ => Err(GaError::plugin("require_params", "missing params")),
            }
        }
    }

    /// Keeps every individual.
    struct KeepAll;

    impl Selector<bool, Bits> for KeepAll {
        fn select(&mut self, individuals: &[Individual<bool, Bits>]) -> Result<Vec<usize>> {
            Ok((0..individuals.len()).collect())
        }
    }

    #[test]
    fn test_initial_state() {
        let ga = engine(1);
        assert_eq!(ga.state(), GaState::Uninitialized);
        assert!(ga.population().is_none());
        assert_eq!(ga.generation(), 0);
    }

    #[test]
    fn test_next_before_setup() {
        let mut ga = engine(1);
        assert_eq!(
            ga.next().unwrap_err(),
            GaError::NotReady {
                state: GaState::Uninitialized
            }
        );
        assert_eq!(ga.state(), GaState::Uninitialized);
    }

    #[test]
    fn test_setup_with_generator() {
        init_logger();
        let mut ga = engine(1);
        ga.setup_population(None).unwrap();
        assert_eq!(ga.state(), GaState::PopulationReady);
        let pop = ga.population().unwrap();
        assert_eq!(pop.len(), 10);
        assert_eq!(pop.genotype_len(), 12);
        assert!(pop.is_bound());
    }

    #[test]
    fn test_setup_with_supplied_population() {
        let mut ga = Ga::<bool, Bits>::new(cm(1)).with_codec(IdentityCodec);
        let pop = Population::from_genes(vec![vec![true; 4]; 6]).unwrap();
        ga.setup_population(Some(pop)).unwrap();
        assert_eq!(ga.population().unwrap().len(), 6);
    }

    #[test]
    fn test_setup_without_source_fails() {
        let mut ga = Ga::<bool, Bits>::new(cm(1)).with_codec(IdentityCodec);
        assert!(matches!(
            ga.setup_population(None),
            Err(GaError::Configuration(_))
        ));
        assert_eq!(ga.state(), GaState::Uninitialized);
    }

    #[test]
    fn test_setup_without_codec_fails() {
        let mut ga = Ga::<bool, Bits>::new(cm(1))
            .with_generator(RandomGenerator::new(4, 4, Some(1)).unwrap());
        assert!(matches!(
            ga.setup_population(None),
            Err(GaError::Configuration(_))
        ));
    }

    #[test]
    fn test_setup_twice_fails() {
        let mut ga = engine(1);
        ga.setup_population(None).unwrap();
        assert_eq!(
            ga.setup_population(None).unwrap_err(),
            GaError::NotReady {
                state: GaState::PopulationReady
            }
        );
    }

    #[test]
    fn test_setup_rejects_bound_population() {
        let mut pop: Population<bool, Bits> =
            Population::from_genes(vec![vec![true; 4]; 4]).unwrap();
        pop.bind(Box::new(cm(2)), vec![Arc::new(IdentityCodec)])
            .unwrap();
        let mut ga = Ga::<bool, Bits>::new(cm(1)).with_codec(IdentityCodec);
        assert_eq!(
            ga.setup_population(Some(pop)).unwrap_err(),
            GaError::AlreadyBound
        );
        // The orchestrator's own plugin was not consumed.
        let pop = Population::from_genes(vec![vec![true; 4]; 4]).unwrap();
        ga.setup_population(Some(pop)).unwrap();
    }

    #[test]
    fn test_setup_accepts_unbound_handover() {
        let mut pop: Population<bool, Bits> =
            Population::from_genes(vec![vec![true, false]; 4]).unwrap();
        pop.bind(Box::new(cm(2)), vec![Arc::new(IdentityCodec)])
            .unwrap();
        pop.iter_next().unwrap();

        assert!(pop.is_bound());
        assert!(pop.unbind().is_some());

        let mut ga = Ga::<bool, Bits>::new(cm(1)).with_codec(IdentityCodec);
        ga.setup_population(Some(pop)).unwrap();
        let pop = ga.population().unwrap();
        assert_eq!(pop.len(), 4);
        assert_eq!(pop.generation(), 1);
        assert_eq!(ga.state(), GaState::PopulationReady);
    }

    #[test]
    fn test_next_advances_generation() {
        let mut ga = engine(3);
        ga.setup_population(None).unwrap();
        for expected in 1..=5 {
            assert_eq!(ga.next().unwrap(), GaState::Iterating);
            assert_eq!(ga.generation(), expected);
        }
        assert_eq!(ga.state(), GaState::Iterating);
    }

    #[test]
    fn test_stop_signal_is_not_an_error() {
        init_logger();
        let mut ga = engine(4).with_iter_plugin(StopAt(3));
        ga.setup_population(None).unwrap();

        assert_eq!(ga.next().unwrap(), GaState::Iterating);
        assert_eq!(ga.next().unwrap(), GaState::Iterating);
        assert_eq!(ga.next().unwrap(), GaState::Stopped);
        assert_eq!(ga.state(), GaState::Stopped);
        assert!(ga.last_error().is_none());

        // Population is kept in its post-generation state.
        let pop = ga.population().unwrap();
        assert_eq!(pop.generation(), 3);
        assert_eq!(pop.len(), 10);

        // Stopped is terminal.
        assert_eq!(
            ga.next().unwrap_err(),
            GaError::NotReady {
                state: GaState::Stopped
            }
        );
        assert_eq!(ga.generation(), 3);
    }

    #[test]
    fn test_plugin_error_fails_run() {
        init_logger();
        let mut ga = engine(5).with_iter_plugin(FailAt(2));
        ga.setup_population(None).unwrap();

        assert_eq!(ga.next().unwrap(), GaState::Iterating);
        let err = ga.next().unwrap_err();
        assert_eq!(err, GaError::plugin("fail_at", "boom"));
        assert_eq!(ga.state(), GaState::Failed);
        assert_eq!(ga.last_error(), Some(&err));
        assert_eq!(ga.population().unwrap().generation(), 2);

        assert!(matches!(
            ga.next(),
            Err(GaError::NotReady {
                state: GaState::Failed
            })
        ));
    }

    #[test]
    fn test_population_error_fails_run() {
        // A one-individual population cannot cross over.
        let mut ga = Ga::<bool, Bits>::new(cm(1)).with_codec(IdentityCodec);
        let pop = Population::from_genes(vec![vec![true; 4]]).unwrap();
        ga.setup_population(Some(pop)).unwrap();

        assert!(matches!(
            ga.next(),
            Err(GaError::InsufficientPopulation { .. })
        ));
        assert_eq!(ga.state(), GaState::Failed);
        assert!(ga.last_error().is_some());
    }

    #[test]
    fn test_chain_order_and_short_circuit() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let mut ga = engine(6)
            .with_iter_plugin(Counter(before.clone()))
            .with_iter_plugin(StopAt(2))
            .with_iter_plugin(Counter(after.clone()));
        ga.setup_population(None).unwrap();

        assert_eq!(ga.run().unwrap(), GaState::Stopped);
        assert_eq!(before.load(Ordering::SeqCst), 2);
        // The plugin after the stopping one only saw generation 1.
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_with_max_generations() {
        let mut ga = engine(7).with_iter_plugin(MaxGenerations::new(15));
        ga.setup_population(None).unwrap();
        assert_eq!(ga.run().unwrap(), GaState::Stopped);
        assert_eq!(ga.generation(), 15);
    }

    #[test]
    fn test_run_propagates_failure() {
        let mut ga = engine(7).with_iter_plugin(FailAt(4));
        ga.setup_population(None).unwrap();
        assert!(ga.run().is_err());
        assert_eq!(ga.state(), GaState::Failed);
        assert_eq!(ga.generation(), 4);
    }

    #[test]
    fn test_reset_allows_new_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut ga = engine(8)
            .with_selector(KeepAll)
            .with_iter_plugin(Counter(counter.clone()))
            .with_iter_plugin(FailAt(2));
        ga.setup_population(None).unwrap();
        assert!(ga.run().is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        let previous = ga.reset().unwrap();
        assert!(!previous.is_bound());
        assert_eq!(previous.generation(), 2);
        assert_eq!(ga.state(), GaState::Uninitialized);
        assert!(ga.last_error().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // Strategies are available again for a second run.
        ga.setup_population(None).unwrap();
        assert_eq!(ga.next().unwrap(), GaState::Iterating);
        assert_eq!(ga.generation(), 1);
    }

    #[test]
    fn test_reset_before_setup() {
        let mut ga = engine(9);
        assert!(ga.reset().is_none());
        ga.setup_population(None).unwrap();
    }

    #[test]
    fn test_params_reach_plugins() {
        let mut ga = engine(10)
            .with_params("profile:test")
            .with_iter_plugin(RequireParams)
            .with_iter_plugin(StopAt(1));
        ga.setup_population(None).unwrap();
        assert_eq!(ga.run().unwrap(), GaState::Stopped);

        let mut ga = engine(10).with_iter_plugin(RequireParams);
        ga.setup_population(None).unwrap();
        assert!(ga.next().is_err());
    }

    #[test]
    fn test_decode_uses_codecs() {
        let ga = engine(11);
        let genotype = Genotype::new(vec![true, false]).unwrap();
        let phenotype = ga.decode(&genotype).unwrap();
        assert_eq!(phenotype.primary(), &vec![true, false]);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let run = |seed| {
            let mut ga = engine(seed).with_iter_plugin(MaxGenerations::new(20));
            ga.setup_population(None).unwrap();
            ga.run().unwrap();
            ga.population()
                .unwrap()
                .individuals()
                .iter()
                .map(|ind| ind.genes().to_vec())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(12), run(12));
    }
}
