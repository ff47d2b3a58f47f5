//! Population and generation transition.
//!
//! A [`Population`] owns its individuals and, once bound, the strategies
//! that drive one generation:
//!
//! 1. decode individuals whose phenotype is unset
//! 2. crossover
//! 3. mutation of every individual
//! 4. generation counter increment
//! 5. optional selection

use super::cm::CmPlugin;
use super::plugins::{Selector, SharedCodec};
use super::types::{Gene, Genotype, Individual, Phenotype};
use crate::error::{GaError, Result};
use log::debug;

/// Strategies attached to a population by [`Population::bind`].
pub struct Bindings<G, P> {
    pub cm: Box<dyn CmPlugin<G, P>>,
    pub codecs: Vec<SharedCodec<G, P>>,
    pub selector: Option<Box<dyn Selector<G, P>>>,
}

/// Ordered collection of individuals evolved together.
///
/// All individuals share one genotype length. The generation counter starts
/// at 0 and increases by exactly one per [`iter_next`](Self::iter_next).
pub struct Population<G, P> {
    individuals: Vec<Individual<G, P>>,
    genotype_len: usize,
    generation: u64,
    cm: Option<Box<dyn CmPlugin<G, P>>>,
    codecs: Vec<SharedCodec<G, P>>,
    selector: Option<Box<dyn Selector<G, P>>>,
}

impl<G: Gene, P: Clone + Send + 'static> Population<G, P> {
    /// Creates an unbound population at generation 0.
    ///
    /// # Errors
    /// - [`GaError::Configuration`] if `individuals` is empty or the
    ///   genotypes hold no genes
    /// - [`GaError::GenotypeLength`] if genotype lengths differ
    pub fn new(individuals: Vec<Individual<G, P>>) -> Result<Self> {
        let genotype_len = match individuals.first() {
            Some(first) => first.len(),
            None => {
                return Err(GaError::Configuration(
                    "population must contain at least one individual".into(),
                ))
            }
        };
        if genotype_len == 0 {
            return Err(GaError::Configuration(
                "genotype length must be at least 1".into(),
            ));
        }
        if let Some(odd) = individuals.iter().find(|ind| ind.len() != genotype_len) {
            return Err(GaError::GenotypeLength {
                expected: genotype_len,
                actual: odd.len(),
            });
        }
        Ok(Self {
            individuals,
            genotype_len,
            generation: 0,
            cm: None,
            codecs: Vec::new(),
            selector: None,
        })
    }

    /// Builds a population from raw gene vectors.
    pub fn from_genes(genes: Vec<Vec<G>>) -> Result<Self> {
        let individuals = genes
            .into_iter()
            .map(Individual::from_genes)
            .collect::<Result<Vec<_>>>()?;
        Self::new(individuals)
    }

    pub fn individuals(&self) -> &[Individual<G, P>] {
        &self.individuals
    }

    pub fn into_individuals(self) -> Vec<Individual<G, P>> {
        self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn genotype_len(&self) -> usize {
        self.genotype_len
    }

    pub fn is_bound(&self) -> bool {
        self.cm.is_some()
    }

    pub fn has_selector(&self) -> bool {
        self.selector.is_some()
    }

    pub fn codecs(&self) -> &[SharedCodec<G, P>] {
        &self.codecs
    }

    /// Attaches the variation strategy and codecs.
    ///
    /// A population binds once; call [`unbind`](Self::unbind) before binding
    /// different strategies.
    ///
    /// # Errors
    /// - [`GaError::AlreadyBound`] if already bound
    /// - [`GaError::Configuration`] if `codecs` is empty
    pub fn bind(
        &mut self,
        cm: Box<dyn CmPlugin<G, P>>,
        codecs: Vec<SharedCodec<G, P>>,
    ) -> Result<()> {
        if self.cm.is_some() {
            return Err(GaError::AlreadyBound);
        }
        if codecs.is_empty() {
            return Err(GaError::Configuration(
                "at least one codec plugin is required".into(),
            ));
        }
        debug!(
            "binding `{}` and {} codec(s) to population of {}",
            cm.name(),
            codecs.len(),
            self.individuals.len()
        );
        self.cm = Some(cm);
        self.codecs = codecs;
        Ok(())
    }

    /// Attaches a selector applied at the end of every generation.
    ///
    /// # Errors
    /// [`GaError::AlreadyBound`] if a selector is already attached.
    pub fn bind_selector(&mut self, selector: Box<dyn Selector<G, P>>) -> Result<()> {
        if self.selector.is_some() {
            return Err(GaError::AlreadyBound);
        }
        self.selector = Some(selector);
        Ok(())
    }

    /// Detaches and returns the bound strategies.
    ///
    /// Returns `None` if the population was not bound.
    pub fn unbind(&mut self) -> Option<Bindings<G, P>> {
        let cm = self.cm.take()?;
        Some(Bindings {
            cm,
            codecs: std::mem::take(&mut self.codecs),
            selector: self.selector.take(),
        })
    }

    /// Advances the population by one generation.
    ///
    /// # Errors
    /// - [`GaError::NotBound`] before [`bind`](Self::bind)
    /// - anything returned by the bound plugins
    /// - [`GaError::EmptySelection`] / [`GaError::Selection`] if the selector
    ///   breaks its contract
    pub fn iter_next(&mut self) -> Result<()> {
        let cm = self.cm.as_mut().ok_or(GaError::NotBound)?;

        for ind in self.individuals.iter_mut() {
            if ind.phenotype().is_none() {
                let phenotype = decode(&self.codecs, ind.genotype())?;
                ind.set_phenotype(phenotype);
            }
        }

        cm.crossover(&mut self.individuals)?;
        for ind in self.individuals.iter_mut() {
            cm.mutate(ind)?;
        }

        self.generation += 1;

        if let Some(selector) = self.selector.as_mut() {
            let keep = selector.select(&self.individuals)?;
            self.individuals = retain(&self.individuals, &keep)?;
        }

        debug!(
            "generation {} complete: {} individuals",
            self.generation,
            self.individuals.len()
        );
        Ok(())
    }

    /// Fraction of loci at which not all individuals carry the same gene.
    ///
    /// 0.0 means every individual has an identical genotype.
    pub fn diversity(&self) -> f64 {
        let Some(first) = self.individuals.first() else {
            return 0.0;
        };
        let varied = (0..self.genotype_len)
            .filter(|&i| {
                let gene = &first.genes()[i];
                self.individuals.iter().any(|ind| &ind.genes()[i] != gene)
            })
            .count();
        varied as f64 / self.genotype_len as f64
    }
}

impl<G, P> std::fmt::Debug for Population<G, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("len", &self.individuals.len())
            .field("genotype_len", &self.genotype_len)
            .field("generation", &self.generation)
            .field("bound", &self.cm.is_some())
            .field("codecs", &self.codecs.len())
            .field("selector", &self.selector.is_some())
            .finish()
    }
}

/// Runs every codec over a genotype.
///
/// # Errors
/// [`GaError::Configuration`] if `codecs` is empty.
pub(crate) fn decode<G: Gene, P>(
    codecs: &[SharedCodec<G, P>],
    genotype: &Genotype<G>,
) -> Result<Phenotype<P>> {
    let (first, rest) = codecs.split_first().ok_or_else(|| {
        GaError::Configuration("at least one codec plugin is required".into())
    })?;
    let primary = first.encode(genotype);
    let rest = rest.iter().map(|codec| codec.encode(genotype)).collect();
    Ok(Phenotype::new(primary, rest))
}

fn retain<G: Gene, P: Clone>(
    individuals: &[Individual<G, P>],
    keep: &[usize],
) -> Result<Vec<Individual<G, P>>> {
    if keep.is_empty() {
        return Err(GaError::EmptySelection);
    }
    keep.iter()
        .map(|&idx| {
            individuals.get(idx).cloned().ok_or_else(|| {
                GaError::Selection(format!(
                    "index {idx} out of range for population of {}",
                    individuals.len()
                ))
            })
        })
        .collect()
}
