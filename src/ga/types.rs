//! Core data types for the GA engine.
//!
//! - [`Gene`]: the binary-valued gene abstraction
//! - [`Genotype`]: a fixed-length gene sequence
//! - [`Phenotype`]: the decoded form of a genotype, one value per codec
//! - [`Individual`]: a genotype paired with its cached phenotype

use crate::error::{GaError, Result};
use rand::Rng;

/// A binary-valued gene.
///
/// The engine's mutation operator flips genes, so every gene type must have
/// a well-defined complement.
///
/// Built-in implementations exist for `bool` and for `u8` bits (`0`/`1`).
pub trait Gene: Clone + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Returns the complement of this gene.
    fn flip(&self) -> Self;

    /// Returns `true` if the gene is set.
    ///
    /// Used by bit-decoding codecs such as
    /// [`RealRangeCodec`](super::RealRangeCodec).
    fn is_set(&self) -> bool;

    /// Draws a uniformly random gene.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl Gene for bool {
    fn flip(&self) -> Self {
        !*self
    }

    fn is_set(&self) -> bool {
        *self
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.random_bool(0.5)
    }
}

/// `u8` genes are treated as single bits; only the lowest bit is toggled.
impl Gene for u8 {
    fn flip(&self) -> Self {
        *self ^ 1
    }

    fn is_set(&self) -> bool {
        *self & 1 == 1
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.random_range(0..=1)
    }
}

/// Fixed-length ordered sequence of genes.
///
/// A genotype always holds at least one gene. Its length never changes
/// after construction; operators rewrite genes in place.
///
/// With the `serde` feature a genotype serializes as a plain gene sequence
/// and deserializes through [`Genotype::new`], so an empty sequence is
/// rejected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "Vec<G>",
        into = "Vec<G>",
        bound(
            serialize = "G: Gene + serde::Serialize",
            deserialize = "G: Gene + serde::Deserialize<'de>"
        )
    )
)]
pub struct Genotype<G> {
    genes: Vec<G>,
}

impl<G: Gene> TryFrom<Vec<G>> for Genotype<G> {
    type Error = GaError;

    fn try_from(genes: Vec<G>) -> Result<Self> {
        Self::new(genes)
    }
}

impl<G> From<Genotype<G>> for Vec<G> {
    fn from(genotype: Genotype<G>) -> Self {
        genotype.genes
    }
}

impl<G: Gene> Genotype<G> {
    /// Creates a genotype from a gene vector.
    ///
    /// # Errors
    /// Returns [`GaError::Configuration`] if `genes` is empty.
    pub fn new(genes: Vec<G>) -> Result<Self> {
        if genes.is_empty() {
            return Err(GaError::Configuration(
                "genotype length must be at least 1".into(),
            ));
        }
        Ok(Self { genes })
    }

    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Always `false`: a genotype holds at least one gene.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub(crate) fn genes_mut(&mut self) -> &mut [G] {
        &mut self.genes
    }
}

/// Decoded form of a genotype.
///
/// Holds one value per bound codec, in binding order. Since a population
/// always binds at least one codec, the first value is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Phenotype<P> {
    primary: P,
    rest: Vec<P>,
}

impl<P> Phenotype<P> {
    pub(crate) fn new(primary: P, rest: Vec<P>) -> Self {
        Self { primary, rest }
    }

    /// Output of the first codec.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// Output of the codec at position `index`.
    pub fn get(&self, index: usize) -> Option<&P> {
        if index == 0 {
            Some(&self.primary)
        } else {
            self.rest.get(index - 1)
        }
    }

    /// Number of codec outputs (at least 1).
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        std::iter::once(&self.primary).chain(self.rest.iter())
    }
}

/// A candidate solution: one genotype and its cached phenotype.
///
/// The phenotype is unset until a population decodes it, and is reset
/// whenever the genes change.
#[derive(Debug, Clone)]
pub struct Individual<G, P> {
    genotype: Genotype<G>,
    phenotype: Option<Phenotype<P>>,
}

impl<G: Gene, P> Individual<G, P> {
    pub fn new(genotype: Genotype<G>) -> Self {
        Self {
            genotype,
            phenotype: None,
        }
    }

    /// Builds an individual directly from genes.
    ///
    /// # Errors
    /// Returns [`GaError::Configuration`] if `genes` is empty.
    pub fn from_genes(genes: Vec<G>) -> Result<Self> {
        Ok(Self::new(Genotype::new(genes)?))
    }

    pub fn genotype(&self) -> &Genotype<G> {
        &self.genotype
    }

    pub fn genes(&self) -> &[G] {
        self.genotype.genes()
    }

    pub fn len(&self) -> usize {
        self.genotype.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotype.is_empty()
    }

    /// Replaces the genes and clears the cached phenotype.
    ///
    /// # Errors
    /// Returns [`GaError::GenotypeLength`] if the new length differs from
    /// the current one.
    pub fn set_genes(&mut self, genes: Vec<G>) -> Result<()> {
        if genes.len() != self.genotype.len() {
            return Err(GaError::GenotypeLength {
                expected: self.genotype.len(),
                actual: genes.len(),
            });
        }
        self.genotype.genes = genes;
        self.phenotype = None;
        Ok(())
    }

    /// Mutable access to the genes for custom operators.
    ///
    /// The cached phenotype is cleared up front, whether or not the caller
    /// ends up changing anything.
    pub fn genes_mut(&mut self) -> &mut [G] {
        self.phenotype = None;
        self.genotype.genes_mut()
    }

    /// Returns the cached phenotype, or `None` if it has not been decoded
    /// since the last gene change.
    pub fn phenotype(&self) -> Option<&Phenotype<P>> {
        self.phenotype.as_ref()
    }

    pub(crate) fn set_phenotype(&mut self, phenotype: Phenotype<P>) {
        self.phenotype = Some(phenotype);
    }

    pub(crate) fn invalidate(&mut self) {
        self.phenotype = None;
    }

    /// Gene access that leaves the cache alone; callers must call
    /// [`invalidate`](Self::invalidate) if they change anything.
    pub(crate) fn raw_genes_mut(&mut self) -> &mut [G] {
        self.genotype.genes_mut()
    }
}
