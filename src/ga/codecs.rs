//! Built-in codecs.

use super::plugins::CodecPlugin;
use super::types::{Gene, Genotype};
use crate::error::{GaError, Result};

/// Phenotype is a copy of the genes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl<G: Gene> CodecPlugin<G, Vec<G>> for IdentityCodec {
    fn encode(&self, genotype: &Genotype<G>) -> Vec<G> {
        genotype.genes().to_vec()
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Decodes fixed-width bit groups into real values in `[lo, hi]`.
///
/// Each group of `bits_per_var` genes is read as an unsigned big-endian
/// integer `v` and mapped linearly:
///
/// ```text
/// x = lo + (hi - lo) * v / (2^bits - 1)
/// ```
///
/// Trailing genes that do not fill a whole group are ignored.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::{CodecPlugin, Genotype, RealRangeCodec};
///
/// let codec = RealRangeCodec::new(2, 0.0, 3.0).unwrap();
/// let genotype = Genotype::new(vec![false, true, true, true]).unwrap();
/// assert_eq!(CodecPlugin::<bool, Vec<f64>>::encode(&codec, &genotype), vec![1.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RealRangeCodec {
    bits_per_var: usize,
    lo: f64,
    hi: f64,
}

impl RealRangeCodec {
    /// # Errors
    /// [`GaError::Configuration`] unless `1 <= bits_per_var <= 63` and
    /// `lo < hi` with both finite.
    pub fn new(bits_per_var: usize, lo: f64, hi: f64) -> Result<Self> {
        if !(1..=63).contains(&bits_per_var) {
            return Err(GaError::Configuration(format!(
                "bits_per_var must be in 1..=63, got {bits_per_var}"
            )));
        }
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(GaError::Configuration(format!(
                "invalid range [{lo}, {hi}]"
            )));
        }
        Ok(Self {
            bits_per_var,
            lo,
            hi,
        })
    }

    pub fn bits_per_var(&self) -> usize {
        self.bits_per_var
    }

    /// Number of whole variables in a genotype of `len` genes.
    pub fn variables(&self, len: usize) -> usize {
        len / self.bits_per_var
    }

    fn scale(&self, value: u64) -> f64 {
        let max = ((1u64 << self.bits_per_var) - 1) as f64;
        self.lo + (self.hi - self.lo) * value as f64 / max
    }
}

impl<G: Gene> CodecPlugin<G, Vec<f64>> for RealRangeCodec {
    fn encode(&self, genotype: &Genotype<G>) -> Vec<f64> {
        genotype
            .genes()
            .chunks_exact(self.bits_per_var)
            .map(|chunk| {
                let value = chunk
                    .iter()
                    .fold(0u64, |acc, g| (acc << 1) | u64::from(g.is_set()));
                self.scale(value)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "real_range"
    }
}
