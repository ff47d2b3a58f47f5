//! Crossover/mutation configuration.
//!
//! [`CmConfig`] holds the operator rates and RNG seed of a
//! [`SegmentSwapCm`](super::SegmentSwapCm). Unlike a clamp-on-set builder,
//! out-of-range rates are kept as given and rejected by
//! [`validate`](CmConfig::validate) when the plugin is constructed.

use crate::error::{GaError, Result};

/// Configuration for the crossover/mutation plugin.
///
/// # Defaults
///
/// ```
/// use u_evolve::ga::CmConfig;
///
/// let config = CmConfig::default();
/// assert!((config.crossover_rate - 0.9).abs() < 1e-12);
/// assert!((config.mutate_rate - 0.01).abs() < 1e-12);
/// assert!(config.seed.is_none());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ga::CmConfig;
///
/// let config = CmConfig::default()
///     .with_crossover_rate(0.6)
///     .with_mutate_rate(0.05)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmConfig {
    /// Per-gene flip probability (0.0–1.0).
    ///
    /// Each gene is tested independently, so the expected number of flips
    /// per individual is `genotype_len * mutate_rate`.
    pub mutate_rate: f64,

    /// Fraction of the population taking part in crossover (0.0–1.0).
    ///
    /// The participant count is rounded down to an even number, with a
    /// floor of one pair.
    pub crossover_rate: f64,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for CmConfig {
    fn default() -> Self {
        Self {
            mutate_rate: 0.01,
            crossover_rate: 0.9,
            seed: None,
        }
    }
}

impl CmConfig {
    /// Sets the per-gene mutation rate.
    pub fn with_mutate_rate(mut self, rate: f64) -> Self {
        self.mutate_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`GaError::Configuration`] if either rate is outside
    /// `[0.0, 1.0]` or is NaN.
    pub fn validate(&self) -> Result<()> {
        check_rate("mutate_rate", self.mutate_rate)?;
        check_rate("crossover_rate", self.crossover_rate)?;
        Ok(())
    }
}

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(GaError::Configuration(format!(
            "{name} must be within [0, 1], got {rate}"
        )));
    }
    Ok(())
}
