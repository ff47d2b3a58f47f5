//! Plugin contracts.
//!
//! The orchestrator is assembled from trait objects, one per role:
//!
//! | Role | Trait | Bound to |
//! |------|-------|----------|
//! | Variation | [`CmPlugin`](super::CmPlugin) | population |
//! | Decoding | [`CodecPlugin`] | population |
//! | Selection | [`Selector`] | population (optional) |
//! | Initialization | [`GeneratePlugin`] | orchestrator (optional) |
//! | Iteration control | [`IterPlugin`] | orchestrator |
//!
//! All plugins are `Send` so that independent runs can live on separate
//! threads.

use super::population::Population;
use super::runner::Ga;
use super::types::{Genotype, Individual};
use crate::error::Result;
use std::sync::Arc;

/// Translates a genotype into one phenotype value.
///
/// Encoding must be a deterministic function of the genotype: the
/// population caches its output until the genes change.
pub trait CodecPlugin<G, P>: Send + Sync {
    fn encode(&self, genotype: &Genotype<G>) -> P;

    fn name(&self) -> &str {
        "codec"
    }
}

/// Codecs are shared between the orchestrator and the population it binds.
pub type SharedCodec<G, P> = Arc<dyn CodecPlugin<G, P>>;

/// Builds an initial population.
///
/// Used by [`Ga::setup_population`] when the caller supplies no population.
pub trait GeneratePlugin<G, P>: Send {
    fn generate(&mut self) -> Result<Population<G, P>>;
}

/// Reduces a population to the individuals that survive a generation.
///
/// Receives an immutable snapshot and returns the indices to keep, in the
/// order they should appear in the next population. An index may appear
/// more than once; the individual is then cloned.
///
/// Must return at least one index, all within bounds.
pub trait Selector<G, P>: Send {
    fn select(&mut self, individuals: &[Individual<G, P>]) -> Result<Vec<usize>>;
}

/// Outcome of one iteration plugin invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterControl {
    /// Keep iterating.
    Continue,
    /// End the run. The orchestrator moves to
    /// [`GaState::Stopped`](super::GaState::Stopped) and keeps the current
    /// population.
    Stop,
}

/// Per-generation hook that can observe or halt the evolutionary loop.
///
/// Invoked in registration order after every generation, with the
/// orchestrator as read-only context. Returning [`IterControl::Stop`] ends
/// the run; returning an error fails it.
pub trait IterPlugin<G, P>: Send {
    fn on_generation(&mut self, ga: &Ga<G, P>) -> Result<IterControl>;

    /// Called once when [`Ga::setup_population`] succeeds, before the first
    /// generation.
    fn on_setup(&mut self) {}

    /// Name used in log messages.
    fn name(&self) -> &str {
        "iter_plugin"
    }

    /// Clears per-run state. Called by [`Ga::reset`].
    fn reset(&mut self) {}
}

/// Opaque configuration handle.
///
/// Identifies a configuration source (a path, URL, profile name, ...). The
/// engine carries it and hands it to plugins through
/// [`Ga::params`]; it never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamHandle(String);

impl ParamHandle {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParamHandle {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl std::fmt::Display for ParamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
