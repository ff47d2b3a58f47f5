//! Pluggable genetic-algorithm engine.
//!
//! A run is assembled from strategy plugins around a [`Population`] of
//! fixed-length binary genotypes and driven by the [`Ga`] orchestrator.
//!
//! # Core Types
//!
//! - [`Gene`], [`Genotype`], [`Phenotype`], [`Individual`]
//! - [`Population`]: individuals plus the strategies bound to them
//! - [`Ga`]: the orchestrator state machine ([`GaState`])
//!
//! # Plugin Contracts
//!
//! - [`CmPlugin`]: crossover and mutation
//! - [`CodecPlugin`]: genotype to phenotype
//! - [`Selector`]: survivor selection
//! - [`GeneratePlugin`]: initial population
//! - [`IterPlugin`]: per-generation control ([`IterControl`])
//!
//! # Built-in Plugins
//!
//! - [`SegmentSwapCm`] configured by [`CmConfig`]
//! - [`IdentityCodec`], [`RealRangeCodec`]
//! - [`RandomGenerator`]
//! - [`MaxGenerations`], [`TimeLimit`], [`Cancellation`], [`Stagnation`],
//!   [`GenerationLogger`]
//!
//! # Submodules
//!
//! - [`operators`]: segment swap and flip mutation primitives
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod batch;
mod cm;
mod codecs;
mod config;
mod generate;
mod iteration;
pub mod operators;
mod plugins;
mod population;
mod runner;
mod types;

pub use batch::run_many;
pub use cm::{CmPlugin, SegmentSwapCm};
pub use codecs::{IdentityCodec, RealRangeCodec};
pub use config::CmConfig;
pub use generate::RandomGenerator;
pub use iteration::{Cancellation, GenerationLogger, MaxGenerations, Stagnation, TimeLimit};
pub use plugins::{
    CodecPlugin, GeneratePlugin, IterControl, IterPlugin, ParamHandle, Selector, SharedCodec,
};
pub use population::{Bindings, Population};
pub use runner::{Ga, GaState};
pub use types::{Gene, Genotype, Individual, Phenotype};
