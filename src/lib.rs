//! Pluggable genetic-algorithm engine.
//!
//! Evolves a population of fixed-length binary genotypes through
//! segment-swap crossover and flip mutation. Every strategy is a plugin:
//!
//! - **Crossover/mutation**: how genotypes vary between generations.
//! - **Codecs**: how a genotype decodes into a problem-level phenotype.
//! - **Selection**: which individuals survive a generation.
//! - **Generation**: how the initial population is built.
//! - **Iteration control**: when the run stops, and what is observed on the way.
//!
//! The [`ga::Ga`] orchestrator binds the plugins to a population and drives
//! it through an explicit lifecycle (`Uninitialized`, `PopulationReady`,
//! `Iterating`, `Stopped`, `Failed`).
//!
//! # Features
//!
//! - `serde`: serialization for configuration and data types
//! - `parallel`: run independent seeds on the rayon pool via [`ga::run_many`]

pub mod error;
pub mod ga;
pub mod random;
