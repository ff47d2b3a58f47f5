//! Error types for the GA engine.
//!
//! Every fallible operation returns [`Result`]. The stop signal raised by
//! iteration plugins is not part of this enum; see
//! [`IterControl`](crate::ga::IterControl).

use crate::ga::GaState;
use thiserror::Error;

/// Errors raised by the GA engine and its plugins.
///
/// Configuration errors fail fast at construction. Precondition errors fail
/// at the call that violates the precondition and are never corrected
/// silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GaError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("genotype length mismatch: expected {expected}, got {actual}")]
    GenotypeLength { expected: usize, actual: usize },

    #[error("insufficient population: need at least {required} individuals, got {actual}")]
    InsufficientPopulation { required: usize, actual: usize },

    #[error("population is not bound to a crossover/mutation plugin")]
    NotBound,

    #[error("population is already bound")]
    AlreadyBound,

    #[error("orchestrator not ready: current state is {state:?}")]
    NotReady { state: GaState },

    #[error("selector returned no individuals")]
    EmptySelection,

    #[error("selection error: {0}")]
    Selection(String),

    #[error("plugin `{plugin}` failed: {message}")]
    Plugin { plugin: String, message: String },
}

impl GaError {
    /// Convenience constructor for errors raised inside user plugins.
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        GaError::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GaError>;
