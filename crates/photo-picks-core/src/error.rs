//! Error taxonomy for the scoring engine.
//!
//! Registry misuse and invalid selection settings are recoverable and
//! reported to the caller immediately. Per-assessor failures are absorbed by
//! the orchestrator (folded to a 0.0 contribution, counted, logged) and never
//! surface as errors; cancellation is a terminal state on the batch report,
//! not an error either.

use thiserror::Error;

/// Errors from mutating or querying the assessor registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// An assessor with the same name is already registered.
    #[error("assessor `{0}` is already registered")]
    DuplicateName(String),

    /// No assessor with the given name is registered.
    #[error("no assessor named `{0}` is registered")]
    NotFound(String),

    /// The weight is out of range (must be finite and > 0).
    #[error("invalid weight {weight} for assessor `{name}`: must be finite and > 0")]
    InvalidWeight {
        /// Assessor name the weight was meant for.
        name: String,
        /// The rejected weight.
        weight: f64,
    },
}

/// A selection percentage outside `(0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid selection percentage {0}: must be in (0, 100]")]
pub struct InvalidPercentage(pub f64);
