// src/error.rs
// Error types for the pendulum simulation.

use thiserror::Error;

/// Errors raised by the dynamics core and its collaborators.
///
/// All failures are local and synchronous. Nothing is retried: a pure numerical
/// computation fed the same inputs fails the same way again.
#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed, non-finite or non-positive state or parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The mass matrix could not be factorised.
    #[error("mass matrix is singular (smallest pivot {pivot:e})")]
    SingularSystem {
        /// Magnitude of the smallest pivot found during factorisation.
        pivot: f64,
    },

    /// Timestep that is zero, negative or not finite.
    #[error("invalid timestep {0}: must be positive and finite")]
    InvalidTimestep(f64),

    /// Failure reading a config file or writing a report.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reading a JSON configuration or writing a JSON report.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimError>;
