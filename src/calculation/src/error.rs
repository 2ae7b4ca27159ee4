//! Error types for the lifting-line solvers.

use thiserror::Error;

/// Failures of the lifting-line solvers and their configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AeroError {
    /// An input was outside the domain of the operation.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// The linear system could not be solved.
    #[error("Singular lifting-line system (rank {rank} of {size})")]
    SingularSystem {
        /// Numerical rank of the matrix.
        rank: usize,
        /// Number of unknowns.
        size: usize,
    },

    /// The first Fourier coefficient is zero, so lift-normalised ratios are undefined.
    #[error("Zero-lift degeneracy: first Fourier coefficient is zero")]
    ZeroLiftDegeneracy,

    /// A queried harmonic index was not solved for.
    #[error("Harmonic A{0} was not part of the solved system")]
    MissingHarmonic(u32),

    /// No successful solve yet.
    #[error("Coefficients queried before a successful solve")]
    NotSolved,

    /// A config value is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AeroError>;
