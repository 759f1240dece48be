//! Error types for the apex-constraints library
//!
//! Structural failures (a constraint that is not scalar, a factor without the
//! inequality capability, a point that does not cover a constraint's variables)
//! are reported through [`SqpError`]. Feasibility and complementarity
//! violations are not errors: the KKT checks return them as ordinary values.
//! All errors use the `thiserror` crate for automatic trait implementations.

use thiserror::Error;

/// Main result type used throughout the apex-constraints library
pub type SqpResult<T> = Result<T, SqpError>;

/// Main error type for the apex-constraints library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqpError {
    /// A linearization or residual did not have the expected single-row form
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A factor does not provide the capability required by the caller
    #[error("Missing capability: {0}")]
    MissingCapability(String),

    /// A variable referenced by a factor is absent from the assignment
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// A key was inserted twice into the same container
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Vector or matrix sizes do not agree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sparse matrix assembly errors
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl SqpError {
    /// Returns true for errors caused by the shape or capabilities of a constraint
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SqpError::TypeMismatch(_) | SqpError::MissingCapability(_)
        )
    }
}
