//! KKT verdicts for the inequality constraints of an SQP iterate
//!
//! A candidate `(x, λ)` is accepted when, for every constraint `c_i`:
//! ```text
//! primal feasibility:       c_i(x) <= tol
//! complementary slackness:  |c_i(x)| <= tol   if λ_i is present (active)
//! ```
//! Both comparisons include the boundary.

use std::fmt;

use crate::core::{Key, format_key};
use crate::error::{SqpError, SqpResult};

/// Configuration for the feasibility and complementarity check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KktConfig {
    /// Absolute tolerance applied to constraint residuals
    pub tolerance: f64,
}

impl Default for KktConfig {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl KktConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Tolerance must be finite and non-negative
    pub fn validate(&self) -> SqpResult<()> {
        validate_tolerance(self.tolerance)
    }
}

pub(crate) fn validate_tolerance(tol: f64) -> SqpResult<()> {
    if tol.is_finite() && tol >= 0.0 {
        Ok(())
    } else {
        Err(SqpError::InvalidInput(format!(
            "KKT tolerance must be finite and non-negative, got {tol}"
        )))
    }
}

/// Outcome of the KKT check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KktStatus {
    /// Every constraint is feasible and every active constraint is tight
    Satisfied,
    /// Constraint `index` has `c(x) > tol`
    PrimalInfeasible { index: usize, dual_key: Key, error: f64 },
    /// Active constraint `index` has `|c(x)| > tol`
    ComplementarityViolated { index: usize, dual_key: Key, error: f64 },
}

impl fmt::Display for KktStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KktStatus::Satisfied => write!(f, "satisfied"),
            KktStatus::PrimalInfeasible {
                index,
                dual_key,
                error,
            } => write!(
                f,
                "primal infeasible at constraint #{index} ({}), c(x) = {error:.6e}",
                format_key(*dual_key)
            ),
            KktStatus::ComplementarityViolated {
                index,
                dual_key,
                error,
            } => write!(
                f,
                "complementarity violated at active constraint #{index} ({}), c(x) = {error:.6e}",
                format_key(*dual_key)
            ),
        }
    }
}

/// Summary of a KKT check
///
/// Counters only cover the constraints evaluated before the verdict; the
/// check stops at the first failing constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct KktReport {
    pub status: KktStatus,
    pub tolerance: f64,
    /// Constraints whose residual was evaluated
    pub constraints_evaluated: usize,
    /// Evaluated constraints that carried a multiplier
    pub active_constraints: usize,
    /// Largest positive residual seen, 0 when every residual was <= 0
    pub max_violation: f64,
}

impl KktReport {
    pub(crate) fn new(tolerance: f64) -> Self {
        Self {
            status: KktStatus::Satisfied,
            tolerance,
            constraints_evaluated: 0,
            active_constraints: 0,
            max_violation: 0.0,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.status == KktStatus::Satisfied
    }
}

impl fmt::Display for KktReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== KKT Check ===")?;
        writeln!(f, "Status:                {}", self.status)?;
        writeln!(f, "Tolerance:             {:.3e}", self.tolerance)?;
        writeln!(f, "Constraints evaluated: {}", self.constraints_evaluated)?;
        writeln!(f, "Active constraints:    {}", self.active_constraints)?;
        write!(f, "Max violation:         {:.6e}", self.max_violation)
    }
}
