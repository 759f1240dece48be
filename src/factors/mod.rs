//! Nonlinear factors and inequality constraints
//!
//! [`NonlinearFactor`] is the general factor interface: residual evaluation
//! and first-order linearization at a [`Values`] point. [`InequalityConstraint`]
//! adds the pieces an SQP step needs from a scalar constraint `c(x) <= 0`: the
//! dual key naming its Lagrange multiplier, and a scalar residual accessor.
//!
//! # Module Structure
//!
//! - `bound`: component-wise bounds on a single variable
//! - `affine`: affine inequalities over several variables
//! - `distance`: maximum Euclidean distance between two points
//! - `numerical`: closure-defined constraints with finite-difference Jacobians

use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;

use crate::core::{Key, Values, format_key};
use crate::error::{SqpError, SqpResult};
use crate::linear::JacobianFactor;

pub mod affine;
pub mod bound;
pub mod distance;
pub mod numerical;

pub use affine::AffineInequalityConstraint;
pub use bound::{LowerBoundConstraint, UpperBoundConstraint};
pub use distance::MaxDistanceConstraint;
pub use numerical::NumericalInequality;

/// Factor interface for nonlinear least squares and constraints
pub trait NonlinearFactor: fmt::Debug + Send + Sync {
    /// Keys of all variables connected to this factor
    fn keys(&self) -> &[Key];

    /// Residual dimension
    fn dim(&self) -> usize;

    /// Signed residual at `values`, before any noise-model whitening
    fn unwhitened_error(&self, values: &Values) -> SqpResult<DVector<f64>>;

    /// First-order model of the residual around `values`
    fn linearize(&self, values: &Values) -> SqpResult<JacobianFactor>;

    /// Convert into an inequality constraint if this factor is one
    ///
    /// Inequality constraints return `Some(self)`, plain factors `None`.
    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>>;
}

/// Scalar inequality constraint `c(x) <= 0` paired with a dual variable
///
/// Implementors must return a one-dimensional residual from
/// [`NonlinearFactor::unwhitened_error`] and a single-row
/// [`JacobianFactor`] from [`NonlinearFactor::linearize`]; anything else is
/// reported as [`SqpError::TypeMismatch`] by the graph operations. Their
/// [`NonlinearFactor::into_inequality`] must return `Some(self)`.
pub trait InequalityConstraint: NonlinearFactor {
    /// Key of the Lagrange multiplier governing this constraint
    fn dual_key(&self) -> Key;

    /// Signed scalar value of `c(x)`; positive means violated
    fn scalar_error(&self, values: &Values) -> SqpResult<f64> {
        let error = self.unwhitened_error(values)?;
        if error.len() != 1 {
            return Err(SqpError::TypeMismatch(format!(
                "constraint {} has a residual of dimension {}, expected a scalar",
                format_key(self.dual_key()),
                error.len()
            )));
        }
        Ok(error[0])
    }
}

/// Look up the values of `keys` in order
pub(crate) fn gather<'a>(values: &'a Values, keys: &[Key]) -> SqpResult<Vec<&'a DVector<f64>>> {
    keys.iter().map(|&key| values.at(key)).collect()
}
