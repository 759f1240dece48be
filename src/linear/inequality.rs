//! Linear inequality constraints handed to the QP solver
//!
//! A [`LinearInequality`] represents one row
//! ```text
//! sum_j a_j^T dx_j <= b
//! ```
//! obtained from a scalar nonlinear constraint `c(x) <= 0` linearized at `x0`
//! (`a_j = dc/dx_j`, `b = -c(x0)`). It keeps the dual key of its nonlinear
//! source so the QP solver can report multipliers per constraint.

use faer::Mat;
use faer::sparse::{SparseColMat, Triplet};
use nalgebra::{DMatrix, DVector};

use crate::core::{Key, VectorValues, format_key};
use crate::error::{SqpError, SqpResult};
use crate::linear::{JacobianFactor, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub struct LinearInequality {
    jacobian: JacobianFactor,
    dual_key: Key,
}

impl LinearInequality {
    /// Wrap a single-row Jacobian factor as an inequality owned by `dual_key`
    ///
    /// Fails with [`SqpError::TypeMismatch`] when the factor is not a single
    /// row, i.e. the source constraint was not scalar.
    pub fn from_jacobian(jacobian: JacobianFactor, dual_key: Key) -> SqpResult<Self> {
        if jacobian.rows() != 1 {
            return Err(SqpError::TypeMismatch(format!(
                "linearization of constraint {} has {} rows, expected a single row",
                format_key(dual_key),
                jacobian.rows()
            )));
        }
        Ok(Self { jacobian, dual_key })
    }

    pub fn dual_key(&self) -> Key {
        self.dual_key
    }

    pub fn keys(&self) -> &[Key] {
        self.jacobian.keys()
    }

    pub fn jacobian(&self) -> &JacobianFactor {
        &self.jacobian
    }

    /// Row coefficients `a_j` for `key`
    pub fn coefficients(&self, key: Key) -> Option<&DMatrix<f64>> {
        self.jacobian.block(key)
    }

    /// Scalar right-hand side `b`
    pub fn rhs(&self) -> f64 {
        self.jacobian.rhs()[0]
    }

    /// Signed value of `sum_j a_j^T dx_j - b`; positive means violated
    pub fn error(&self, delta: &VectorValues) -> SqpResult<f64> {
        Ok(self.jacobian.error(delta)?[0])
    }

    pub fn is_satisfied(&self, delta: &VectorValues, tol: f64) -> SqpResult<bool> {
        Ok(self.error(delta)? <= tol)
    }
}

/// Ordered collection of linear inequalities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InequalityFactorGraph {
    inequalities: Vec<LinearInequality>,
}

impl InequalityFactorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inequalities: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, inequality: LinearInequality) {
        self.inequalities.push(inequality);
    }

    pub fn len(&self) -> usize {
        self.inequalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inequalities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LinearInequality> {
        self.inequalities.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinearInequality> {
        self.inequalities.iter()
    }

    /// Dual keys in constraint order
    pub fn dual_keys(&self) -> Vec<Key> {
        self.inequalities.iter().map(|c| c.dual_key()).collect()
    }

    /// Stack every row into `A dx <= b`
    ///
    /// Row `i` of the result is inequality `i`; columns follow `ordering`.
    /// Exact zeros in the coefficient rows are not stored.
    pub fn to_sparse(
        &self,
        ordering: &Ordering,
    ) -> SqpResult<(SparseColMat<usize, f64>, Mat<f64>)> {
        let mut triplets = Vec::new();

        for (row, inequality) in self.inequalities.iter().enumerate() {
            for (key, block) in inequality.jacobian().iter() {
                let (offset, dimension) = ordering.column(key).ok_or_else(|| {
                    SqpError::MissingVariable(format!(
                        "constraint {} references {} which is not in the ordering",
                        format_key(inequality.dual_key()),
                        format_key(key)
                    ))
                })?;
                if block.ncols() != dimension {
                    return Err(SqpError::DimensionMismatch(format!(
                        "constraint {} has {} columns for {}, ordering reserves {}",
                        format_key(inequality.dual_key()),
                        block.ncols(),
                        format_key(key),
                        dimension
                    )));
                }
                for col in 0..dimension {
                    let value = block[(0, col)];
                    if value != 0.0 {
                        triplets.push(Triplet::new(row, offset + col, value));
                    }
                }
            }
        }

        let matrix =
            SparseColMat::try_new_from_triplets(self.len(), ordering.total_dimension(), &triplets)
                .map_err(|e| {
                    SqpError::LinearAlgebra(format!("Failed to build constraint matrix: {e:?}"))
                })?;
        let rhs = Mat::from_fn(self.len(), 1, |i, _| self.inequalities[i].rhs());

        Ok((matrix, rhs))
    }

    /// Per-row errors `A dx - b` for a step
    pub fn errors(&self, delta: &VectorValues) -> SqpResult<DVector<f64>> {
        let mut errors = DVector::zeros(self.len());
        for (i, inequality) in self.inequalities.iter().enumerate() {
            errors[i] = inequality.error(delta)?;
        }
        Ok(errors)
    }
}

impl<'a> IntoIterator for &'a InequalityFactorGraph {
    type Item = &'a LinearInequality;
    type IntoIter = std::slice::Iter<'a, LinearInequality>;

    fn into_iter(self) -> Self::IntoIter {
        self.inequalities.iter()
    }
}
