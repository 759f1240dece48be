//! Affine inequality over several variables
//!
//! ```text
//! c(x) = sum_j a_j^T x_j - b <= 0
//! ```
//! Linearization is exact: the Jacobian blocks are the coefficient rows.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector, dvector};

use crate::core::{Key, Values, format_key};
use crate::error::{SqpError, SqpResult};
use crate::factors::{InequalityConstraint, NonlinearFactor, gather};
use crate::linear::JacobianFactor;

#[derive(Debug, Clone, PartialEq)]
pub struct AffineInequalityConstraint {
    keys: Vec<Key>,
    coefficients: Vec<DVector<f64>>,
    offset: f64,
    dual_key: Key,
}

impl AffineInequalityConstraint {
    /// Create `sum_j a_j^T x_j <= offset` from `(key, a_j)` terms
    pub fn new(
        terms: Vec<(Key, DVector<f64>)>,
        offset: f64,
        dual_key: impl Into<Key>,
    ) -> SqpResult<Self> {
        if terms.is_empty() {
            return Err(SqpError::InvalidInput(
                "affine inequality needs at least one term".to_string(),
            ));
        }
        let mut keys = Vec::with_capacity(terms.len());
        let mut coefficients = Vec::with_capacity(terms.len());
        for (key, a) in terms {
            if keys.contains(&key) {
                return Err(SqpError::DuplicateKey(format!(
                    "affine inequality has two terms for {}",
                    format_key(key)
                )));
            }
            keys.push(key);
            coefficients.push(a);
        }
        Ok(Self {
            keys,
            coefficients,
            offset,
            dual_key: dual_key.into(),
        })
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn evaluate(&self, values: &Values) -> SqpResult<f64> {
        let xs = gather(values, &self.keys)?;
        let mut total = -self.offset;
        for ((key, a), x) in self.keys.iter().zip(&self.coefficients).zip(xs) {
            if a.len() != x.len() {
                return Err(SqpError::DimensionMismatch(format!(
                    "coefficient for {} has {} entries, variable has {}",
                    format_key(*key),
                    a.len(),
                    x.len()
                )));
            }
            total += a.dot(x);
        }
        Ok(total)
    }
}

impl NonlinearFactor for AffineInequalityConstraint {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, values: &Values) -> SqpResult<DVector<f64>> {
        Ok(dvector![self.evaluate(values)?])
    }

    fn linearize(&self, values: &Values) -> SqpResult<JacobianFactor> {
        let error = self.evaluate(values)?;
        let terms = self
            .keys
            .iter()
            .zip(&self.coefficients)
            .map(|(&key, a)| (key, DMatrix::from_row_slice(1, a.len(), a.as_slice())))
            .collect();
        JacobianFactor::new(terms, dvector![-error])
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for AffineInequalityConstraint {
    fn dual_key(&self) -> Key {
        self.dual_key
    }
}
