//! Maximum distance between two Euclidean points
//!
//! ```text
//! c(p_a, p_b) = ||p_a - p_b|| - d_max <= 0
//! dc/dp_a =  u^T,  dc/dp_b = -u^T,  u = (p_a - p_b) / ||p_a - p_b||
//! ```
//! At coincident points the norm is not differentiable; the Jacobian is set to
//! zero there, which is a valid subgradient.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector, dvector};

use crate::core::{Key, Values, format_key};
use crate::error::{SqpError, SqpResult};
use crate::factors::{InequalityConstraint, NonlinearFactor, gather};
use crate::linear::JacobianFactor;

#[derive(Debug, Clone, PartialEq)]
pub struct MaxDistanceConstraint {
    keys: [Key; 2],
    max_distance: f64,
    dual_key: Key,
}

impl MaxDistanceConstraint {
    pub fn new(
        key_a: impl Into<Key>,
        key_b: impl Into<Key>,
        max_distance: f64,
        dual_key: impl Into<Key>,
    ) -> SqpResult<Self> {
        if !(max_distance.is_finite() && max_distance >= 0.0) {
            return Err(SqpError::InvalidInput(format!(
                "maximum distance must be finite and non-negative, got {max_distance}"
            )));
        }
        let keys = [key_a.into(), key_b.into()];
        if keys[0] == keys[1] {
            return Err(SqpError::DuplicateKey(format!(
                "distance constraint between {} and itself",
                format_key(keys[0])
            )));
        }
        Ok(Self {
            keys,
            max_distance,
            dual_key: dual_key.into(),
        })
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    fn difference(&self, values: &Values) -> SqpResult<DVector<f64>> {
        let points = gather(values, &self.keys)?;
        if points[0].len() != points[1].len() {
            return Err(SqpError::DimensionMismatch(format!(
                "{} has dimension {}, {} has dimension {}",
                format_key(self.keys[0]),
                points[0].len(),
                format_key(self.keys[1]),
                points[1].len()
            )));
        }
        Ok(points[0] - points[1])
    }
}

impl NonlinearFactor for MaxDistanceConstraint {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, values: &Values) -> SqpResult<DVector<f64>> {
        let diff = self.difference(values)?;
        Ok(dvector![diff.norm() - self.max_distance])
    }

    fn linearize(&self, values: &Values) -> SqpResult<JacobianFactor> {
        let diff = self.difference(values)?;
        let distance = diff.norm();
        let direction = if distance > f64::EPSILON {
            diff / distance
        } else {
            DVector::zeros(diff.len())
        };

        let j_a = DMatrix::from_row_slice(1, direction.len(), direction.as_slice());
        let j_b = -j_a.clone();
        JacobianFactor::new(
            vec![(self.keys[0], j_a), (self.keys[1], j_b)],
            dvector![self.max_distance - distance],
        )
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for MaxDistanceConstraint {
    fn dual_key(&self) -> Key {
        self.dual_key
    }
}
