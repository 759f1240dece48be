//! Bound constraints on a single component of a variable
//!
//! ```text
//! upper:  x[i] - upper <= 0
//! lower:  lower - x[i] <= 0
//! ```
//! The Jacobian is a unit row (`+e_i` or `-e_i`) and does not depend on the
//! linearization point.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector, dvector};

use crate::core::{Key, Values, format_key};
use crate::error::{SqpError, SqpResult};
use crate::factors::{InequalityConstraint, NonlinearFactor};
use crate::linear::JacobianFactor;

/// Value of component `index` of `key`, together with the variable dimension
fn component(values: &Values, key: Key, index: usize) -> SqpResult<(f64, usize)> {
    let value = values.at(key)?;
    if index >= value.len() {
        return Err(SqpError::DimensionMismatch(format!(
            "bound on component {} of {} which has dimension {}",
            index,
            format_key(key),
            value.len()
        )));
    }
    Ok((value[index], value.len()))
}

fn unit_row(dimension: usize, index: usize, sign: f64) -> DMatrix<f64> {
    let mut row = DMatrix::zeros(1, dimension);
    row[(0, index)] = sign;
    row
}

/// `x[index] <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct UpperBoundConstraint {
    keys: [Key; 1],
    index: usize,
    upper: f64,
    dual_key: Key,
}

impl UpperBoundConstraint {
    pub fn new(key: impl Into<Key>, index: usize, upper: f64, dual_key: impl Into<Key>) -> Self {
        Self {
            keys: [key.into()],
            index,
            upper,
            dual_key: dual_key.into(),
        }
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl NonlinearFactor for UpperBoundConstraint {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, values: &Values) -> SqpResult<DVector<f64>> {
        let (x, _) = component(values, self.keys[0], self.index)?;
        Ok(dvector![x - self.upper])
    }

    fn linearize(&self, values: &Values) -> SqpResult<JacobianFactor> {
        let (x, dimension) = component(values, self.keys[0], self.index)?;
        JacobianFactor::new(
            vec![(self.keys[0], unit_row(dimension, self.index, 1.0))],
            dvector![self.upper - x],
        )
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for UpperBoundConstraint {
    fn dual_key(&self) -> Key {
        self.dual_key
    }
}

/// `x[index] >= lower`
#[derive(Debug, Clone, PartialEq)]
pub struct LowerBoundConstraint {
    keys: [Key; 1],
    index: usize,
    lower: f64,
    dual_key: Key,
}

impl LowerBoundConstraint {
    pub fn new(key: impl Into<Key>, index: usize, lower: f64, dual_key: impl Into<Key>) -> Self {
        Self {
            keys: [key.into()],
            index,
            lower,
            dual_key: dual_key.into(),
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl NonlinearFactor for LowerBoundConstraint {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, values: &Values) -> SqpResult<DVector<f64>> {
        let (x, _) = component(values, self.keys[0], self.index)?;
        Ok(dvector![self.lower - x])
    }

    fn linearize(&self, values: &Values) -> SqpResult<JacobianFactor> {
        let (x, dimension) = component(values, self.keys[0], self.index)?;
        JacobianFactor::new(
            vec![(self.keys[0], unit_row(dimension, self.index, -1.0))],
            dvector![x - self.lower],
        )
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for LowerBoundConstraint {
    fn dual_key(&self) -> Key {
        self.dual_key
    }
}
