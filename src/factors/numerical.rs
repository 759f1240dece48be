//! Closure-defined scalar constraints
//!
//! [`NumericalInequality`] wraps any function `c(&[x_0, x_1, ...]) -> f64` and
//! linearizes it with central differences:
//! ```text
//! dc/dx_j[i] ≈ (c(x + h e_ji) - c(x - h e_ji)) / 2h
//! ```

use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector, dvector};

use crate::core::{Key, Values, format_key};
use crate::error::{SqpError, SqpResult};
use crate::factors::{InequalityConstraint, NonlinearFactor, gather};
use crate::linear::JacobianFactor;

/// Scalar constraint function over the values of the constraint's keys, in key order
pub type ConstraintFn = dyn Fn(&[DVector<f64>]) -> f64 + Send + Sync;

const DEFAULT_STEP: f64 = 1e-6;

#[derive(Clone)]
pub struct NumericalInequality {
    keys: Vec<Key>,
    function: Arc<ConstraintFn>,
    dual_key: Key,
    step: f64,
}

impl NumericalInequality {
    pub fn new<F>(keys: Vec<Key>, dual_key: impl Into<Key>, function: F) -> SqpResult<Self>
    where
        F: Fn(&[DVector<f64>]) -> f64 + Send + Sync + 'static,
    {
        if keys.is_empty() {
            return Err(SqpError::InvalidInput(
                "numerical inequality needs at least one variable".to_string(),
            ));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(SqpError::DuplicateKey(format!(
                    "numerical inequality lists {} twice",
                    format_key(*key)
                )));
            }
        }
        Ok(Self {
            keys,
            function: Arc::new(function),
            dual_key: dual_key.into(),
            step: DEFAULT_STEP,
        })
    }

    /// Set the finite-difference step `h`
    pub fn with_step(mut self, step: f64) -> SqpResult<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(SqpError::InvalidInput(format!(
                "finite-difference step must be positive, got {step}"
            )));
        }
        self.step = step;
        Ok(self)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn point(&self, values: &Values) -> SqpResult<Vec<DVector<f64>>> {
        Ok(gather(values, &self.keys)?
            .into_iter()
            .cloned()
            .collect())
    }
}

impl fmt::Debug for NumericalInequality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericalInequality")
            .field(
                "keys",
                &self.keys.iter().map(|&k| format_key(k)).collect::<Vec<_>>(),
            )
            .field("dual_key", &format_key(self.dual_key))
            .field("step", &self.step)
            .finish()
    }
}

impl NonlinearFactor for NumericalInequality {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, values: &Values) -> SqpResult<DVector<f64>> {
        let x = self.point(values)?;
        Ok(dvector![(self.function)(x.as_slice())])
    }

    fn linearize(&self, values: &Values) -> SqpResult<JacobianFactor> {
        let mut x = self.point(values)?;
        let error = (self.function)(x.as_slice());
        let h = self.step;

        let mut terms = Vec::with_capacity(self.keys.len());
        for (j, &key) in self.keys.iter().enumerate() {
            let dimension = x[j].len();
            let mut block = DMatrix::zeros(1, dimension);
            for i in 0..dimension {
                let original = x[j][i];
                x[j][i] = original + h;
                let forward = (self.function)(x.as_slice());
                x[j][i] = original - h;
                let backward = (self.function)(x.as_slice());
                x[j][i] = original;
                block[(0, i)] = (forward - backward) / (2.0 * h);
            }
            terms.push((key, block));
        }

        JacobianFactor::new(terms, dvector![-error])
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for NumericalInequality {
    fn dual_key(&self) -> Key {
        self.dual_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_disk_constraint() -> SqpResult<()> {
        // x^2 + y^2 - 1 <= 0
        let constraint = NumericalInequality::new(vec![0], 100u64, |x: &[DVector<f64>]| {
            x[0].norm_squared() - 1.0
        })?;
        let mut values = Values::new();
        values.insert(0u64, dvector![0.5, 1.0])?;

        assert!((constraint.scalar_error(&values)? - 0.25).abs() < 1e-12);

        let jacobian = constraint.linearize(&values)?;
        let block = &jacobian.blocks()[0];
        assert!((block[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((block[(0, 1)] - 2.0).abs() < 1e-6);
        assert!((jacobian.rhs()[0] + 0.25).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_two_variable_jacobian() -> SqpResult<()> {
        // x_0 * x_1 - 2 <= 0
        let constraint = NumericalInequality::new(vec![0, 1], 100u64, |x: &[DVector<f64>]| {
            x[0][0] * x[1][0] - 2.0
        })?;
        let mut values = Values::new();
        values.insert(0u64, dvector![3.0])?;
        values.insert(1u64, dvector![0.5])?;

        let jacobian = constraint.linearize(&values)?;
        assert!((jacobian.block(0).unwrap()[(0, 0)] - 0.5).abs() < 1e-6);
        assert!((jacobian.block(1).unwrap()[(0, 0)] - 3.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_invalid_step_rejected() -> SqpResult<()> {
        let constraint = NumericalInequality::new(vec![0], 100u64, |_: &[DVector<f64>]| 0.0)?;
        assert!(constraint.clone().with_step(0.0).is_err());
        assert!(constraint.clone().with_step(f64::INFINITY).is_err());
        assert_eq!(constraint.with_step(1e-4)?.step(), 1e-4);
        Ok(())
    }

    #[test]
    fn test_requires_keys() {
        assert!(NumericalInequality::new(vec![], 100u64, |_: &[DVector<f64>]| 0.0).is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = NumericalInequality::new(vec![0, 1, 0], 100u64, |x: &[DVector<f64>]| {
            x[0][0] - x[2][0]
        });
        assert!(matches!(result, Err(SqpError::DuplicateKey(_))));
    }
}
