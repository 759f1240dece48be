//! Affine factor produced by linearizing a nonlinear factor
//!
//! A [`JacobianFactor`] stores the first-order model of a factor around a
//! linearization point `x0` as
//! ```text
//! c(x0 ⊕ dx) ≈ sum_j A_j * dx_j - b,   with b = -c(x0)
//! ```
//! one dense block `A_j` per variable key.

use nalgebra::{DMatrix, DVector};

use crate::core::{Key, VectorValues, format_key};
use crate::error::{SqpError, SqpResult};

#[derive(Debug, Clone, PartialEq)]
pub struct JacobianFactor {
    keys: Vec<Key>,
    blocks: Vec<DMatrix<f64>>,
    rhs: DVector<f64>,
}

impl JacobianFactor {
    /// Create a factor from `(key, block)` terms and the right-hand side `b`
    ///
    /// Every block must have as many rows as `rhs`, and keys must be unique.
    pub fn new(terms: Vec<(Key, DMatrix<f64>)>, rhs: DVector<f64>) -> SqpResult<Self> {
        let mut keys = Vec::with_capacity(terms.len());
        let mut blocks = Vec::with_capacity(terms.len());

        for (key, block) in terms {
            if block.nrows() != rhs.len() {
                return Err(SqpError::DimensionMismatch(format!(
                    "block for {} has {} rows, right-hand side has {}",
                    format_key(key),
                    block.nrows(),
                    rhs.len()
                )));
            }
            if keys.contains(&key) {
                return Err(SqpError::DuplicateKey(format!(
                    "Jacobian factor already has a block for {}",
                    format_key(key)
                )));
            }
            keys.push(key);
            blocks.push(block);
        }

        Ok(Self { keys, blocks, rhs })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn blocks(&self) -> &[DMatrix<f64>] {
        &self.blocks
    }

    /// Block associated with `key`, if the factor involves it
    pub fn block(&self, key: Key) -> Option<&DMatrix<f64>> {
        self.keys
            .iter()
            .position(|&k| k == key)
            .map(|idx| &self.blocks[idx])
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Number of rows of the affine model
    pub fn rows(&self) -> usize {
        self.rhs.len()
    }

    /// Iterate over `(key, block)` pairs in construction order
    pub fn iter(&self) -> impl Iterator<Item = (Key, &DMatrix<f64>)> {
        self.keys.iter().copied().zip(self.blocks.iter())
    }

    /// Evaluate `sum_j A_j * delta_j - b`
    pub fn error(&self, delta: &VectorValues) -> SqpResult<DVector<f64>> {
        let mut error = -self.rhs.clone();
        for (key, block) in self.iter() {
            let step = delta.get(key).ok_or_else(|| {
                SqpError::MissingVariable(format!("step has no entry for {}", format_key(key)))
            })?;
            if step.len() != block.ncols() {
                return Err(SqpError::DimensionMismatch(format!(
                    "block for {} has {} columns, step has {} entries",
                    format_key(key),
                    block.ncols(),
                    step.len()
                )));
            }
            error += block * step;
        }
        Ok(error)
    }
}
