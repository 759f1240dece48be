//! Primal and dual variable assignments
//!
//! [`Values`] holds the linearization point of the nonlinear problem.
//! [`VectorValues`] holds per-key vectors in the tangent space: linear steps
//! produced by the QP solve, and Lagrange multipliers of the active
//! constraints. For multipliers, the presence of a key carries meaning on its
//! own, see [`DualStatus`].

use std::collections::HashMap;

use nalgebra::DVector;

use crate::core::key::{Key, format_key};
use crate::error::{SqpError, SqpResult};

/// Variable assignment used as linearization point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    values: HashMap<Key, DVector<f64>>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new variable, failing if the key is already assigned
    pub fn insert(&mut self, key: impl Into<Key>, value: DVector<f64>) -> SqpResult<()> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(SqpError::DuplicateKey(format!(
                "variable {} is already assigned",
                format_key(key)
            )));
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Replace the value of an existing variable
    pub fn update(&mut self, key: impl Into<Key>, value: DVector<f64>) -> SqpResult<()> {
        let key = key.into();
        let slot = self.values.get_mut(&key).ok_or_else(|| {
            SqpError::MissingVariable(format!(
                "cannot update unassigned variable {}",
                format_key(key)
            ))
        })?;
        if slot.len() != value.len() {
            return Err(SqpError::DimensionMismatch(format!(
                "variable {} has dimension {}, update has {}",
                format_key(key),
                slot.len(),
                value.len()
            )));
        }
        *slot = value;
        Ok(())
    }

    /// Value of `key`, or a missing-variable error
    pub fn at(&self, key: Key) -> SqpResult<&DVector<f64>> {
        self.values.get(&key).ok_or_else(|| {
            SqpError::MissingVariable(format!(
                "variable {} is not in the linearization point",
                format_key(key)
            ))
        })
    }

    pub fn get(&self, key: Key) -> Option<&DVector<f64>> {
        self.values.get(&key)
    }

    pub fn exists(&self, key: Key) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.values.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &DVector<f64>)> {
        self.values.iter()
    }

    /// Apply a linear step: `x_k + delta_k` for every key of `delta`
    ///
    /// Variables without an entry in `delta` are copied unchanged. Every key
    /// of `delta` must already be assigned with the same dimension.
    pub fn retract(&self, delta: &VectorValues) -> SqpResult<Values> {
        let mut result = self.clone();
        for (&key, step) in delta.iter() {
            let current = result.values.get_mut(&key).ok_or_else(|| {
                SqpError::MissingVariable(format!(
                    "step references unassigned variable {}",
                    format_key(key)
                ))
            })?;
            if current.len() != step.len() {
                return Err(SqpError::DimensionMismatch(format!(
                    "variable {} has dimension {}, step has {}",
                    format_key(key),
                    current.len(),
                    step.len()
                )));
            }
            *current += step;
        }
        Ok(result)
    }
}

/// Whether a constraint currently carries a multiplier
///
/// A dual key absent from the dual assignment marks the constraint inactive.
/// It is not the same as an active constraint with a zero multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DualStatus<'a> {
    Active(&'a DVector<f64>),
    Inactive,
}

impl DualStatus<'_> {
    pub fn is_active(&self) -> bool {
        matches!(self, DualStatus::Active(_))
    }
}

/// Per-key vectors: linear steps or Lagrange multipliers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorValues {
    values: HashMap<Key, DVector<f64>>,
}

impl VectorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry, failing if the key is already present
    pub fn insert(&mut self, key: impl Into<Key>, value: DVector<f64>) -> SqpResult<()> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(SqpError::DuplicateKey(format!(
                "vector {} is already present",
                format_key(key)
            )));
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Insert or overwrite an entry
    pub fn insert_or_assign(&mut self, key: impl Into<Key>, value: DVector<f64>) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: Key) -> Option<DVector<f64>> {
        self.values.remove(&key)
    }

    pub fn get(&self, key: Key) -> Option<&DVector<f64>> {
        self.values.get(&key)
    }

    pub fn exists(&self, key: Key) -> bool {
        self.values.contains_key(&key)
    }

    /// Active/inactive classification of the constraint owning `dual_key`
    pub fn dual_status(&self, dual_key: Key) -> DualStatus<'_> {
        match self.values.get(&dual_key) {
            Some(multiplier) => DualStatus::Active(multiplier),
            None => DualStatus::Inactive,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &DVector<f64>)> {
        self.values.iter()
    }
}

impl FromIterator<(Key, DVector<f64>)> for VectorValues {
    fn from_iter<I: IntoIterator<Item = (Key, DVector<f64>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
