//! Column layout of the stacked constraint matrix

use std::collections::HashMap;

use crate::core::{Key, Values, format_key};
use crate::error::{SqpError, SqpResult};

/// Maps each variable key to its column offset and dimension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    keys: Vec<Key>,
    columns: HashMap<Key, (usize, usize)>,
    total_dimension: usize,
}

impl Ordering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordering over every variable of `values`, in ascending key order
    pub fn from_values(values: &Values) -> Self {
        let mut ordering = Self::new();
        for key in values.keys() {
            if let Some(value) = values.get(key) {
                ordering.append(key, value.len());
            }
        }
        ordering
    }

    /// Append `key` with `dimension` columns after the current last variable
    pub fn push(&mut self, key: Key, dimension: usize) -> SqpResult<()> {
        if self.columns.contains_key(&key) {
            return Err(SqpError::DuplicateKey(format!(
                "{} is already in the ordering",
                format_key(key)
            )));
        }
        self.append(key, dimension);
        Ok(())
    }

    fn append(&mut self, key: Key, dimension: usize) {
        self.columns.insert(key, (self.total_dimension, dimension));
        self.keys.push(key);
        self.total_dimension += dimension;
    }

    /// `(offset, dimension)` of `key`
    pub fn column(&self, key: Key) -> Option<(usize, usize)> {
        self.columns.get(&key).copied()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn total_dimension(&self) -> usize {
        self.total_dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn test_offsets_accumulate() -> SqpResult<()> {
        let mut ordering = Ordering::new();
        ordering.push(10, 3)?;
        ordering.push(4, 2)?;

        assert_eq!(ordering.column(10), Some((0, 3)));
        assert_eq!(ordering.column(4), Some((3, 2)));
        assert_eq!(ordering.total_dimension(), 5);
        assert!(matches!(ordering.push(4, 1), Err(SqpError::DuplicateKey(_))));
        Ok(())
    }

    #[test]
    fn test_from_values_sorted_by_key() -> SqpResult<()> {
        let mut values = Values::new();
        values.insert(2u64, dvector![0.0])?;
        values.insert(1u64, dvector![0.0, 0.0])?;

        let ordering = Ordering::from_values(&values);
        assert_eq!(ordering.keys(), &[1, 2]);
        assert_eq!(ordering.column(2), Some((2, 1)));
        Ok(())
    }
}
