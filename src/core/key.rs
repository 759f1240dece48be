//! Variable identifiers
//!
//! A [`Key`] is a plain `u64`. [`Symbol`] packs an ASCII character into the top
//! byte and an index into the remaining 56 bits, so `x0` (a pose), `l3` (a
//! landmark) and `d1` (a dual variable) stay readable in logs and errors.

use std::fmt;

use crate::error::{SqpError, SqpResult};

/// Unique identifier of a primal or dual variable
pub type Key = u64;

const CHR_BITS: u32 = 8;
const INDEX_BITS: u32 = u64::BITS - CHR_BITS;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Character-plus-index variable name that converts to and from a [`Key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    chr: u8,
    index: u64,
}

impl Symbol {
    /// Create a symbol from an ASCII character and an index below 2^56
    ///
    /// # Panics
    ///
    /// Panics if `chr` is not ASCII or `index` needs more than 56 bits. Use
    /// [`Symbol::try_new`] for names that are not known to fit.
    pub fn new(chr: char, index: u64) -> Self {
        match Self::try_new(chr, index) {
            Ok(symbol) => symbol,
            Err(error) => panic!("{error}"),
        }
    }

    /// Create a symbol, rejecting names that would not survive key packing
    pub fn try_new(chr: char, index: u64) -> SqpResult<Self> {
        if !chr.is_ascii() {
            return Err(SqpError::InvalidInput(format!(
                "symbol character {chr:?} is not ASCII"
            )));
        }
        if index > INDEX_MASK {
            return Err(SqpError::InvalidInput(format!(
                "symbol index {index} does not fit in {INDEX_BITS} bits"
            )));
        }
        Ok(Self {
            chr: chr as u8,
            index,
        })
    }

    /// Recover the symbol packed into `key`
    pub fn from_key(key: Key) -> Self {
        Self {
            chr: (key >> INDEX_BITS) as u8,
            index: key & INDEX_MASK,
        }
    }

    pub fn key(&self) -> Key {
        ((self.chr as u64) << INDEX_BITS) | self.index
    }

    pub fn chr(&self) -> char {
        self.chr as char
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        symbol.key()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.chr(), self.index)
    }
}

/// Human readable form of a key: `x3` for symbol keys, the raw integer otherwise
pub fn format_key(key: Key) -> String {
    let symbol = Symbol::from_key(key);
    if symbol.chr().is_ascii_alphabetic() {
        symbol.to_string()
    } else {
        key.to_string()
    }
}
