//! Core types shared by the constraint layer
//!
//! - Variable identifiers ([`Key`], [`Symbol`])
//! - Primal assignments ([`Values`]) and per-key vectors for steps and
//!   multipliers ([`VectorValues`], [`DualStatus`])

pub mod key;
pub mod values;

pub use key::{Key, Symbol, format_key};
pub use values::{DualStatus, Values, VectorValues};
