//! Linear factors consumed by the inner QP solve
//!
//! - [`JacobianFactor`]: affine model of a linearized factor
//! - [`LinearInequality`] / [`InequalityFactorGraph`]: scalar linear
//!   inequalities tagged with dual keys
//! - [`Ordering`]: column layout used to stack the graph into a sparse
//!   `faer` matrix

pub mod inequality;
pub mod jacobian;
pub mod ordering;

pub use inequality::{InequalityFactorGraph, LinearInequality};
pub use jacobian::JacobianFactor;
pub use ordering::Ordering;
