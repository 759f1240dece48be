//! # Apex Constraints
//!
//! Inequality-constraint support for sequential quadratic programming (SQP)
//! over factor graphs. Each SQP iteration needs two things from its
//! constraints `c_i(x) <= 0`:
//!
//! - **Linearization**: a first-order model of every constraint at the
//!   current estimate, as linear inequalities tagged with the dual key of their
//!   source, ready for an active-set QP solver
//! - **KKT check**: whether a candidate primal/dual pair satisfies primal
//!   feasibility and complementary slackness within a tolerance
//!
//! ## Example
//!
//! ```
//! use apex_constraints::{
//!     NonlinearInequalityFactorGraph, Symbol, UpperBoundConstraint, Values, VectorValues,
//! };
//! use nalgebra::dvector;
//!
//! # fn main() -> apex_constraints::SqpResult<()> {
//! let mut graph = NonlinearInequalityFactorGraph::new();
//! graph.add(UpperBoundConstraint::new(Symbol::new('x', 0), 0, 1.0, Symbol::new('d', 0)));
//!
//! let mut point = Values::new();
//! point.insert(Symbol::new('x', 0), dvector![1.0, 0.0])?;
//!
//! let linear = graph.linearize(&point)?;
//! assert_eq!(linear.len(), 1);
//!
//! // x[0] = 1.0 sits on its bound, so the constraint may be active
//! let mut duals = VectorValues::new();
//! duals.insert(Symbol::new('d', 0), dvector![0.5])?;
//! assert!(graph.check_feasibility_and_complementarity(&point, &duals, 1e-9)?);
//! # Ok(())
//! # }
//! ```
//!
//! Only scalar constraints are supported: a constraint whose residual or
//! linearization has more than one row is rejected with
//! [`SqpError::TypeMismatch`].

pub mod constrained;
pub mod core;
pub mod error;
pub mod factors;
pub mod linear;
pub mod logger;

pub use constrained::{KktConfig, KktReport, KktStatus, NonlinearInequalityFactorGraph};
pub use crate::core::{DualStatus, Key, Symbol, Values, VectorValues, format_key};
pub use error::{SqpError, SqpResult};
pub use factors::{
    AffineInequalityConstraint, InequalityConstraint, LowerBoundConstraint,
    MaxDistanceConstraint, NonlinearFactor, NumericalInequality, UpperBoundConstraint,
};
pub use linear::{InequalityFactorGraph, JacobianFactor, LinearInequality, Ordering};
pub use logger::{init_logger, init_logger_with_level};
