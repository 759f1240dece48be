//! Inequality-constraint layer of an SQP iteration
//!
//! - [`NonlinearInequalityFactorGraph`]: linearization of the constraint set
//!   and the feasibility/complementarity oracle
//! - [`KktConfig`], [`KktReport`], [`KktStatus`]: tolerance configuration and
//!   verdicts of the KKT check

pub mod graph;
pub mod kkt;

pub use graph::NonlinearInequalityFactorGraph;
pub use kkt::{KktConfig, KktReport, KktStatus};
