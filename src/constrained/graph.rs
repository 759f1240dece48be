//! Collection of nonlinear inequality constraints `c_i(x) <= 0`
//!
//! [`NonlinearInequalityFactorGraph`] provides the two per-iteration services an
//! SQP loop needs from its inequality constraints:
//!
//! - [`linearize`](NonlinearInequalityFactorGraph::linearize): first-order
//!   model of every constraint at the current point, as an
//!   [`InequalityFactorGraph`] for the QP solver
//! - [`check_feasibility_and_complementarity`](NonlinearInequalityFactorGraph::check_feasibility_and_complementarity):
//!   primal feasibility and complementary slackness of a candidate `(x, λ)`
//!
//! Constraints keep their insertion order, and both operations visit them in
//! that order. Neither operation mutates the graph or its inputs.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::constrained::kkt::{KktConfig, KktReport, KktStatus, validate_tolerance};
use crate::core::{DualStatus, Values, VectorValues, format_key};
use crate::error::{SqpError, SqpResult};
use crate::factors::{InequalityConstraint, NonlinearFactor};
use crate::linear::{InequalityFactorGraph, LinearInequality};

#[derive(Debug, Clone, Default)]
pub struct NonlinearInequalityFactorGraph {
    constraints: Vec<Arc<dyn InequalityConstraint>>,
}

impl NonlinearInequalityFactorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint
    pub fn add<C: InequalityConstraint + 'static>(&mut self, constraint: C) {
        self.constraints.push(Arc::new(constraint));
    }

    /// Append a constraint already shared with other graphs
    pub fn add_shared(&mut self, constraint: Arc<dyn InequalityConstraint>) {
        self.constraints.push(constraint);
    }

    /// Append a general factor, which must be an inequality constraint
    ///
    /// Fails with [`SqpError::MissingCapability`] when the factor has no dual
    /// key. Such a factor is never skipped silently: dropping it would relax
    /// the optimization problem.
    pub fn try_add_factor(&mut self, factor: Arc<dyn NonlinearFactor>) -> SqpResult<()> {
        match Arc::clone(&factor).into_inequality() {
            Some(constraint) => {
                self.constraints.push(constraint);
                Ok(())
            }
            None => Err(SqpError::MissingCapability(format!(
                "factor {factor:?} is not an inequality constraint with a dual key"
            ))),
        }
    }

    /// Build a graph from general factors, failing on the first one without
    /// the inequality capability
    pub fn try_from_factors<I>(factors: I) -> SqpResult<Self>
    where
        I: IntoIterator<Item = Arc<dyn NonlinearFactor>>,
    {
        let mut graph = Self::new();
        for factor in factors {
            graph.try_add_factor(factor)?;
        }
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn InequalityConstraint>> {
        self.constraints.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn InequalityConstraint>> {
        self.constraints.iter()
    }

    /// Linearize every constraint at `point`
    ///
    /// The result has one [`LinearInequality`] per constraint, in the same
    /// order and with the same dual key. Any constraint whose linearization is
    /// not a single row aborts the call with [`SqpError::TypeMismatch`].
    pub fn linearize(&self, point: &Values) -> SqpResult<InequalityFactorGraph> {
        let mut linear_graph = InequalityFactorGraph::with_capacity(self.len());

        for constraint in &self.constraints {
            let jacobian = constraint.linearize(point)?;
            let dual_key = constraint.dual_key();
            trace!(
                "Linearized constraint {}: rhs = {:.6e}",
                format_key(dual_key),
                jacobian.rhs().get(0).copied().unwrap_or(f64::NAN)
            );
            linear_graph.add(LinearInequality::from_jacobian(jacobian, dual_key)?);
        }

        debug!("Linearized {} inequality constraints", linear_graph.len());
        Ok(linear_graph)
    }

    /// Check primal feasibility and complementary slackness at `(point, duals)`
    ///
    /// For each constraint, in order: a residual above `tol` fails at once
    /// without evaluating the remaining constraints; a constraint whose dual
    /// key is absent from `duals` is inactive and skipped; an active
    /// constraint must satisfy `|c(x)| <= tol`.
    ///
    /// Violations are reported as `Ok(false)`. `Err` is reserved for
    /// structural failures and for a negative or non-finite `tol`.
    pub fn check_feasibility_and_complementarity(
        &self,
        point: &Values,
        duals: &VectorValues,
        tol: f64,
    ) -> SqpResult<bool> {
        Ok(self.kkt_report(point, duals, tol)?.is_satisfied())
    }

    /// [`check_feasibility_and_complementarity`](Self::check_feasibility_and_complementarity)
    /// with the tolerance taken from `config`
    pub fn check_with_config(
        &self,
        point: &Values,
        duals: &VectorValues,
        config: &KktConfig,
    ) -> SqpResult<bool> {
        self.check_feasibility_and_complementarity(point, duals, config.tolerance)
    }

    /// Same check as
    /// [`check_feasibility_and_complementarity`](Self::check_feasibility_and_complementarity),
    /// reporting which constraint failed and why
    pub fn kkt_report(
        &self,
        point: &Values,
        duals: &VectorValues,
        tol: f64,
    ) -> SqpResult<KktReport> {
        validate_tolerance(tol)?;
        let mut report = KktReport::new(tol);

        for (index, constraint) in self.constraints.iter().enumerate() {
            let error = constraint.scalar_error(point)?;
            let dual_key = constraint.dual_key();
            report.constraints_evaluated += 1;
            if error > report.max_violation {
                report.max_violation = error;
            }
            trace!("Constraint {}: c(x) = {:.6e}", format_key(dual_key), error);

            // A NaN residual is never feasible
            if error > tol || error.is_nan() {
                report.status = KktStatus::PrimalInfeasible {
                    index,
                    dual_key,
                    error,
                };
                debug!("KKT check failed: {}", report.status);
                return Ok(report);
            }

            match duals.dual_status(dual_key) {
                DualStatus::Inactive => continue,
                DualStatus::Active(_) => {
                    report.active_constraints += 1;
                    if error.abs() > tol {
                        report.status = KktStatus::ComplementarityViolated {
                            index,
                            dual_key,
                            error,
                        };
                        debug!("KKT check failed: {}", report.status);
                        return Ok(report);
                    }
                }
            }
        }

        debug!(
            "KKT check satisfied: {} constraints, {} active",
            report.constraints_evaluated, report.active_constraints
        );
        Ok(report)
    }
}

impl<'a> IntoIterator for &'a NonlinearInequalityFactorGraph {
    type Item = &'a Arc<dyn InequalityConstraint>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn InequalityConstraint>>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
