//! Integration tests for the inequality-constraint layer of an SQP iteration
//!
//! Covers the two services the outer loop relies on:
//! - linearization of a mixed constraint set into tagged linear inequalities
//! - the feasibility/complementarity check, including its short-circuit

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use apex_constraints::{
    AffineInequalityConstraint, InequalityConstraint, JacobianFactor, Key, KktStatus,
    LowerBoundConstraint, MaxDistanceConstraint, NonlinearFactor, NonlinearInequalityFactorGraph,
    NumericalInequality, Ordering, SqpResult, Symbol, UpperBoundConstraint, Values, VectorValues,
};
use nalgebra::{DMatrix, DVector, dvector};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn x(i: u64) -> Key {
    Symbol::new('x', i).key()
}

fn d(i: u64) -> Key {
    Symbol::new('d', i).key()
}

/// Constraint returning a preset residual, counting its evaluations
#[derive(Debug)]
struct CountingConstraint {
    keys: [Key; 1],
    residual: f64,
    dual_key: Key,
    evaluations: Arc<AtomicUsize>,
}

impl CountingConstraint {
    fn new(residual: f64, dual_key: Key, evaluations: Arc<AtomicUsize>) -> Self {
        Self {
            keys: [x(0)],
            residual,
            dual_key,
            evaluations,
        }
    }
}

impl NonlinearFactor for CountingConstraint {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, _values: &Values) -> SqpResult<DVector<f64>> {
        self.evaluations.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(dvector![self.residual])
    }

    fn linearize(&self, _values: &Values) -> SqpResult<JacobianFactor> {
        JacobianFactor::new(
            vec![(self.keys[0], DMatrix::from_element(1, 1, 1.0))],
            dvector![-self.residual],
        )
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for CountingConstraint {
    fn dual_key(&self) -> Key {
        self.dual_key
    }
}

/// Constraint that must never be evaluated
#[derive(Debug)]
struct PoisonedConstraint {
    keys: [Key; 1],
}

impl NonlinearFactor for PoisonedConstraint {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        1
    }

    fn unwhitened_error(&self, _values: &Values) -> SqpResult<DVector<f64>> {
        panic!("constraint after a primal violation was evaluated");
    }

    fn linearize(&self, _values: &Values) -> SqpResult<JacobianFactor> {
        panic!("poisoned constraint linearized");
    }

    fn into_inequality(self: Arc<Self>) -> Option<Arc<dyn InequalityConstraint>> {
        Some(self)
    }
}

impl InequalityConstraint for PoisonedConstraint {
    fn dual_key(&self) -> Key {
        d(99)
    }
}

fn fixed_graph(
    residuals: &[f64],
    evaluations: &Arc<AtomicUsize>,
) -> NonlinearInequalityFactorGraph {
    let mut graph = NonlinearInequalityFactorGraph::new();
    for (i, &r) in residuals.iter().enumerate() {
        graph.add(CountingConstraint::new(r, d(i as u64), Arc::clone(evaluations)));
    }
    graph
}

#[test]
fn test_inactive_first_and_active_second_within_tolerance() -> TestResult {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let graph = fixed_graph(&[-0.1, 0.05], &evaluations);
    let mut duals = VectorValues::new();
    duals.insert(d(1), dvector![1.0])?;

    assert!(graph.check_feasibility_and_complementarity(&Values::new(), &duals, 0.2)?);
    assert_eq!(evaluations.load(AtomicOrdering::SeqCst), 2);

    let violated = fixed_graph(&[-0.1, 0.3], &evaluations);
    assert!(!violated.check_feasibility_and_complementarity(&Values::new(), &duals, 0.2)?);
    Ok(())
}

#[test]
fn test_primal_violation_short_circuits() -> TestResult {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let mut graph = fixed_graph(&[0.5], &evaluations);
    graph.add(PoisonedConstraint { keys: [x(0)] });

    let report = graph.kkt_report(&Values::new(), &VectorValues::new(), 0.1)?;

    assert!(matches!(
        report.status,
        KktStatus::PrimalInfeasible { index: 0, .. }
    ));
    assert_eq!(report.constraints_evaluated, 1);
    assert_eq!(evaluations.load(AtomicOrdering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_complementarity_violation_also_stops_evaluation() -> TestResult {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let mut graph = fixed_graph(&[-0.4], &evaluations);
    graph.add(PoisonedConstraint { keys: [x(0)] });
    let mut duals = VectorValues::new();
    duals.insert(d(0), dvector![0.0])?;

    // A zero multiplier still marks the constraint active
    assert!(!graph.check_feasibility_and_complementarity(&Values::new(), &duals, 0.1)?);
    Ok(())
}

#[test]
fn test_mixed_constraints_linearize_in_order() -> TestResult {
    let mut graph = NonlinearInequalityFactorGraph::new();
    graph.add(UpperBoundConstraint::new(x(0), 0, 2.0, d(0)));
    graph.add(MaxDistanceConstraint::new(x(0), x(1), 1.0, d(1))?);
    graph.add(LowerBoundConstraint::new(x(1), 1, -1.0, d(2)));
    graph.add(NumericalInequality::new(vec![x(1)], d(3), |v: &[DVector<f64>]| {
        v[0].norm_squared() - 4.0
    })?);
    graph.add(AffineInequalityConstraint::new(
        vec![(x(0), dvector![1.0, 0.0]), (x(1), dvector![0.0, 1.0])],
        3.0,
        d(4),
    )?);

    let mut point = Values::new();
    point.insert(x(0), dvector![0.0, 0.0])?;
    point.insert(x(1), dvector![0.6, 0.8])?;

    let linear = graph.linearize(&point)?;
    assert_eq!(linear.len(), graph.len());
    assert_eq!(linear.dual_keys(), vec![d(0), d(1), d(2), d(3), d(4)]);

    // Every linear row reproduces the nonlinear residual at dx = 0: A*0 - b = c(x0)
    let zero_step: VectorValues = [(x(0), dvector![0.0, 0.0]), (x(1), dvector![0.0, 0.0])]
        .into_iter()
        .collect();
    let errors = linear.errors(&zero_step)?;
    for (i, constraint) in graph.iter().enumerate() {
        assert!((errors[i] - constraint.scalar_error(&point)?).abs() < 1e-9);
    }

    // Distance Jacobian points from x1 towards x0
    let distance_row = linear.get(1).ok_or("missing row")?;
    let j_x0 = distance_row.coefficients(x(0)).ok_or("missing block")?;
    assert!((j_x0[(0, 0)] + 0.6).abs() < 1e-12);
    assert!((j_x0[(0, 1)] + 0.8).abs() < 1e-12);

    let ordering = Ordering::from_values(&point);
    let (matrix, rhs) = linear.to_sparse(&ordering)?;
    assert_eq!(matrix.nrows(), 5);
    assert_eq!(matrix.ncols(), 4);
    assert!((rhs[(0, 0)] - 2.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_linearize_aborts_on_missing_variable() -> TestResult {
    let mut graph = NonlinearInequalityFactorGraph::new();
    graph.add(UpperBoundConstraint::new(x(0), 0, 1.0, d(0)));
    graph.add(UpperBoundConstraint::new(x(5), 0, 1.0, d(1)));

    let mut point = Values::new();
    point.insert(x(0), dvector![0.0])?;

    assert!(graph.linearize(&point).is_err());
    Ok(())
}

#[test]
fn test_one_sqp_step_reaches_active_bound() -> TestResult {
    // minimize (x - 2)^2 subject to x <= 1, starting from x = 0.5
    let mut graph = NonlinearInequalityFactorGraph::new();
    graph.add(UpperBoundConstraint::new(x(0), 0, 1.0, d(0)));

    let mut point = Values::new();
    point.insert(x(0), dvector![0.5])?;

    let mut no_duals = VectorValues::new();
    assert!(graph.check_feasibility_and_complementarity(&point, &no_duals, 1e-9)?);

    let linear = graph.linearize(&point)?;
    let row = linear.get(0).ok_or("missing row")?;
    assert!((row.rhs() - 0.5).abs() < 1e-12);

    // The QP step dx = 0.5 lands on the linearized bound, which becomes active
    let step: VectorValues = [(x(0), dvector![0.5])].into_iter().collect();
    assert!(row.is_satisfied(&step, 1e-12)?);
    let next = point.retract(&step)?;

    let mut duals = VectorValues::new();
    duals.insert(d(0), dvector![2.0])?;
    assert!(graph.check_feasibility_and_complementarity(&next, &duals, 1e-9)?);

    // Overshooting the bound is caught as a primal violation
    let overshoot = point.retract(&[(x(0), dvector![0.7])].into_iter().collect())?;
    assert!(!graph.check_feasibility_and_complementarity(&overshoot, &duals, 1e-9)?);

    // A multiplier under an unrelated key leaves the bound inactive
    no_duals.insert(d(1), dvector![1.0])?;
    assert!(graph.check_feasibility_and_complementarity(&point, &no_duals, 1e-9)?);
    Ok(())
}

#[test]
fn test_user_constraints_admitted_as_general_factors() -> TestResult {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let factors: Vec<Arc<dyn NonlinearFactor>> = vec![
        Arc::new(CountingConstraint::new(-0.1, d(0), Arc::clone(&evaluations))),
        Arc::new(UpperBoundConstraint::new(x(0), 0, 1.0, d(1))),
    ];

    let graph = NonlinearInequalityFactorGraph::try_from_factors(factors)?;
    assert_eq!(graph.len(), 2);

    let mut point = Values::new();
    point.insert(x(0), dvector![0.5])?;
    let linear = graph.linearize(&point)?;
    assert_eq!(linear.dual_keys(), vec![d(0), d(1)]);
    Ok(())
}
