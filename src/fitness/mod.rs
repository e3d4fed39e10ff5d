//! Fitness objectives and the population driver.
//!
//! Two facades score an [`Individual`] against a [`Problem`]:
//!
//! - [`NmseEvaluator`]: linear-scaled normalized mean squared error,
//!   minimized, bounded below by 0 with `Scalar::MAX` as the infeasible
//!   sentinel.
//! - [`RSquaredEvaluator`]: `1 − R²`, bounded in `[0, 1]` with 0 meaning a
//!   perfect fit; degenerate constant predictions score the upper bound.
//!
//! Both optionally run an external [`LocalOptimizer`] over the tree's
//! constants first, and both keep relaxed atomic evaluation counters so a
//! caller can enforce an evaluation budget between individuals.

mod driver;
mod optimizer;
mod problem;

pub use driver::evaluate_population;
pub use optimizer::{LocalOptimizer, OptimizerSummary};
pub use problem::{Individual, Problem};

use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;

use crate::eval::{EvalError, TreeEvaluator};
use crate::metrics::{
    linear_scale, normalized_mean_squared_error, PearsonR, VARIANCE_EPSILON,
};
use crate::Scalar;

// =============================================================================
// EvaluationCounters
// =============================================================================

/// Relaxed atomic counters shared by worker threads.
///
/// Counts are eventually correct; no global monotonicity is promised while
/// workers are in flight.
#[derive(Debug, Default)]
pub struct EvaluationCounters {
    fitness: AtomicU64,
    local: AtomicU64,
}

impl EvaluationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_fitness(&self) {
        self.fitness.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_local(&self, iterations: u64) {
        self.local.fetch_add(iterations, Ordering::Relaxed);
    }

    /// Number of fitness evaluations performed.
    #[inline]
    pub fn fitness_evaluations(&self) -> u64 {
        self.fitness.load(Ordering::Relaxed)
    }

    /// Number of local-optimizer iterations performed.
    #[inline]
    pub fn local_evaluations(&self) -> u64 {
        self.local.load(Ordering::Relaxed)
    }

    /// Fitness plus local evaluations.
    #[inline]
    pub fn total_evaluations(&self) -> u64 {
        self.fitness_evaluations() + self.local_evaluations()
    }

    pub fn reset(&self) {
        self.fitness.store(0, Ordering::Relaxed);
        self.local.store(0, Ordering::Relaxed);
    }
}

// =============================================================================
// FitnessEvaluator
// =============================================================================

/// A fitness objective over individuals.
///
/// All fitness values are minimized. `rng` is part of the contract for
/// stochastic objectives; the two built-in facades are deterministic and
/// ignore it.
pub trait FitnessEvaluator: Send + Sync {
    /// Score one individual, running local optimization first when
    /// configured. Increments the fitness counter.
    ///
    /// # Errors
    ///
    /// Structural and lookup failures propagate as [`EvalError`]; numeric
    /// pathologies do not — they map to [`FitnessEvaluator::worst`]-grade
    /// scores.
    fn evaluate_individual(
        &self,
        rng: &mut dyn RngCore,
        individual: &mut Individual,
    ) -> Result<Scalar, EvalError>;

    /// Shared evaluation counters.
    fn counters(&self) -> &EvaluationCounters;

    /// Fitness evaluation budget; 0 means unlimited.
    fn budget(&self) -> u64;

    /// Whether the budget has been consumed.
    fn budget_exhausted(&self) -> bool {
        let budget = self.budget();
        budget > 0 && self.counters().fitness_evaluations() >= budget
    }

    /// The worst representable fitness for this objective.
    fn worst(&self) -> Scalar;

    fn name(&self) -> &'static str;
}

// =============================================================================
// NmseEvaluator
// =============================================================================

/// Normalized-mean-squared-error objective with linear scaling.
///
/// Predictions are affinely rescaled onto the target before the error is
/// computed, so candidate trees are judged on shape rather than offset and
/// scale. Non-finite or negative error collapses to `Scalar::MAX`.
pub struct NmseEvaluator<'a> {
    problem: &'a Problem,
    evaluator: TreeEvaluator,
    optimizer: Option<&'a dyn LocalOptimizer>,
    local_iterations: usize,
    budget: u64,
    counters: EvaluationCounters,
}

impl<'a> NmseEvaluator<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            evaluator: TreeEvaluator::new(),
            optimizer: None,
            local_iterations: 0,
            budget: 0,
            counters: EvaluationCounters::new(),
        }
    }

    /// Attach a local optimizer, run for up to `iterations` per individual.
    /// Zero iterations disable it.
    pub fn with_local_optimizer(
        mut self,
        optimizer: &'a dyn LocalOptimizer,
        iterations: usize,
    ) -> Self {
        self.optimizer = Some(optimizer);
        self.local_iterations = iterations;
        self
    }

    /// Cap the number of fitness evaluations; 0 means unlimited.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the tree evaluator (e.g. to change the batch size).
    pub fn with_tree_evaluator(mut self, evaluator: TreeEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }
}

impl FitnessEvaluator for NmseEvaluator<'_> {
    fn evaluate_individual(
        &self,
        _rng: &mut dyn RngCore,
        individual: &mut Individual,
    ) -> Result<Scalar, EvalError> {
        self.counters.record_fitness();

        let problem = self.problem;
        let range = problem.training_range();
        let target = problem.training_target();

        if self.local_iterations > 0 {
            if let Some(optimizer) = self.optimizer {
                let summary = optimizer.optimize(
                    &mut individual.tree,
                    problem.dataset(),
                    target,
                    range,
                    self.local_iterations,
                );
                self.counters.record_local(summary.iterations as u64);
            }
        }

        let mut predicted = self
            .evaluator
            .evaluate(&individual.tree, problem.dataset(), range)?;
        let (alpha, beta) = linear_scale(&predicted, target);
        for value in &mut predicted {
            *value = beta * *value + alpha;
        }

        let nmse = normalized_mean_squared_error(&predicted, target);
        if !nmse.is_finite() || nmse < 0.0 {
            return Ok(Scalar::MAX);
        }
        Ok(nmse)
    }

    fn counters(&self) -> &EvaluationCounters {
        &self.counters
    }

    fn budget(&self) -> u64 {
        self.budget
    }

    fn worst(&self) -> Scalar {
        Scalar::MAX
    }

    fn name(&self) -> &'static str {
        "nmse"
    }
}

// =============================================================================
// RSquaredEvaluator
// =============================================================================

/// `1 − R²` objective: squared Pearson correlation between prediction and
/// target, flipped into minimization form.
///
/// A prediction series with variance under `1e-12` scores the upper bound:
/// near-constant models can correlate deceptively well with the target yet
/// fail to scale, so they are neutralized outright.
pub struct RSquaredEvaluator<'a> {
    problem: &'a Problem,
    evaluator: TreeEvaluator,
    optimizer: Option<&'a dyn LocalOptimizer>,
    local_iterations: usize,
    budget: u64,
    counters: EvaluationCounters,
}

impl<'a> RSquaredEvaluator<'a> {
    /// Lower bound of the objective (perfect fit).
    pub const LOWER_BOUND: Scalar = 0.0;
    /// Upper bound of the objective (no fit).
    pub const UPPER_BOUND: Scalar = 1.0;

    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            evaluator: TreeEvaluator::new(),
            optimizer: None,
            local_iterations: 0,
            budget: 0,
            counters: EvaluationCounters::new(),
        }
    }

    /// Attach a local optimizer, run for up to `iterations` per individual.
    /// Zero iterations disable it.
    pub fn with_local_optimizer(
        mut self,
        optimizer: &'a dyn LocalOptimizer,
        iterations: usize,
    ) -> Self {
        self.optimizer = Some(optimizer);
        self.local_iterations = iterations;
        self
    }

    /// Cap the number of fitness evaluations; 0 means unlimited.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the tree evaluator (e.g. to change the batch size).
    pub fn with_tree_evaluator(mut self, evaluator: TreeEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }
}

impl FitnessEvaluator for RSquaredEvaluator<'_> {
    fn evaluate_individual(
        &self,
        _rng: &mut dyn RngCore,
        individual: &mut Individual,
    ) -> Result<Scalar, EvalError> {
        self.counters.record_fitness();

        let problem = self.problem;
        let range = problem.training_range();
        let target = problem.training_target();

        if self.local_iterations > 0 {
            if let Some(optimizer) = self.optimizer {
                let summary = optimizer.optimize(
                    &mut individual.tree,
                    problem.dataset(),
                    target,
                    range,
                    self.local_iterations,
                );
                self.counters.record_local(summary.iterations as u64);
            }
        }

        let predicted = self
            .evaluator
            .evaluate(&individual.tree, problem.dataset(), range)?;

        let mut calc = PearsonR::new();
        for (&p, &t) in predicted.iter().zip(target) {
            calc.add(p, t);
        }
        if calc.variance_x() < VARIANCE_EPSILON {
            return Ok(Self::UPPER_BOUND);
        }

        let r = calc.correlation();
        let mut r2 = r * r;
        if !r2.is_finite() || !(Self::LOWER_BOUND..=Self::UPPER_BOUND).contains(&r2) {
            r2 = 0.0;
        }
        Ok(Self::UPPER_BOUND - r2)
    }

    fn counters(&self) -> &EvaluationCounters {
        &self.counters
    }

    fn budget(&self) -> u64 {
        self.budget
    }

    fn worst(&self) -> Scalar {
        Self::UPPER_BOUND
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

// =============================================================================
// Tests
// =============================================================================
