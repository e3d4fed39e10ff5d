//! symreg: the batched evaluation core of a genetic-programming symbolic
//! regression system.
//!
//! A GP search loop spends almost all of its time scoring candidate
//! expressions against a dataset, so this crate is built around that hot
//! path: postfix expression trees evaluated over fixed-height row batches,
//! one scratch column per node, with n-ary operator dispatch that keeps
//! writes and intermediate roundings to a minimum.
//!
//! # Key Types
//!
//! - [`Tree`] / [`Node`] / [`NodeType`] - postfix expression representation
//! - [`PrimitiveSet`] - admissible node kinds, frequencies, arity bounds
//! - [`Dataset`] / [`Range`] - column-major numeric table and row intervals
//! - [`TreeEvaluator`] - the batched evaluator
//! - [`NmseEvaluator`] / [`RSquaredEvaluator`] - fitness objectives
//! - [`evaluate_population`] - parallel population driver
//!
//! # Evaluating a tree
//!
//! ```
//! use symreg::{Dataset, Node, NodeType, Range, Tree, TreeEvaluator};
//!
//! let dataset = Dataset::from_columns(vec![
//!     ("x".into(), vec![1.0, 2.0, 3.0, 4.0]),
//! ]).unwrap();
//! let x = dataset.variable_by_name("x").unwrap().hash;
//!
//! // 2·x + 1, in postfix
//! let tree = Tree::new(vec![
//!     Node::variable(x, 2.0),
//!     Node::constant(1.0),
//!     Node::new(NodeType::Add),
//! ]);
//!
//! let output = TreeEvaluator::new()
//!     .evaluate(&tree, &dataset, Range::new(0, 4))
//!     .unwrap();
//! assert_eq!(output, vec![3.0, 5.0, 7.0, 9.0]);
//! ```
//!
//! Structural failures (broken postfix invariants, unknown variables,
//! out-of-range rows) surface as errors; numeric pathologies (NaN, ±∞) do
//! not — they flow through evaluation and the fitness facades score them
//! as infeasible.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod eval;
pub mod fitness;
pub mod grammar;
pub mod metrics;
pub mod repr;
pub mod testing;
pub mod utils;

/// The numeric scalar type of the core.
pub type Scalar = f64;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Expression representation
pub use repr::{Node, NodeType, Tree, TreeValidationError};

// Grammar
pub use grammar::{GrammarError, PrimitiveSet, PrimitiveSetConfig};

// Data handling
pub use data::{read_csv, Dataset, DatasetError, LoadError, Range, Variable};

// Evaluation
pub use eval::{EvalError, TreeEvaluator, DEFAULT_BATCH_SIZE};

// Fitness objectives and the population driver
pub use fitness::{
    evaluate_population, EvaluationCounters, FitnessEvaluator, Individual, LocalOptimizer,
    NmseEvaluator, OptimizerSummary, Problem, RSquaredEvaluator,
};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
