//! Local optimizer collaborator contract.
//!
//! Nonlinear least-squares tuning of tree constants is performed by an
//! external component; the fitness facades only need this call shape.

use crate::data::{Dataset, Range};
use crate::repr::Tree;
use crate::Scalar;

/// Outcome of a local optimization run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSummary {
    /// Iterations actually performed (accounted against the local
    /// evaluation counter).
    pub iterations: usize,
    /// Residual norm after the final iteration.
    pub final_residual: Scalar,
}

/// Tunes the `Constant` node values of a tree against target values over a
/// row range.
///
/// Implementations mutate constant values in place through
/// [`Tree::nodes_mut`] and must preserve every other node field — in
/// particular variable weights, which participate in tree identity hashes.
pub trait LocalOptimizer: Send + Sync {
    fn optimize(
        &self,
        tree: &mut Tree,
        dataset: &Dataset,
        target: &[Scalar],
        range: Range,
        max_iterations: usize,
    ) -> OptimizerSummary;
}
