//! Batched postfix tree evaluation — the hot path.
//!
//! [`TreeEvaluator`] computes a tree's outputs over a row range by walking
//! the postfix array front-to-back over fixed-height row batches. A scratch
//! matrix holds one column per node (each a contiguous `batch_size`
//! segment of a flat buffer); leaves are filled from the dataset, operator
//! nodes consume the columns of their children, and the root column is the
//! batch output.
//!
//! The default batch height is 64 rows — small enough that the scratch
//! matrix of a long tree stays cache-resident, large enough to keep the
//! elementwise kernels auto-vectorizable. Tunable via
//! [`TreeEvaluator::with_batch_size`].
//!
//! Evaluation is a pure function of `(tree, dataset, range, batch_size)`:
//! node processing order is strictly ascending by postfix index and no
//! reordering depends on data, so results are bitwise reproducible across
//! runs and thread counts.

use crate::data::{Dataset, Range};
use crate::repr::{Node, NodeType, Tree, TreeValidationError};
use crate::Scalar;

use super::kernels::{apply_unary, AddKernel, DivKernel, MulKernel, NaryKernel, SubKernel};

/// Default evaluator batch height (rows per block).
pub const DEFAULT_BATCH_SIZE: usize = 64;

// =============================================================================
// EvalError
// =============================================================================

/// Evaluation failures surfaced to the caller.
///
/// Numeric pathologies (NaN, ±∞) are *not* errors: candidate expressions
/// routinely produce them and fitness code scores them as infeasible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The tree violates the postfix structural invariants.
    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeValidationError),

    /// The tree references a variable hash the dataset does not have.
    #[error("dataset has no variable with hash {hash}")]
    MissingVariable { hash: u64 },

    /// The requested row range is invalid or exceeds the dataset.
    #[error("rows {start}..{end} out of range for dataset with {rows} rows")]
    OutOfRange {
        start: usize,
        end: usize,
        rows: usize,
    },
}

// =============================================================================
// TreeEvaluator
// =============================================================================

/// Batched evaluator for postfix expression trees.
///
/// Stateless between calls: scratch space is allocated per evaluation, so a
/// single evaluator value can be shared freely across threads.
///
/// # Example
///
/// ```
/// use symreg::{Dataset, Node, NodeType, Range, Tree, TreeEvaluator};
///
/// let dataset = Dataset::from_columns(vec![("x".into(), vec![1.0, 2.0, 3.0])]).unwrap();
/// let x = dataset.variable_by_name("x").unwrap().hash;
/// let tree = Tree::new(vec![
///     Node::variable(x, 2.0),
///     Node::constant(1.0),
///     Node::new(NodeType::Add),
/// ]);
///
/// let output = TreeEvaluator::new()
///     .evaluate(&tree, &dataset, Range::new(0, 3))
///     .unwrap();
/// assert_eq!(output, vec![3.0, 5.0, 7.0]);
/// ```
#[derive(Debug, Clone)]
pub struct TreeEvaluator {
    batch_size: usize,
}

impl TreeEvaluator {
    /// Create an evaluator with the default batch height.
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch height (builder style).
    ///
    /// # Panics
    ///
    /// Debug-panics when `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        debug_assert!(batch_size > 0, "batch size must be positive");
        self.batch_size = batch_size.max(1);
        self
    }

    /// The configured batch height.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Evaluate a tree over a row range, returning `range.size()` outputs.
    ///
    /// # Errors
    ///
    /// [`EvalError::OutOfRange`] for invalid ranges,
    /// [`EvalError::InvalidTree`] for broken postfix invariants,
    /// [`EvalError::MissingVariable`] for unresolved column hashes.
    pub fn evaluate(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        range: Range,
    ) -> Result<Vec<Scalar>, EvalError> {
        let mut output = Vec::new();
        self.evaluate_into(tree, dataset, range, &mut output)?;
        Ok(output)
    }

    /// Evaluate into a caller-provided buffer (cleared first).
    pub fn evaluate_into(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        range: Range,
        output: &mut Vec<Scalar>,
    ) -> Result<(), EvalError> {
        if range.start() > range.end() || range.end() > dataset.rows() {
            return Err(EvalError::OutOfRange {
                start: range.start(),
                end: range.end(),
                rows: dataset.rows(),
            });
        }
        tree.validate()?;

        let nodes = tree.nodes();
        let columns = resolve_columns(nodes, dataset)?;

        output.clear();
        output.reserve(range.size());

        let stride = self.batch_size;
        let mut scratch = vec![0.0; nodes.len() * stride];
        let mut children = Vec::new();
        let root_offset = (nodes.len() - 1) * stride;

        let mut row = range.start();
        while row < range.end() {
            let width = stride.min(range.end() - row);
            fill_batch(&mut scratch, nodes, &columns, row, stride, width, &mut children);
            output.extend_from_slice(&scratch[root_offset..root_offset + width]);
            row += width;
        }
        Ok(())
    }
}

impl Default for TreeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve each variable node's dataset column once, up front.
fn resolve_columns<'d>(
    nodes: &[Node],
    dataset: &'d Dataset,
) -> Result<Vec<&'d [Scalar]>, EvalError> {
    let empty: &[Scalar] = &[];
    let mut columns = vec![empty; nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        if node.is_variable() {
            columns[index] = dataset
                .values_by_hash(node.variable_hash())
                .ok_or(EvalError::MissingVariable {
                    hash: node.variable_hash(),
                })?;
        }
    }
    Ok(columns)
}

/// Evaluate one batch of `width` rows starting at `row`.
///
/// Postfix order guarantees every child column lives strictly left of its
/// parent, so `split_at_mut` at the parent's offset yields the output
/// column mutably alongside all input columns.
fn fill_batch(
    scratch: &mut [Scalar],
    nodes: &[Node],
    columns: &[&[Scalar]],
    row: usize,
    stride: usize,
    width: usize,
    children: &mut Vec<usize>,
) {
    for (index, node) in nodes.iter().enumerate() {
        let (inputs, rest) = scratch.split_at_mut(index * stride);
        let out = &mut rest[..width];

        match node.kind() {
            NodeType::Constant => out.fill(node.value()),
            NodeType::Variable => {
                let column = &columns[index][row..row + width];
                let weight = node.value();
                for (o, &x) in out.iter_mut().zip(column) {
                    *o = weight * x;
                }
            }
            NodeType::Add => {
                dispatch_nary::<AddKernel>(inputs, out, nodes, index, stride, width, children)
            }
            NodeType::Sub => {
                dispatch_nary::<SubKernel>(inputs, out, nodes, index, stride, width, children)
            }
            NodeType::Mul => {
                dispatch_nary::<MulKernel>(inputs, out, nodes, index, stride, width, children)
            }
            NodeType::Div => {
                dispatch_nary::<DivKernel>(inputs, out, nodes, index, stride, width, children)
            }
            NodeType::Log => unary_op(inputs, out, index, stride, width, |x| x.ln()),
            NodeType::Exp => unary_op(inputs, out, index, stride, width, |x| x.exp()),
            NodeType::Sin => unary_op(inputs, out, index, stride, width, |x| x.sin()),
            NodeType::Cos => unary_op(inputs, out, index, stride, width, |x| x.cos()),
            NodeType::Tan => unary_op(inputs, out, index, stride, width, |x| x.tan()),
            NodeType::Sqrt => unary_op(inputs, out, index, stride, width, |x| x.sqrt()),
            NodeType::Cbrt => unary_op(inputs, out, index, stride, width, |x| x.cbrt()),
        }
    }
}

/// Apply a unary kernel to the single child column (always at `index - 1`).
#[inline]
fn unary_op(
    inputs: &[Scalar],
    out: &mut [Scalar],
    index: usize,
    stride: usize,
    width: usize,
    f: impl Fn(Scalar) -> Scalar,
) {
    let child = (index - 1) * stride;
    apply_unary(out, &inputs[child..child + width], f);
}

/// N-ary dispatch: partition the children into groups of up to five,
/// `apply` the first group and `accumulate` each subsequent group.
///
/// The leftward walk from `parent - 1` encounters children in reverse
/// source order; reversing it restores the canonical left-to-right order,
/// which for the non-commutative kinds decides which operand is the
/// minuend/numerator. Source order is also ascending column order, so the
/// traversal is index-deterministic.
fn dispatch_nary<K: NaryKernel>(
    inputs: &[Scalar],
    out: &mut [Scalar],
    nodes: &[Node],
    parent: usize,
    stride: usize,
    width: usize,
    children: &mut Vec<usize>,
) {
    let column = |i: usize| &inputs[i * stride..i * stride + width];

    children.clear();
    let mut child = parent - 1;
    for _ in 0..nodes[parent].arity() {
        children.push(child);
        child = child.wrapping_sub(nodes[child].length() as usize + 1);
    }
    children.reverse();

    let mut continued = false;
    for group in children.chunks(5) {
        match *group {
            [a] => {
                if continued {
                    K::accumulate1(out, column(a));
                } else {
                    K::apply1(out, column(a));
                }
            }
            [a, b] => {
                if continued {
                    K::accumulate2(out, column(a), column(b));
                } else {
                    K::apply2(out, column(a), column(b));
                }
            }
            [a, b, c] => {
                if continued {
                    K::accumulate3(out, column(a), column(b), column(c));
                } else {
                    K::apply3(out, column(a), column(b), column(c));
                }
            }
            [a, b, c, d] => {
                if continued {
                    K::accumulate4(out, column(a), column(b), column(c), column(d));
                } else {
                    K::apply4(out, column(a), column(b), column(c), column(d));
                }
            }
            [a, b, c, d, e] => {
                if continued {
                    K::accumulate5(out, column(a), column(b), column(c), column(d), column(e));
                } else {
                    K::apply5(out, column(a), column(b), column(c), column(d), column(e));
                }
            }
            _ => unreachable!("chunks(5) yields 1..=5 children"),
        }
        continued = true;
    }
}

// =============================================================================
// Tests
// =============================================================================
