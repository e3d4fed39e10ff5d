//! Batched expression evaluation.
//!
//! [`TreeEvaluator`] walks a postfix tree over fixed-height row batches,
//! one scratch column per node, invoking monomorphic per-kind kernels.
//! This is the crate's hot path.

mod evaluator;
mod kernels;

pub use evaluator::{EvalError, TreeEvaluator, DEFAULT_BATCH_SIZE};
