//! Fitness metrics: online statistics and regression measures.
//!
//! The calculators ([`MeanVariance`], [`PearsonR`]) accumulate one
//! observation at a time and merge across threads via `combine`; the
//! free functions ([`linear_scale`], [`normalized_mean_squared_error`],
//! [`r_squared`]) operate on whole slices.

mod regression;
mod stats;

pub use regression::{linear_scale, normalized_mean_squared_error, r_squared};
pub use stats::{MeanVariance, PearsonR};

use crate::Scalar;

/// Variance threshold below which a prediction series is treated as
/// constant (degenerate for scaling and correlation).
pub const VARIANCE_EPSILON: Scalar = 1e-12;
