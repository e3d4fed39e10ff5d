//! Regression measures over prediction/target slices.

use crate::Scalar;

use super::stats::{MeanVariance, PearsonR};
use super::VARIANCE_EPSILON;

/// Least-squares affine scaling of predictions onto targets.
///
/// Returns `(alpha, beta)` minimizing `‖y − (alpha + beta·ŷ)‖²`:
/// `beta = Cov(ŷ, y) / Var(ŷ)` and `alpha = mean(y) − beta·mean(ŷ)`.
/// When `Var(ŷ)` is below `1e-12` the fit degenerates to the constant
/// model `(mean(y), 0)`.
pub fn linear_scale(predicted: &[Scalar], target: &[Scalar]) -> (Scalar, Scalar) {
    debug_assert_eq!(predicted.len(), target.len());
    let mut calc = PearsonR::new();
    for (&p, &t) in predicted.iter().zip(target) {
        calc.add(p, t);
    }
    let variance = calc.variance_x();
    if variance < VARIANCE_EPSILON {
        return (calc.mean_y(), 0.0);
    }
    let beta = calc.covariance() / variance;
    let alpha = calc.mean_y() - beta * calc.mean_x();
    (alpha, beta)
}

/// Mean squared error divided by target variance.
///
/// `Var(y) = 0` degenerates to `0` for an exact fit and `+∞` otherwise.
pub fn normalized_mean_squared_error(predicted: &[Scalar], target: &[Scalar]) -> Scalar {
    debug_assert_eq!(predicted.len(), target.len());
    let mut errors = MeanVariance::new();
    let mut targets = MeanVariance::new();
    for (&p, &t) in predicted.iter().zip(target) {
        let residual = p - t;
        errors.add(residual * residual);
        targets.add(t);
    }
    let mse = errors.mean();
    let variance = targets.variance();
    if variance == 0.0 {
        if mse == 0.0 {
            0.0
        } else {
            Scalar::INFINITY
        }
    } else {
        mse / variance
    }
}

/// Squared Pearson correlation between predictions and targets.
///
/// NaN when either series is degenerate; the fitness facades clamp that.
pub fn r_squared(predicted: &[Scalar], target: &[Scalar]) -> Scalar {
    debug_assert_eq!(predicted.len(), target.len());
    let mut calc = PearsonR::new();
    for (&p, &t) in predicted.iter().zip(target) {
        calc.add(p, t);
    }
    let r = calc.correlation();
    r * r
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: Scalar = 1e-12;

    #[test]
    fn linear_scale_recovers_affine_map() {
        let predicted: Vec<Scalar> = (0..20).map(|i| i as Scalar).collect();
        let target: Vec<Scalar> = predicted.iter().map(|&p| 3.0 * p - 7.0).collect();
        let (alpha, beta) = linear_scale(&predicted, &target);
        assert_abs_diff_eq!(alpha, -7.0, epsilon = TOL);
        assert_abs_diff_eq!(beta, 3.0, epsilon = TOL);
    }

    #[test]
    fn linear_scale_is_idempotent() {
        let predicted: Vec<Scalar> = (0..30).map(|i| (i as Scalar * 0.3).sin()).collect();
        let target: Vec<Scalar> = predicted
            .iter()
            .enumerate()
            .map(|(i, &p)| 2.0 * p + 0.5 + (i as Scalar * 0.7).cos() * 0.1)
            .collect();

        let (alpha, beta) = linear_scale(&predicted, &target);
        let scaled: Vec<Scalar> = predicted.iter().map(|&p| alpha + beta * p).collect();
        let (alpha2, beta2) = linear_scale(&scaled, &target);
        assert_abs_diff_eq!(alpha2, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(beta2, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn linear_scale_degenerate_predictions() {
        let predicted = vec![2.0; 10];
        let target: Vec<Scalar> = (0..10).map(|i| i as Scalar).collect();
        let (alpha, beta) = linear_scale(&predicted, &target);
        assert_eq!(beta, 0.0);
        assert_abs_diff_eq!(alpha, 4.5, epsilon = TOL);
    }

    #[test]
    fn nmse_zero_iff_exact() {
        let target = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(normalized_mean_squared_error(&target, &target), 0.0);

        let off = [1.0, 2.0, 3.0, 5.0];
        assert!(normalized_mean_squared_error(&off, &target) > 0.0);
    }

    #[test]
    fn nmse_constant_target() {
        let target = [2.0; 4];
        assert_eq!(normalized_mean_squared_error(&[2.0; 4], &target), 0.0);
        assert_eq!(
            normalized_mean_squared_error(&[3.0; 4], &target),
            Scalar::INFINITY
        );
    }

    #[test]
    fn nmse_known_value() {
        // residuals all 1 → mse 1; Var(y) of [1,2,3,4] = 1.25
        let predicted = [2.0, 3.0, 4.0, 5.0];
        let target = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(
            normalized_mean_squared_error(&predicted, &target),
            0.8,
            epsilon = TOL
        );
    }

    #[test]
    fn r_squared_bounds_and_affine_invariance() {
        let target: Vec<Scalar> = (0..25).map(|i| (i as Scalar * 0.31).sin()).collect();
        let predicted: Vec<Scalar> = target.iter().map(|&t| -4.0 * t + 2.0).collect();
        // affine maps have perfect squared correlation
        assert_abs_diff_eq!(r_squared(&predicted, &target), 1.0, epsilon = 1e-10);

        let noisy: Vec<Scalar> = target
            .iter()
            .enumerate()
            .map(|(i, &t)| t + (i as Scalar * 1.7).cos())
            .collect();
        let r2 = r_squared(&noisy, &target);
        assert!((0.0..=1.0).contains(&r2));
    }
}
