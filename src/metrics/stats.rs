//! Online statistics calculators.
//!
//! Both calculators use Welford-style updates so single-pass accumulation
//! stays numerically stable, and both support `combine` so partial
//! statistics from different threads can be tree-reduced.

use crate::Scalar;

// =============================================================================
// MeanVariance
// =============================================================================

/// Online mean and population variance.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanVariance {
    count: Scalar,
    mean: Scalar,
    m2: Scalar,
}

impl MeanVariance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    #[inline]
    pub fn add(&mut self, x: Scalar) {
        self.count += 1.0;
        let delta = x - self.mean;
        self.mean += delta / self.count;
        self.m2 += delta * (x - self.mean);
    }

    /// Merge another calculator's partial statistics into this one.
    pub fn combine(&mut self, other: &MeanVariance) {
        if other.count == 0.0 {
            return;
        }
        if self.count == 0.0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count / total;
        self.m2 += other.m2 + delta * delta * self.count * other.count / total;
        self.count = total;
    }

    #[inline]
    pub fn count(&self) -> Scalar {
        self.count
    }

    #[inline]
    pub fn mean(&self) -> Scalar {
        self.mean
    }

    /// Population variance (zero until at least one observation).
    #[inline]
    pub fn variance(&self) -> Scalar {
        if self.count > 0.0 {
            self.m2 / self.count
        } else {
            0.0
        }
    }
}

// =============================================================================
// PearsonR
// =============================================================================

/// Online Pearson correlation over paired observations.
///
/// Tracks means and centered co-moments of both series; exposes the
/// correlation, per-series population variances, and the covariance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonR {
    count: Scalar,
    mean_x: Scalar,
    mean_y: Scalar,
    sxx: Scalar,
    syy: Scalar,
    sxy: Scalar,
}

impl PearsonR {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `(x, y)` pair.
    #[inline]
    pub fn add(&mut self, x: Scalar, y: Scalar) {
        self.count += 1.0;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / self.count;
        self.mean_y += dy / self.count;
        // dx is pre-update, (x - mean_x) post-update; their product
        // telescopes into the exact centered moment.
        self.sxx += dx * (x - self.mean_x);
        self.syy += dy * (y - self.mean_y);
        self.sxy += dx * (y - self.mean_y);
    }

    /// Merge another calculator's partial statistics into this one.
    pub fn combine(&mut self, other: &PearsonR) {
        if other.count == 0.0 {
            return;
        }
        if self.count == 0.0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let scale = self.count * other.count / total;
        self.sxx += other.sxx + dx * dx * scale;
        self.syy += other.syy + dy * dy * scale;
        self.sxy += other.sxy + dx * dy * scale;
        self.mean_x += dx * other.count / total;
        self.mean_y += dy * other.count / total;
        self.count = total;
    }

    #[inline]
    pub fn count(&self) -> Scalar {
        self.count
    }

    #[inline]
    pub fn mean_x(&self) -> Scalar {
        self.mean_x
    }

    #[inline]
    pub fn mean_y(&self) -> Scalar {
        self.mean_y
    }

    /// Population variance of the first series.
    #[inline]
    pub fn variance_x(&self) -> Scalar {
        if self.count > 0.0 {
            self.sxx / self.count
        } else {
            0.0
        }
    }

    /// Population variance of the second series.
    #[inline]
    pub fn variance_y(&self) -> Scalar {
        if self.count > 0.0 {
            self.syy / self.count
        } else {
            0.0
        }
    }

    /// Population covariance.
    #[inline]
    pub fn covariance(&self) -> Scalar {
        if self.count > 0.0 {
            self.sxy / self.count
        } else {
            0.0
        }
    }

    /// Pearson correlation coefficient. NaN when either series is
    /// degenerate; callers decide how to score that.
    #[inline]
    pub fn correlation(&self) -> Scalar {
        self.sxy / (self.sxx * self.syy).sqrt()
    }
}

// =============================================================================
// Tests
// =============================================================================
