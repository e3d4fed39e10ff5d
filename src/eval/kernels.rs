//! Elementwise operator kernels.
//!
//! Each arithmetic kind provides two forms over equal-length column views:
//! `apply*` writes the output, `accumulate*` merges into it under the
//! kind's identity (`+`/`-` for Add/Sub, `×`/`÷` for Mul/Div). Variants
//! exist for 1 to 5 inputs; the evaluator partitions wider arities into
//! 5-groups, so each group folds into a single intermediate before touching
//! the output. Compared to a naive left-fold this halves the writes to the
//! output column and shortens the rounding chain.
//!
//! Group sums/products are right-folded (`a + (b + (c + ...))`); changing
//! that association changes last-bit results.
//!
//! Dispatch is monomorphic: kinds are zero-sized types implementing
//! [`NaryKernel`], selected once per node, never per element.

use crate::Scalar;

/// N-ary arithmetic kernel over column views of equal width.
///
/// The single-input forms carry the kind's unary meaning: identity for
/// Add/Mul, negation for Sub, reciprocal for Div.
pub(crate) trait NaryKernel {
    fn apply1(out: &mut [Scalar], a: &[Scalar]);
    fn apply2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]);
    fn apply3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]);
    fn apply4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]);
    fn apply5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    );

    fn accumulate1(out: &mut [Scalar], a: &[Scalar]);
    fn accumulate2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]);
    fn accumulate3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]);
    fn accumulate4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]);
    fn accumulate5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    );
}

pub(crate) struct AddKernel;
pub(crate) struct SubKernel;
pub(crate) struct MulKernel;
pub(crate) struct DivKernel;

impl NaryKernel for AddKernel {
    #[inline]
    fn apply1(out: &mut [Scalar], a: &[Scalar]) {
        out.copy_from_slice(a);
    }

    #[inline]
    fn apply2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] + b[i];
        }
    }

    #[inline]
    fn apply3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] + (b[i] + c[i]);
        }
    }

    #[inline]
    fn apply4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] + (b[i] + (c[i] + d[i]));
        }
    }

    #[inline]
    fn apply5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] = a[i] + (b[i] + (c[i] + (d[i] + e[i])));
        }
    }

    #[inline]
    fn accumulate1(out: &mut [Scalar], a: &[Scalar]) {
        for i in 0..out.len() {
            out[i] += a[i];
        }
    }

    #[inline]
    fn accumulate2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] += a[i] + b[i];
        }
    }

    #[inline]
    fn accumulate3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] += a[i] + (b[i] + c[i]);
        }
    }

    #[inline]
    fn accumulate4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] += a[i] + (b[i] + (c[i] + d[i]));
        }
    }

    #[inline]
    fn accumulate5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] += a[i] + (b[i] + (c[i] + (d[i] + e[i])));
        }
    }
}

impl NaryKernel for SubKernel {
    /// Unary form: negation.
    #[inline]
    fn apply1(out: &mut [Scalar], a: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = -a[i];
        }
    }

    #[inline]
    fn apply2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] - b[i];
        }
    }

    #[inline]
    fn apply3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] - (b[i] + c[i]);
        }
    }

    #[inline]
    fn apply4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] - (b[i] + (c[i] + d[i]));
        }
    }

    #[inline]
    fn apply5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] = a[i] - (b[i] + (c[i] + (d[i] + e[i])));
        }
    }

    #[inline]
    fn accumulate1(out: &mut [Scalar], a: &[Scalar]) {
        for i in 0..out.len() {
            out[i] -= a[i];
        }
    }

    #[inline]
    fn accumulate2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] -= a[i] + b[i];
        }
    }

    #[inline]
    fn accumulate3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] -= a[i] + (b[i] + c[i]);
        }
    }

    #[inline]
    fn accumulate4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] -= a[i] + (b[i] + (c[i] + d[i]));
        }
    }

    #[inline]
    fn accumulate5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] -= a[i] + (b[i] + (c[i] + (d[i] + e[i])));
        }
    }
}

impl NaryKernel for MulKernel {
    #[inline]
    fn apply1(out: &mut [Scalar], a: &[Scalar]) {
        out.copy_from_slice(a);
    }

    #[inline]
    fn apply2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] * b[i];
        }
    }

    #[inline]
    fn apply3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] * (b[i] * c[i]);
        }
    }

    #[inline]
    fn apply4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] * (b[i] * (c[i] * d[i]));
        }
    }

    #[inline]
    fn apply5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] = a[i] * (b[i] * (c[i] * (d[i] * e[i])));
        }
    }

    #[inline]
    fn accumulate1(out: &mut [Scalar], a: &[Scalar]) {
        for i in 0..out.len() {
            out[i] *= a[i];
        }
    }

    #[inline]
    fn accumulate2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] *= a[i] * b[i];
        }
    }

    #[inline]
    fn accumulate3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] *= a[i] * (b[i] * c[i]);
        }
    }

    #[inline]
    fn accumulate4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] *= a[i] * (b[i] * (c[i] * d[i]));
        }
    }

    #[inline]
    fn accumulate5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] *= a[i] * (b[i] * (c[i] * (d[i] * e[i])));
        }
    }
}

impl NaryKernel for DivKernel {
    /// Unary form: reciprocal.
    #[inline]
    fn apply1(out: &mut [Scalar], a: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i].recip();
        }
    }

    #[inline]
    fn apply2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] / b[i];
        }
    }

    #[inline]
    fn apply3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] / (b[i] * c[i]);
        }
    }

    #[inline]
    fn apply4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] = a[i] / (b[i] * (c[i] * d[i]));
        }
    }

    #[inline]
    fn apply5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] = a[i] / (b[i] * (c[i] * (d[i] * e[i])));
        }
    }

    #[inline]
    fn accumulate1(out: &mut [Scalar], a: &[Scalar]) {
        for i in 0..out.len() {
            out[i] /= a[i];
        }
    }

    #[inline]
    fn accumulate2(out: &mut [Scalar], a: &[Scalar], b: &[Scalar]) {
        for i in 0..out.len() {
            out[i] /= a[i] * b[i];
        }
    }

    #[inline]
    fn accumulate3(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar]) {
        for i in 0..out.len() {
            out[i] /= a[i] * (b[i] * c[i]);
        }
    }

    #[inline]
    fn accumulate4(out: &mut [Scalar], a: &[Scalar], b: &[Scalar], c: &[Scalar], d: &[Scalar]) {
        for i in 0..out.len() {
            out[i] /= a[i] * (b[i] * (c[i] * d[i]));
        }
    }

    #[inline]
    fn accumulate5(
        out: &mut [Scalar],
        a: &[Scalar],
        b: &[Scalar],
        c: &[Scalar],
        d: &[Scalar],
        e: &[Scalar],
    ) {
        for i in 0..out.len() {
            out[i] /= a[i] * (b[i] * (c[i] * (d[i] * e[i])));
        }
    }
}

/// Elementwise unary application. `f` is monomorphized per call site, so
/// the inner loop carries no dispatch.
#[inline]
pub(crate) fn apply_unary(out: &mut [Scalar], input: &[Scalar], f: impl Fn(Scalar) -> Scalar) {
    debug_assert_eq!(out.len(), input.len());
    for (o, &x) in out.iter_mut().zip(input) {
        *o = f(x);
    }
}

// =============================================================================
// Tests
// =============================================================================
