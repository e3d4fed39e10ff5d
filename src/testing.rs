//! Testing utilities shared by unit and integration tests.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::Dataset;
use crate::Scalar;

/// Default tolerance for floating point comparisons.
pub const DEFAULT_TOLERANCE: Scalar = 1e-10;

/// A dataset of `n_variables` uniform columns in `[-1, 1]`, named
/// `x1..xn`.
pub fn synthetic_dataset(n_variables: usize, rows: usize, seed: u64) -> Dataset {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let columns = (1..=n_variables)
        .map(|i| {
            let values = (0..rows)
                .map(|_| rng.gen::<Scalar>() * 2.0 - 1.0)
                .collect();
            (format!("x{i}"), values)
        })
        .collect();
    Dataset::from_columns(columns).expect("synthetic columns are well formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_dataset_shape_and_determinism() {
        let a = synthetic_dataset(3, 10, 42);
        assert_eq!(a.n_variables(), 3);
        assert_eq!(a.rows(), 10);

        let b = synthetic_dataset(3, 10, 42);
        assert_eq!(
            a.values_by_name("x2").unwrap(),
            b.values_by_name("x2").unwrap()
        );
        assert!(a
            .values_by_name("x1")
            .unwrap()
            .iter()
            .all(|v| (-1.0..=1.0).contains(v)));
    }
}
