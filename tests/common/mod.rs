//! Shared helpers for integration tests.
#![allow(dead_code)] // not every binary uses every helper

use symreg::{Dataset, Scalar};

/// Column hash for a variable by name.
pub fn hash_of(dataset: &Dataset, name: &str) -> u64 {
    dataset
        .variable_by_name(name)
        .unwrap_or_else(|| panic!("variable {name} should exist"))
        .hash
}

/// A two-variable dataset with a single row `(x=1, y=4)`.
pub fn single_row_xy() -> Dataset {
    Dataset::from_columns(vec![("x".into(), vec![1.0]), ("y".into(), vec![4.0])]).unwrap()
}

/// A one-variable dataset whose column is `0, 1, 2, ...`.
pub fn ramp_dataset(rows: usize) -> Dataset {
    let values: Vec<Scalar> = (0..rows).map(|i| i as Scalar).collect();
    Dataset::from_columns(vec![("x".into(), values)]).unwrap()
}
