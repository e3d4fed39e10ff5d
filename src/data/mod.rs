//! Data input: the column-major dataset, row ranges, and CSV loading.
//!
//! # Overview
//!
//! [`Dataset`] is a read-only numeric table in variable-major layout;
//! [`Range`] selects half-open row intervals; [`read_csv`] builds a
//! dataset from a CSV file, parsing all cells as doubles.
//!
//! Datasets are built once and shared immutably across evaluation threads.

mod dataset;
mod io;

pub use dataset::{Dataset, DatasetError, Range, Variable};
pub use io::{read_csv, LoadError};
