//! Dataset container and row ranges.
//!
//! # Storage Layout
//!
//! Values are stored **variable-major**: an `[n_variables, n_rows]` array
//! where each variable's values across all rows are contiguous in memory.
//! The evaluator reads whole column slices, so this layout hands it plain
//! `&[Scalar]` views with no copying.
//!
//! # Variable Hashes
//!
//! Each variable carries a stable 64-bit hash id. Hashes are generated from
//! a fixed-seed RNG, deduplicated, and assigned in ascending order to the
//! name-sorted variable list — so lookup by hash is a binary search over
//! the same ordering as lookup by name.

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::Scalar;

/// Seed for variable hash generation. Fixed so that datasets with the same
/// variable names agree on hash ids across runs.
const VARIABLE_HASH_SEED: u64 = 1234;

// =============================================================================
// Errors
// =============================================================================

/// Dataset construction and access errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// A dataset needs at least one variable.
    #[error("dataset has no variables")]
    EmptyDataset,

    /// Columns must all have the same number of rows.
    #[error("inconsistent number of rows: variable {variable} has {got}, expected {expected}")]
    InconsistentRows {
        variable: String,
        expected: usize,
        got: usize,
    },

    /// Name lookup failed.
    #[error("unknown variable {name:?}")]
    UnknownVariable { name: String },

    /// Hash lookup failed.
    #[error("unknown variable hash {hash}")]
    UnknownVariableHash { hash: u64 },

    /// A subslice request exceeded the dataset rows.
    #[error("rows {start}..{end} out of range for dataset with {rows} rows")]
    OutOfRange {
        start: usize,
        end: usize,
        rows: usize,
    },
}

// =============================================================================
// Range
// =============================================================================

/// Half-open row interval `[start, end)`.
///
/// A `Range` carries no reference to any dataset; consumers check it
/// against the dataset they are given and surface out-of-range requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: usize,
    end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {} exceeds end {}", start, end);
        Self { start, end }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

// =============================================================================
// Variable
// =============================================================================

/// A named dataset column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Column name from the source header (or synthesized `X1..Xn`).
    pub name: String,
    /// Stable hash id; strictly increasing in name order.
    pub hash: u64,
    /// Row index into the value matrix (source column order).
    pub index: usize,
}

// =============================================================================
// Dataset
// =============================================================================

/// A read-only, column-major numeric table.
///
/// Built once by a loader ([`read_csv`](crate::data::read_csv)) or from
/// in-memory columns, then shared immutably by all evaluation threads.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Values in variable-major layout: `[n_variables, n_rows]`.
    values: Array2<Scalar>,
    /// Variables sorted by name; hashes ascend with the sort order.
    variables: Vec<Variable>,
}

impl Dataset {
    /// Create a dataset from named columns.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EmptyDataset`] when no columns are given,
    /// [`DatasetError::InconsistentRows`] when column lengths disagree.
    pub fn from_columns(columns: Vec<(String, Vec<Scalar>)>) -> Result<Self, DatasetError> {
        if columns.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }
        let rows = columns[0].1.len();
        for (name, values) in &columns {
            if values.len() != rows {
                return Err(DatasetError::InconsistentRows {
                    variable: name.clone(),
                    expected: rows,
                    got: values.len(),
                });
            }
        }

        let n_variables = columns.len();
        let mut flat = Vec::with_capacity(n_variables * rows);
        let mut names = Vec::with_capacity(n_variables);
        for (name, values) in columns {
            names.push(name);
            flat.extend(values);
        }
        let values = Array2::from_shape_vec((n_variables, rows), flat)
            .expect("column lengths were checked above");

        Ok(Self {
            variables: assign_variables(names),
            values,
        })
    }

    /// Create a dataset from a variable-major `[n_variables, n_rows]` array.
    pub fn from_array(names: Vec<String>, values: Array2<Scalar>) -> Result<Self, DatasetError> {
        if names.is_empty() || values.nrows() == 0 {
            return Err(DatasetError::EmptyDataset);
        }
        debug_assert_eq!(
            names.len(),
            values.nrows(),
            "one name per variable row expected"
        );
        Ok(Self {
            variables: assign_variables(names),
            values,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.values.ncols()
    }

    /// Number of variables.
    #[inline]
    pub fn n_variables(&self) -> usize {
        self.values.nrows()
    }

    /// Variables sorted by name (hashes ascending).
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Look up a variable by name.
    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables
            .binary_search_by(|v| v.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.variables[i])
    }

    /// Look up a variable by hash id.
    pub fn variable_by_hash(&self, hash: u64) -> Option<&Variable> {
        self.variables
            .binary_search_by_key(&hash, |v| v.hash)
            .ok()
            .map(|i| &self.variables[i])
    }

    /// Full column slice for a variable hash.
    pub fn values_by_hash(&self, hash: u64) -> Option<&[Scalar]> {
        let variable = self.variable_by_hash(hash)?;
        let row = self.values.row(variable.index);
        Some(row.to_slice().expect("variable rows are contiguous"))
    }

    /// Full column slice for a variable name.
    pub fn values_by_name(&self, name: &str) -> Option<&[Scalar]> {
        let variable = self.variable_by_name(name)?;
        self.values_by_hash(variable.hash)
    }

    /// Column subslice over a row range.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnknownVariableHash`] for unknown hashes and
    /// [`DatasetError::OutOfRange`] when the range exceeds the row count.
    pub fn subslice(&self, hash: u64, range: Range) -> Result<&[Scalar], DatasetError> {
        let column = self
            .values_by_hash(hash)
            .ok_or(DatasetError::UnknownVariableHash { hash })?;
        if range.start() > range.end() || range.end() > column.len() {
            return Err(DatasetError::OutOfRange {
                start: range.start(),
                end: range.end(),
                rows: column.len(),
            });
        }
        Ok(&column[range.start()..range.end()])
    }
}

/// Sort names, generate distinct ascending hashes, and attach original
/// column indices.
fn assign_variables(names: Vec<String>) -> Vec<Variable> {
    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by(|&a, &b| names[a].cmp(&names[b]));

    let hashes = generate_hashes(names.len());

    order
        .into_iter()
        .zip(hashes)
        .map(|(index, hash)| Variable {
            name: names[index].clone(),
            hash,
            index,
        })
        .collect()
}

/// Distinct 64-bit hashes in ascending order, from a fixed-seed generator.
fn generate_hashes(count: usize) -> Vec<u64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(VARIABLE_HASH_SEED);
    let mut hashes = std::collections::BTreeSet::new();
    while hashes.len() < count {
        hashes.insert(rng.gen::<u64>());
    }
    hashes.into_iter().collect()
}

// =============================================================================
// Tests
// =============================================================================
