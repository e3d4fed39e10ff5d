//! CSV ingestion.
//!
//! Every cell is parsed as a double-precision number; a cell that does not
//! parse fails the load with the offending field, row, and column. Files
//! without a header get synthesized variable names `X1..Xn`.

use std::path::Path;

use crate::data::Dataset;
use crate::Scalar;

/// CSV loading errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("csv read failed: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be parsed as a number.
    #[error("field {field:?} at row {row}, column {column} is not numeric")]
    Parse {
        field: String,
        row: usize,
        column: usize,
    },

    #[error(transparent)]
    Dataset(#[from] crate::data::DatasetError),
}

/// Load a [`Dataset`] from a CSV file.
///
/// # Errors
///
/// [`LoadError::Parse`] names the first non-numeric cell;
/// [`LoadError::Dataset`] surfaces empty or ragged inputs.
pub fn read_csv(path: impl AsRef<Path>, has_header: bool) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .from_path(path)?;

    let mut names: Vec<String> = if has_header {
        reader
            .headers()?
            .iter()
            .map(|name| name.trim().to_owned())
            .collect()
    } else {
        Vec::new()
    };

    let mut columns: Vec<Vec<Scalar>> = vec![Vec::new(); names.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if columns.is_empty() {
            columns = vec![Vec::new(); record.len()];
        }
        for (column, field) in record.iter().enumerate() {
            let value: Scalar =
                field
                    .trim()
                    .parse()
                    .map_err(|_| LoadError::Parse {
                        field: field.to_owned(),
                        row,
                        column,
                    })?;
            if let Some(values) = columns.get_mut(column) {
                values.push(value);
            }
        }
    }

    if names.is_empty() {
        names = (1..=columns.len()).map(|i| format!("X{i}")).collect();
    }

    let dataset = Dataset::from_columns(names.into_iter().zip(columns).collect())?;
    Ok(dataset)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "symreg-csv-test-{}-{}.csv",
            std::process::id(),
            contents.len()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_with_header() {
        let path = write_temp("x,y\n1.0,2.0\n3.0,4.0\n");
        let ds = read_csv(&path, true).unwrap();
        assert_eq!(ds.rows(), 2);
        assert_eq!(ds.values_by_name("x").unwrap(), &[1.0, 3.0]);
        assert_eq!(ds.values_by_name("y").unwrap(), &[2.0, 4.0]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn synthesizes_names_without_header() {
        let path = write_temp("1.0,2.0\n3.0,4.0\n5.0,6.0\n");
        let ds = read_csv(&path, false).unwrap();
        assert_eq!(ds.rows(), 3);
        assert_eq!(ds.values_by_name("X1").unwrap(), &[1.0, 3.0, 5.0]);
        assert_eq!(ds.values_by_name("X2").unwrap(), &[2.0, 4.0, 6.0]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn non_numeric_cell_names_the_field() {
        let path = write_temp("x,y\n1.0,apple\n");
        match read_csv(&path, true) {
            Err(LoadError::Parse { field, row, column }) => {
                assert_eq!(field, "apple");
                assert_eq!(row, 0);
                assert_eq!(column, 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        std::fs::remove_file(path).ok();
    }
}
