//! Sample dataset loading
//!
//! Reads a CSV with a header containing `age` and `gender` (any case) and an
//! optional `interest` ground-truth column. A malformed row is recorded as a
//! failure for that row only; the file as a whole is rejected only when it
//! cannot be read or lacks a required column.

use crate::errors::{PredictorError, Result};
use crate::features::FeatureVector;
use crate::types::ClassLabel;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One data row (1-based, header excluded)
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub row: usize,
    pub input: Result<FeatureVector>,
    pub expected: Option<ClassLabel>,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    age: usize,
    gender: usize,
    interest: Option<usize>,
}

/// Rows of a sample file in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleDataset {
    pub rows: Vec<SampleRow>,
}

impl SampleDataset {
    /// Load a sample CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PredictorError::Dataset(format!("cannot open {}: {e}", path.display()))
        })?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} sample rows from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse CSV content from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| PredictorError::Dataset(format!("cannot read header: {e}")))?
            .clone();
        let columns = locate_columns(&headers)?;

        let rows: Vec<SampleRow> = reader
            .records()
            .enumerate()
            .map(|(idx, record)| {
                let row = idx + 1;
                match record {
                    Ok(record) => parse_row(&record, row, columns),
                    Err(e) => SampleRow {
                        row,
                        input: Err(PredictorError::BatchRow {
                            row,
                            reason: e.to_string(),
                        }),
                        expected: None,
                    },
                }
            })
            .collect();

        if rows.is_empty() {
            return Err(PredictorError::Dataset("sample file has no rows".into()));
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that failed to parse
    pub fn invalid_rows(&self) -> impl Iterator<Item = &SampleRow> {
        self.rows.iter().filter(|r| r.input.is_err())
    }
}

fn locate_columns(headers: &StringRecord) -> Result<Columns> {
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let age = find("age")
        .ok_or_else(|| PredictorError::Dataset("missing required column 'age'".into()))?;
    let gender = find("gender")
        .ok_or_else(|| PredictorError::Dataset("missing required column 'gender'".into()))?;
    Ok(Columns {
        age,
        gender,
        interest: find("interest"),
    })
}

fn parse_row(record: &StringRecord, row: usize, columns: Columns) -> SampleRow {
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let expected = match columns.interest.map(cell).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(label) => label.parse::<ClassLabel>().map(Some),
    };

    let input = match expected {
        Ok(_) => FeatureVector::parse(cell(columns.age), cell(columns.gender)),
        Err(ref e) => Err(e.clone()),
    }
    .map_err(|e| e.into_row(row));

    if let Err(ref e) = input {
        debug!("Sample {}", e);
    }

    SampleRow {
        row,
        input,
        expected: expected.unwrap_or(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Gender;

    #[test]
    fn parses_rows_with_ground_truth() {
        let csv = "Age,Gender,Interest\n25,Male,Action\n19,0,Animation\n60,female,\n";
        let ds = SampleDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.rows[0].input,
            Ok(FeatureVector {
                age: 25,
                gender: Gender::Male
            })
        );
        assert_eq!(ds.rows[0].expected, Some(ClassLabel::Action));
        assert_eq!(ds.rows[2].expected, None);
        assert_eq!(ds.invalid_rows().count(), 0);
    }

    #[test]
    fn malformed_rows_fail_individually() {
        let csv = "age,gender\n25,1\nabc,1\n30,\n99,0\n40\n";
        let ds = SampleDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 5);
        assert!(ds.rows[0].input.is_ok());

        let failed: Vec<usize> = ds.invalid_rows().map(|r| r.row).collect();
        assert_eq!(failed, vec![2, 3, 4, 5]);
        assert_eq!(
            ds.rows[2].input,
            Err(PredictorError::BatchRow {
                row: 3,
                reason: "missing gender value".into()
            })
        );
    }

    #[test]
    fn unknown_interest_is_a_row_error() {
        let csv = "age,gender,interest\n25,1,Comedy\n";
        let ds = SampleDataset::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            ds.rows[0].input,
            Err(PredictorError::BatchRow { row: 1, .. })
        ));
    }

    #[test]
    fn missing_required_column_rejects_file() {
        let err = SampleDataset::from_reader("age,interest\n25,Action\n".as_bytes()).unwrap_err();
        assert_eq!(
            err,
            PredictorError::Dataset("missing required column 'gender'".into())
        );
        assert!(SampleDataset::from_reader("age,gender\n".as_bytes()).is_err());
    }

    #[test]
    fn missing_file_is_dataset_error() {
        assert!(matches!(
            SampleDataset::from_csv("/nonexistent/sample.csv"),
            Err(PredictorError::Dataset(_))
        ));
    }
}
