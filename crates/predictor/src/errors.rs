//! Error types for the interest predictor

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the predictor contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    /// Model artifact missing on disk
    #[error("model artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// Model artifact present but unreadable or shape-mismatched
    #[error("model artifact {} is corrupt: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// Age or gender outside the declared domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// One row of a batch could not be processed
    #[error("row {row}: {reason}")]
    BatchRow { row: usize, reason: String },

    /// Sample file unreadable or missing a required column
    #[error("sample dataset error: {0}")]
    Dataset(String),

    /// The loaded classifier produced an unusable answer for valid input
    #[error("classifier fault: {0}")]
    Classifier(String),
}

impl PredictorError {
    /// True for errors that must stop the process before serving.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PredictorError::ArtifactNotFound { .. } | PredictorError::ArtifactCorrupt { .. }
        )
    }

    /// Wrap an error as a failure of batch row `row` (1-based).
    pub(crate) fn into_row(self, row: usize) -> Self {
        match self {
            PredictorError::BatchRow { .. } => self,
            PredictorError::InvalidInput(reason) => PredictorError::BatchRow { row, reason },
            other => PredictorError::BatchRow {
                row,
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for predictor operations
pub type Result<T> = std::result::Result<T, PredictorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_fatal() {
        let missing = PredictorError::ArtifactNotFound {
            path: PathBuf::from("model.json"),
        };
        assert!(missing.is_fatal());
        assert!(!PredictorError::InvalidInput("age".into()).is_fatal());
    }

    #[test]
    fn invalid_input_becomes_row_error() {
        let err = PredictorError::InvalidInput("age 81 is outside 18..=80".into()).into_row(3);
        assert_eq!(
            err,
            PredictorError::BatchRow {
                row: 3,
                reason: "age 81 is outside 18..=80".into()
            }
        );
        assert_eq!(err.to_string(), "row 3: age 81 is outside 18..=80");
    }

    #[test]
    fn classifier_fault_is_not_blamed_on_input() {
        let err = PredictorError::Classifier("no usable leaf".into());
        assert!(!err.is_fatal());
        assert!(!matches!(err, PredictorError::InvalidInput(_)));
        assert_eq!(err.into_row(2).to_string(), "row 2: classifier fault: no usable leaf");
    }
}
