//! Per-row batch outcomes

use crate::errors::PredictorError;
use crate::features::FeatureVector;
use crate::types::{ClassLabel, PredictionResult};
use serde::Serialize;

/// Outcome of one batch row
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// 1-based position in the input
    pub row: usize,
    pub input: Option<FeatureVector>,
    pub expected: Option<ClassLabel>,
    pub outcome: Result<PredictionResult, PredictorError>,
}

impl BatchEntry {
    /// Ground truth agrees with the prediction; `None` when either is absent.
    pub fn is_correct(&self) -> Option<bool> {
        match (&self.outcome, self.expected) {
            (Ok(prediction), Some(expected)) => Some(prediction.label == expected),
            _ => None,
        }
    }

    pub fn view(&self) -> BatchRowView {
        let (prediction, error) = match &self.outcome {
            Ok(prediction) => (Some(prediction.clone()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        BatchRowView {
            row: self.row,
            input: self.input,
            expected: self.expected,
            prediction,
            error,
            correct: self.is_correct(),
        }
    }
}

/// Serializable form of a [`BatchEntry`]
#[derive(Debug, Clone, Serialize)]
pub struct BatchRowView {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<FeatureVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<ClassLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

/// Aggregate counts over a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub accuracy: Option<f64>,
}

/// Batch results in input order, one entry per input row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Failing rows with their errors
    pub fn failures(&self) -> impl Iterator<Item = (usize, &PredictorError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (e.row, err)))
    }

    /// Share of labelled, successfully predicted rows that match ground truth
    pub fn accuracy(&self) -> Option<f64> {
        let judged: Vec<bool> = self.entries.iter().filter_map(BatchEntry::is_correct).collect();
        if judged.is_empty() {
            return None;
        }
        let correct = judged.iter().filter(|c| **c).count();
        Some(correct as f64 / judged.len() as f64)
    }

    pub fn stats(&self) -> BatchStats {
        BatchStats {
            total: self.len(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            accuracy: self.accuracy(),
        }
    }

    pub fn views(&self) -> Vec<BatchRowView> {
        self.entries.iter().map(BatchEntry::view).collect()
    }
}
