//! Typed inference facade over a fitted classifier
//!
//! A [`Predictor`] is built once at startup and cloned into whatever serves
//! requests. Clones share one immutable classifier.

use crate::batch::{BatchEntry, BatchReport};
use crate::classifier::{Classifier, DecisionTreeClassifier};
use crate::dataset::SampleDataset;
use crate::errors::{PredictorError, Result};
use crate::features::FeatureVector;
use crate::model::ModelError;
use crate::summary::ModelSummary;
use crate::types::PredictionResult;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

impl Predictor {
    /// Wrap any classifier backend
    pub fn from_classifier<C: Classifier + 'static>(classifier: C) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    /// Load a decision tree artifact from `path`
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PredictorError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }

        let classifier = DecisionTreeClassifier::load(path).map_err(|err| match err {
            ModelError::IoError(ref io) if io.kind() == ErrorKind::NotFound => {
                PredictorError::ArtifactNotFound {
                    path: path.to_path_buf(),
                }
            }
            other => PredictorError::ArtifactCorrupt {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        info!(
            "Loaded model from {} (fingerprint {})",
            path.display(),
            classifier.fingerprint()
        );
        Ok(Self::from_classifier(classifier))
    }

    /// Load an artifact and require its fingerprint to match `expected`
    pub fn load_verified<P: AsRef<Path>>(path: P, expected: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let predictor = Self::load_model(path)?;
        if let Some(expected) = expected {
            let actual = predictor.fingerprint();
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(PredictorError::ArtifactCorrupt {
                    path: path.to_path_buf(),
                    reason: format!("fingerprint {actual} does not match expected {expected}"),
                });
            }
        }
        Ok(predictor)
    }

    /// Predict the interest label and distribution for one input
    pub fn predict(&self, feature: &FeatureVector) -> Result<PredictionResult> {
        feature.validate()?;

        let proba = self.classifier.predict_proba(&feature.to_features())?;
        let classes = self.classifier.classes();
        if proba.len() != classes.len() {
            return Err(PredictorError::Classifier(format!(
                "classifier returned {} probabilities for {} classes",
                proba.len(),
                classes.len()
            )));
        }

        // First maximum wins, matching argmax over the artifact's class order.
        let mut best = 0usize;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }

        let probabilities: BTreeMap<_, _> = classes.iter().copied().zip(proba).collect();
        let result = PredictionResult {
            label: classes[best],
            probabilities,
        };

        debug!(
            age = feature.age,
            gender = %feature.gender,
            label = %result.label,
            confidence = result.confidence(),
            "prediction"
        );
        Ok(result)
    }

    /// Predict each vector independently, keeping input order
    pub fn predict_batch(&self, features: &[FeatureVector]) -> BatchReport {
        let entries = features
            .iter()
            .enumerate()
            .map(|(idx, feature)| {
                let row = idx + 1;
                BatchEntry {
                    row,
                    input: Some(*feature),
                    expected: None,
                    outcome: self.predict(feature).map_err(|e| e.into_row(row)),
                }
            })
            .collect();
        self.finish_batch(entries)
    }

    /// Predict every row of a sample file; unparseable rows stay in place
    /// as failures.
    pub fn predict_samples(&self, dataset: &SampleDataset) -> BatchReport {
        let entries = dataset
            .rows
            .iter()
            .map(|sample| {
                let outcome = match &sample.input {
                    Ok(feature) => self.predict(feature).map_err(|e| e.into_row(sample.row)),
                    Err(e) => Err(e.clone().into_row(sample.row)),
                };
                BatchEntry {
                    row: sample.row,
                    input: sample.input.as_ref().ok().copied(),
                    expected: sample.expected,
                    outcome,
                }
            })
            .collect();
        self.finish_batch(entries)
    }

    fn finish_batch(&self, entries: Vec<BatchEntry>) -> BatchReport {
        let report = BatchReport { entries };
        for (row, err) in report.failures() {
            warn!("Batch row {} failed: {}", row, err);
        }
        info!(
            "Batch processed: {} rows, {} failed",
            report.len(),
            report.failed()
        );
        report
    }

    pub fn summary(&self) -> ModelSummary {
        self.classifier.summary()
    }

    pub fn render_tree(&self) -> String {
        self.classifier.render_tree()
    }

    pub fn fingerprint(&self) -> &str {
        self.classifier.fingerprint()
    }
}
