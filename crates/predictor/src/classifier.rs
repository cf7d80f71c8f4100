//! Classifier backends
//!
//! [`Classifier`] is the seam between the typed predictor contract and
//! whatever model implementation sits underneath. The bundled backend walks
//! a [`DecisionTreeModel`] artifact.

use crate::errors::{PredictorError, Result};
use crate::model::{DecisionTreeModel, ModelError};
use crate::summary::{rank_importances, ModelSummary};
use crate::types::ClassLabel;
use std::path::Path;

/// A fitted classifier over the `[age, gender]` feature layout
pub trait Classifier: Send + Sync {
    /// Classes in the order `predict_proba` reports them
    fn classes(&self) -> &[ClassLabel];

    /// Per-class probabilities for one feature vector
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Structural diagnostics
    fn summary(&self) -> ModelSummary;

    /// Human-readable tree diagram
    fn render_tree(&self) -> String;

    /// Identity of the loaded artifact
    fn fingerprint(&self) -> &str;
}

/// Validated decision tree ready for inference
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    model: DecisionTreeModel,
    classes: Vec<ClassLabel>,
    fingerprint: String,
}

impl DecisionTreeClassifier {
    pub fn from_model(model: DecisionTreeModel) -> std::result::Result<Self, ModelError> {
        model.validate()?;
        let classes = model.class_labels()?;
        let fingerprint = model.fingerprint()?;
        Ok(Self {
            model,
            classes,
            fingerprint,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ModelError> {
        Self::from_model(DecisionTreeModel::load_json(path)?)
    }

    pub fn model(&self) -> &DecisionTreeModel {
        &self.model
    }
}

impl Classifier for DecisionTreeClassifier {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.model
            .tree
            .evaluate(features)
            .and_then(|leaf| leaf.probabilities())
            .ok_or_else(|| {
                PredictorError::Classifier(format!(
                    "features {features:?} do not reach a usable leaf"
                ))
            })
    }

    fn summary(&self) -> ModelSummary {
        let tree = &self.model.tree;
        let names = self.model.display_feature_names();
        let importances = tree.feature_importances(self.model.n_features);
        ModelSummary {
            depth: tree.depth(),
            leaf_count: tree.leaf_count(),
            node_count: tree.nodes.len(),
            feature_importances: rank_importances(&names, &importances),
            feature_names: names,
            classes: self.classes.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }

    fn render_tree(&self) -> String {
        self.model
            .tree
            .render_text(&self.model.display_feature_names(), &self.model.classes)
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
