//! Decision tree classifier artifact
//!
//! The artifact is produced offline (e.g. exported from a fitted
//! scikit-learn `DecisionTreeClassifier`) and read here as JSON:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "n_features": 2,
//!   "feature_names": ["age", "gender"],
//!   "classes": ["Action", "Animation", "Drama"],
//!   "tree": {"nodes": [
//!     {"id":0,"feature":0,"threshold":22.5,"left":1,"right":2,"samples":40,"impurity":0.65,"value":[15,10,15]},
//!     {"id":1,"feature":-1,"threshold":0.0,"left":-1,"right":-1,"samples":10,"impurity":0.46,"value":[2,7,1]},
//!     {"id":2,"feature":-1,"threshold":0.0,"left":-1,"right":-1,"samples":30,"impurity":0.58,"value":[13,3,14]}
//!   ]}
//! }
//! ```

use crate::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::serde_canon::{fingerprint_hex, to_canonical_json, CanonicalError};
use crate::tree::Tree;
use crate::types::ClassLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Artifact errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(#[from] CanonicalError),
}

/// Only artifact layout understood by this crate
pub const FORMAT_VERSION: u32 = 1;

/// Serialized decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTreeModel {
    /// Artifact layout version (always 1 for now)
    pub format_version: u32,

    /// Number of input features the tree was fit on
    pub n_features: usize,

    /// Feature names in fit order, when the exporter recorded them
    #[serde(default)]
    pub feature_names: Vec<String>,

    /// Class names in the order used by every node's `value`
    pub classes: Vec<String>,

    pub tree: Tree,
}

impl DecisionTreeModel {
    /// Create an artifact for the standard `[age, gender]` feature layout
    pub fn new(classes: &[ClassLabel], tree: Tree) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            n_features: FEATURE_COUNT,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            classes: classes.iter().map(|c| c.as_str().to_string()).collect(),
            tree,
        }
    }

    /// Validate artifact shape
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported format version: {}",
                self.format_version
            )));
        }

        if self.n_features != FEATURE_COUNT {
            return Err(ModelError::ValidationFailed(format!(
                "Model declares {} features, expected {}",
                self.n_features, FEATURE_COUNT
            )));
        }

        if !self.feature_names.is_empty() {
            let matches = self.feature_names.len() == FEATURE_COUNT
                && self
                    .feature_names
                    .iter()
                    .zip(FEATURE_NAMES)
                    .all(|(got, want)| got.trim().eq_ignore_ascii_case(want));
            if !matches {
                return Err(ModelError::ValidationFailed(format!(
                    "Feature names {:?} do not match expected order {:?}",
                    self.feature_names, FEATURE_NAMES
                )));
            }
        }

        self.class_labels()?;

        self.tree
            .validate(self.n_features, self.classes.len())
            .map_err(|e| ModelError::ValidationFailed(format!("Tree validation failed: {e}")))
    }

    /// Parse class names; they must be exactly the known interest labels.
    pub fn class_labels(&self) -> Result<Vec<ClassLabel>, ModelError> {
        let labels = self
            .classes
            .iter()
            .map(|name| {
                name.parse::<ClassLabel>()
                    .map_err(|_| ModelError::ValidationFailed(format!("Unknown class '{name}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let distinct: BTreeSet<ClassLabel> = labels.iter().copied().collect();
        if labels.len() != ClassLabel::ALL.len() || distinct.len() != ClassLabel::ALL.len() {
            return Err(ModelError::ValidationFailed(format!(
                "Classes {:?} must be exactly {:?}",
                self.classes,
                ClassLabel::ALL
            )));
        }
        Ok(labels)
    }

    /// Feature names for display, falling back to the fit-order defaults
    pub fn display_feature_names(&self) -> Vec<String> {
        if self.feature_names.len() == self.n_features {
            self.feature_names.clone()
        } else {
            FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
        }
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// BLAKE3 fingerprint of the canonical JSON as hex
    pub fn fingerprint(&self) -> Result<String, ModelError> {
        Ok(fingerprint_hex(self)?)
    }

    /// Save model to JSON file with canonical serialization
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load and validate a model from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        let model: DecisionTreeModel = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn create_test_model() -> DecisionTreeModel {
        DecisionTreeModel::new(
            &[ClassLabel::Action, ClassLabel::Animation, ClassLabel::Drama],
            Tree::new(vec![
                Node::internal(0, 1, 0.5, 1, 2),
                Node::leaf(1, vec![1.0, 1.0, 8.0]),
                Node::leaf(2, vec![8.0, 1.0, 1.0]),
            ]),
        )
    }

    #[test]
    fn test_model_validation() {
        assert!(create_test_model().validate().is_ok());

        let mut wrong_version = create_test_model();
        wrong_version.format_version = 2;
        assert!(wrong_version.validate().is_err());

        let mut three_features = create_test_model();
        three_features.n_features = 3;
        assert!(three_features.validate().is_err());

        let mut swapped = create_test_model();
        swapped.feature_names = vec!["gender".into(), "age".into()];
        assert!(swapped.validate().is_err());

        let mut unnamed = create_test_model();
        unnamed.feature_names.clear();
        assert!(unnamed.validate().is_ok());
    }

    #[test]
    fn feature_names_compare_case_insensitively() {
        let mut model = create_test_model();
        model.feature_names = vec!["Age".into(), "Gender".into()];
        assert!(model.validate().is_ok());
    }

    #[test]
    fn classes_must_be_the_interest_labels() {
        let mut unknown = create_test_model();
        unknown.classes[2] = "Comedy".into();
        assert!(unknown.validate().is_err());

        let mut duplicate = create_test_model();
        duplicate.classes[2] = "Action".into();
        assert!(duplicate.validate().is_err());

        let mut short = create_test_model();
        short.classes.pop();
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_save_load_json() {
        let model = create_test_model();
        let file = tempfile::NamedTempFile::new().unwrap();
        model.save_json(file.path()).unwrap();

        let loaded = DecisionTreeModel::load_json(file.path()).unwrap();
        assert_eq!(model, loaded);
        assert_eq!(model.fingerprint().unwrap(), loaded.fingerprint().unwrap());
    }

    #[test]
    fn fingerprint_changes_with_model() {
        let a = create_test_model();
        let mut b = create_test_model();
        b.tree.nodes[0].threshold = 0.25;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }
}
