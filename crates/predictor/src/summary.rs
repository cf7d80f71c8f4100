//! Read-only model diagnostics

use crate::types::ClassLabel;
use serde::{Deserialize, Serialize};

/// Importance of one input feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Structural description of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub depth: usize,
    pub leaf_count: usize,
    pub node_count: usize,
    pub feature_names: Vec<String>,
    pub classes: Vec<ClassLabel>,
    /// Most important first
    pub feature_importances: Vec<FeatureImportance>,
    /// BLAKE3 hex digest of the artifact's canonical JSON
    pub fingerprint: String,
}

/// Pair names with importances and rank them, keeping fit order on ties.
pub fn rank_importances(names: &[String], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}
