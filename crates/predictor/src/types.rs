//! Class labels and prediction results

use crate::errors::PredictorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Interest category predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    Animation,
    Action,
    Drama,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 3] = [ClassLabel::Animation, ClassLabel::Action, ClassLabel::Drama];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Animation => "Animation",
            ClassLabel::Action => "Action",
            ClassLabel::Drama => "Drama",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ClassLabel::Animation => "🎬",
            ClassLabel::Action => "💥",
            ClassLabel::Drama => "🎭",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PredictorError::InvalidInput(format!("unknown interest label '{}'", s.trim())))
    }
}

/// Predicted label plus the full per-class distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: ClassLabel,
    pub probabilities: BTreeMap<ClassLabel, f64>,
}

impl PredictionResult {
    /// Probability of the predicted label
    pub fn confidence(&self) -> f64 {
        self.probability(self.label)
    }

    pub fn probability(&self, label: ClassLabel) -> f64 {
        self.probabilities.get(&label).copied().unwrap_or(0.0)
    }

    /// Distribution ordered from most to least likely; ties keep label order.
    pub fn ranked(&self) -> Vec<(ClassLabel, f64)> {
        let mut ranked: Vec<(ClassLabel, f64)> =
            self.probabilities.iter().map(|(l, p)| (*l, *p)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
