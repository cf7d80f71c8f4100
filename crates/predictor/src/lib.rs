//! Interest prediction over a fitted decision tree classifier
//!
//! Loads an externally trained classifier artifact once and answers
//! "which interest (Animation, Action, Drama) fits this age and gender",
//! singly or in batches, along with read-only diagnostics of the model.
//!
//! Modules:
//! - `features`: Input vector and its validation
//! - `types`: Class labels and prediction results
//! - `tree`: Classification tree nodes, traversal and introspection
//! - `model`: Artifact format, validation and fingerprinting
//! - `classifier`: Backend seam and the decision tree backend
//! - `predictor`: Typed inference facade
//! - `dataset`: Sample CSV loading
//! - `batch`: Per-row batch outcomes

pub mod batch;
pub mod classifier;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod model;
pub mod predictor;
pub mod serde_canon;
pub mod summary;
pub mod tree;
pub mod types;

pub use batch::{BatchEntry, BatchReport, BatchRowView, BatchStats};
pub use classifier::{Classifier, DecisionTreeClassifier};
pub use dataset::{SampleDataset, SampleRow};
pub use errors::{PredictorError, Result};
pub use features::{FeatureVector, Gender, AGE_MAX, AGE_MIN, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{DecisionTreeModel, ModelError, FORMAT_VERSION};
pub use predictor::Predictor;
pub use summary::{FeatureImportance, ModelSummary};
pub use tree::{Node, Tree, RENDER_MAX_DEPTH};
pub use types::{ClassLabel, PredictionResult};
