//! Decision tree structures for classification
//!
//! Nodes are stored in a flat vector with node 0 as the root. Internal nodes
//! send `x[feature] <= threshold` to the left child. Every node carries the
//! per-class weights observed at fit time; leaves turn them into
//! probabilities.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Split levels drawn by [`Tree::render_text`] before a branch is summarized
pub const RENDER_MAX_DEPTH: usize = 10;

/// A tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0` indexes the feature vector
/// - `left` and `right` are child node indices
///
/// For leaf nodes:
/// - `feature_idx == -1` and `left == right == -1`
/// - `value` holds the class weights used for prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    #[serde(rename = "feature", alias = "feature_idx")]
    pub feature_idx: i32,

    /// Split threshold
    #[serde(default)]
    pub threshold: f64,

    /// Training samples that reached this node
    #[serde(default)]
    pub samples: u64,

    /// Impurity (gini or entropy) at this node
    #[serde(default)]
    pub impurity: f64,

    /// Per-class weights, in the model's class order
    #[serde(default)]
    pub value: Vec<f64>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            samples: 0,
            impurity: 0.0,
            value: Vec::new(),
        }
    }

    /// Create a new leaf node holding class weights
    pub fn leaf(id: i32, value: Vec<f64>) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            samples: value.iter().sum::<f64>().max(0.0) as u64,
            impurity: 0.0,
            value,
        }
    }

    /// Attach fit-time statistics used for feature importances
    pub fn with_stats(mut self, samples: u64, impurity: f64) -> Self {
        self.samples = samples;
        self.impurity = impurity;
        self
    }

    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        self.feature_idx < 0 || self.left < 0 || self.right < 0
    }

    /// Normalized class probabilities, if the weights are usable
    pub fn probabilities(&self) -> Option<Vec<f64>> {
        let total: f64 = self.value.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return None;
        }
        Some(self.value.iter().map(|w| w / total).collect())
    }

    /// Index of the heaviest class; ties resolve to the lowest index.
    pub fn majority_class(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &w) in self.value.iter().enumerate() {
            match best {
                Some((_, current)) if w <= current => {}
                _ => best = Some((i, w)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf and return the leaf's index.
    ///
    /// Returns `None` on a malformed structure; [`Tree::validate`] rules that
    /// out for loaded artifacts.
    pub fn leaf_index(&self, features: &[f64]) -> Option<usize> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return Some(idx);
            }

            let feature_value = *features.get(node.feature_idx as usize)?;

            let next = if feature_value <= node.threshold {
                node.left
            } else {
                node.right
            };

            // Children always sit after their parent, so the walk terminates.
            if next as usize <= idx || next as usize >= self.nodes.len() {
                return None;
            }
            idx = next as usize;
        }
    }

    /// Leaf reached by `features`
    pub fn evaluate(&self, features: &[f64]) -> Option<&Node> {
        self.leaf_index(features).map(|idx| &self.nodes[idx])
    }

    /// Validate tree structure against the model's feature and class counts
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_leaf() {
                for (side, child) in [("left", node.left), ("right", node.right)] {
                    if child as usize >= self.nodes.len() {
                        return Err(format!("Node {i} has invalid {side} child: {child}"));
                    }
                    if child as usize <= i {
                        return Err(format!(
                            "Node {i} has {side} child {child} that does not follow it"
                        ));
                    }
                }

                if node.feature_idx as usize >= n_features {
                    return Err(format!(
                        "Internal node {} has invalid feature index: {}",
                        i, node.feature_idx
                    ));
                }

                if !node.threshold.is_finite() {
                    return Err(format!("Internal node {i} has a non-finite threshold"));
                }
            } else {
                if node.value.len() != n_classes {
                    return Err(format!(
                        "Leaf node {} has {} class weights, expected {}",
                        i,
                        node.value.len(),
                        n_classes
                    ));
                }
                if node.value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!("Leaf node {i} has a negative or non-finite weight"));
                }
                if node.probabilities().is_none() {
                    return Err(format!("Leaf node {i} has no class weight"));
                }
            }
        }

        Ok(())
    }

    /// Edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.heights().first().copied().unwrap_or(0)
    }

    /// Height of the subtree under every node.
    ///
    /// Children follow their parent, so one backward pass sees every child
    /// before its parent.
    fn heights(&self) -> Vec<usize> {
        let mut heights = vec![0usize; self.nodes.len()];
        for idx in (0..self.nodes.len()).rev() {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                continue;
            }
            let below = |child: i32| {
                if child as usize > idx {
                    heights.get(child as usize).copied().unwrap_or(0)
                } else {
                    0
                }
            };
            let height = 1 + below(node.left).max(below(node.right));
            heights[idx] = height;
        }
        heights
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Mean impurity decrease per feature, normalized to sum to 1.
    ///
    /// All zeros when the artifact carries no impurity statistics.
    pub fn feature_importances(&self, n_features: usize) -> Vec<f64> {
        let mut importances = vec![0.0; n_features];

        for node in self.nodes.iter().filter(|n| !n.is_leaf()) {
            let (Some(left), Some(right)) = (
                self.nodes.get(node.left as usize),
                self.nodes.get(node.right as usize),
            ) else {
                continue;
            };
            let weighted = |n: &Node| n.samples as f64 * n.impurity;
            let decrease = weighted(node) - weighted(left) - weighted(right);
            if let Some(slot) = importances.get_mut(node.feature_idx as usize) {
                *slot += decrease.max(0.0);
            }
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for value in &mut importances {
                *value /= total;
            }
        }
        importances
    }

    /// Text diagram of the tree, one line per branch or leaf.
    ///
    /// Subtrees starting [`RENDER_MAX_DEPTH`] levels down are collapsed into
    /// a single `truncated branch of depth N` line.
    pub fn render_text(&self, feature_names: &[String], class_names: &[String]) -> String {
        enum Step {
            Visit { idx: usize, level: usize },
            Split { idx: usize, level: usize, op: &'static str },
        }

        let heights = self.heights();
        let mut out = String::new();
        let mut stack = vec![Step::Visit { idx: 0, level: 0 }];

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit { idx, level } => {
                    let Some(node) = self.nodes.get(idx) else {
                        continue;
                    };
                    if node.is_leaf() {
                        self.render_leaf(&mut out, idx, level, class_names);
                    } else if level >= RENDER_MAX_DEPTH {
                        let _ = writeln!(
                            out,
                            "{}|--- truncated branch of depth {}",
                            "|   ".repeat(level),
                            heights[idx]
                        );
                    } else {
                        let (left, right) = (node.left as usize, node.right as usize);
                        // Popped in reverse: "<=" line, left subtree, "> " line, right subtree.
                        if right > idx {
                            stack.push(Step::Visit { idx: right, level: level + 1 });
                        }
                        stack.push(Step::Split { idx, level, op: "> " });
                        if left > idx {
                            stack.push(Step::Visit { idx: left, level: level + 1 });
                        }
                        stack.push(Step::Split { idx, level, op: "<=" });
                    }
                }
                Step::Split { idx, level, op } => {
                    let node = &self.nodes[idx];
                    let name = feature_names
                        .get(node.feature_idx as usize)
                        .cloned()
                        .unwrap_or_else(|| format!("feature_{}", node.feature_idx));
                    let _ = writeln!(
                        out,
                        "{}|--- {name} {op} {:.2}",
                        "|   ".repeat(level),
                        node.threshold
                    );
                }
            }
        }
        out
    }

    fn render_leaf(&self, out: &mut String, idx: usize, level: usize, class_names: &[String]) {
        let class = self.nodes[idx]
            .majority_class()
            .and_then(|c| class_names.get(c))
            .map(String::as_str)
            .unwrap_or("?");
        let _ = writeln!(out, "{}|--- class: {class}", "|   ".repeat(level));
    }
}
