// SPDX-License-Identifier: Apache-2.0

use rfjam_model::{FEATURE_COLUMNS, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const FOREST_FORMAT: &str = "rfjam-forest/v1";

/// Child index marking a leaf node.
pub const TREE_LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Display for ClassLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One fitted tree in flat array form. Node `i` is a leaf when
/// `children_left[i] == TREE_LEAF`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` descend left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaf rows are read.
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree node arrays differ in length".to_string());
        }
        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                ));
            }
            if self.children_left[node] == TREE_LEAF {
                continue;
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= FEATURE_COUNT {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
            for child in [self.children_left[node], self.children_right[node]] {
                // Children are laid out after their parent, which also rules out cycles.
                if child <= node as i64 || child as usize >= n {
                    return Err(format!("node {node} has out-of-order child {child}"));
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, row: &[f64; FEATURE_COUNT]) -> Result<usize, String> {
        let mut node = 0_usize;
        for _ in 0..self.children_left.len() {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                return Ok(node);
            }
            let x = row[self.feature[node] as usize];
            let next = if x <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };
            node = usize::try_from(next).map_err(|_| format!("invalid child index {next}"))?;
        }
        Err("tree walk did not reach a leaf".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub format: String,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub classes: Vec<ClassLabel>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.format != FOREST_FORMAT {
            return Err(format!(
                "unsupported model format `{}` (expected `{FOREST_FORMAT}`)",
                self.format
            ));
        }
        if self.n_features != FEATURE_COUNT {
            return Err(format!(
                "model expects {} features, service provides {FEATURE_COUNT}",
                self.n_features
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
                return Err(format!(
                    "model feature order {names:?} does not match {FEATURE_COLUMNS:?}"
                ));
            }
        }
        if self.classes.is_empty() {
            return Err("model has no classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("model has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.classes.len())
                .map_err(|e| format!("tree {idx}: {e}"))?;
        }
        Ok(())
    }

    /// Mean of the normalized leaf distributions across all trees.
    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>, String> {
        let mut proba = vec![0.0_f64; self.classes.len()];
        for (idx, tree) in self.trees.iter().enumerate() {
            let leaf = tree.leaf_for(row).map_err(|e| format!("tree {idx}: {e}"))?;
            let weights = &tree.value[leaf];
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                return Err(format!("tree {idx}: leaf {leaf} has no class weight"));
            }
            for (p, w) in proba.iter_mut().zip(weights) {
                *p += w / total;
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        Ok(proba)
    }

    /// Highest-probability class; the lowest class index wins ties.
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> Result<&ClassLabel, String> {
        let proba = self.predict_proba(row)?;
        let mut best = 0_usize;
        for (idx, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = idx;
            }
        }
        Ok(&self.classes[best])
    }
}
