//! Tree models
//!
//! Trees are stored as a flat node list rooted at index 0. A split sends the
//! sample left when `x[feature] <= threshold`. Leaves hold per-class weights
//! (sample counts or fractions), normalized at prediction time.

use ndarray::ArrayView1;
use serde::Deserialize;

use super::classifier::{argmax, Estimator, ProbabilisticEstimator};
use super::error::PredictionError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    /// Input width the tree was fitted on, when recorded
    #[serde(default)]
    n_features: Option<usize>,
}

impl DecisionTree {
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { left, right, threshold, .. } => {
                    // Children always come after their parent, which also rules out cycles
                    if *left <= i || *right <= i || *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {} has invalid children ({}, {})", i, left, right));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != 2 {
                        return Err(format!("leaf {} has {} class weights, expected 2", i, value.len()));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {} has invalid class weights {:?}", i, value));
                    }
                }
            }
        }

        Ok(())
    }

    fn leaf_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], PredictionError> {
        if let Some(expected) = self.n_features {
            if expected != features.len() {
                return Err(PredictionError::DimensionMismatch {
                    stage: "classifier",
                    expected,
                    actual: features.len(),
                });
            }
        }

        let mut index = 0;
        // A valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(index).ok_or_else(|| {
                PredictionError::MalformedModel(format!("tree references missing node {}", index))
            })?;

            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    let value = features.get(*feature).ok_or_else(|| {
                        PredictionError::MalformedModel(format!(
                            "node {} splits on feature {} but the input has {} features",
                            index,
                            feature,
                            features.len()
                        ))
                    })?;
                    index = if value <= threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return normalize(value),
            }
        }

        Err(PredictionError::MalformedModel("tree traversal did not reach a leaf".to_string()))
    }
}

fn normalize(value: &[f64]) -> Result<[f64; 2], PredictionError> {
    let [negative, positive] = value else {
        return Err(PredictionError::MalformedModel(format!(
            "leaf has {} class weights, expected 2",
            value.len()
        )));
    };
    let total = negative + positive;
    if total <= 0.0 || !total.is_finite() {
        return Err(PredictionError::MalformedModel(format!("leaf has invalid class weights {:?}", value)));
    }
    Ok([negative / total, positive / total])
}

impl Estimator for DecisionTree {
    fn name(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, PredictionError> {
        self.leaf_proba(features).map(argmax)
    }
}

impl ProbabilisticEstimator for DecisionTree {
    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], PredictionError> {
        self.leaf_proba(features)
    }
}

/// Random forest: class probabilities are the mean of its trees'
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate().map_err(|e| format!("tree {}: {}", i, e)))
    }

    fn mean_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], PredictionError> {
        if self.trees.is_empty() {
            return Err(PredictionError::MalformedModel("forest has no trees".to_string()));
        }

        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let [p0, p1] = tree.leaf_proba(features)?;
            sum[0] += p0;
            sum[1] += p1;
        }

        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

impl Estimator for RandomForest {
    fn name(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, PredictionError> {
        self.mean_proba(features).map(argmax)
    }
}

impl ProbabilisticEstimator for RandomForest {
    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], PredictionError> {
        self.mean_proba(features)
    }
}
