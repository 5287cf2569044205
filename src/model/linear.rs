//! Linear models

use ndarray::ArrayView1;
use serde::Deserialize;

use super::classifier::{Estimator, ProbabilisticEstimator};
use super::error::PredictionError;

#[derive(Debug, Clone, Deserialize)]
struct LinearWeights {
    coef: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl LinearWeights {
    fn validate(&self) -> Result<(), String> {
        if self.coef.is_empty() {
            return Err("coef is empty".to_string());
        }
        if self.coef.iter().chain(std::iter::once(&self.intercept)).any(|w| !w.is_finite()) {
            return Err("weights must be finite".to_string());
        }
        Ok(())
    }

    fn decision_function(&self, features: ArrayView1<'_, f64>) -> Result<f64, PredictionError> {
        if features.len() != self.coef.len() {
            return Err(PredictionError::DimensionMismatch {
                stage: "classifier",
                expected: self.coef.len(),
                actual: features.len(),
            });
        }
        Ok(ArrayView1::from(self.coef.as_slice()).dot(&features) + self.intercept)
    }
}

/// Binary logistic regression: `p(1) = sigmoid(coef . x + intercept)`
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    #[serde(flatten)]
    weights: LinearWeights,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()
    }
}

impl Estimator for LogisticRegression {
    fn name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, PredictionError> {
        Ok(u8::from(self.weights.decision_function(features)? > 0.0))
    }
}

impl ProbabilisticEstimator for LogisticRegression {
    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], PredictionError> {
        let positive = sigmoid(self.weights.decision_function(features)?);
        Ok([1.0 - positive, positive])
    }
}

/// Linear support vector classifier. Exposes no probabilities.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearSvc {
    #[serde(flatten)]
    weights: LinearWeights,
}

impl LinearSvc {
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()
    }
}

impl Estimator for LinearSvc {
    fn name(&self) -> &'static str {
        "LinearSVC"
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, PredictionError> {
        Ok(u8::from(self.weights.decision_function(features)? > 0.0))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
