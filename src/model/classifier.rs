//! Classifier - capability-typed wrapper around the trained model
//!
//! A loaded classifier is either label-only or label + probability. The
//! prediction engine dispatches on the variant instead of probing the model
//! at runtime.

use std::fmt;

use ndarray::ArrayView1;
use serde::Deserialize;

use super::error::PredictionError;
use super::linear::{LinearSvc, LogisticRegression};
use super::tree::{DecisionTree, RandomForest};

// ============================================================================
// ESTIMATOR TRAITS
// ============================================================================

/// Anything that can turn a preprocessed feature vector into a class label
pub trait Estimator: fmt::Debug + Send + Sync {
    /// Human readable implementation name, reported by the health check
    fn name(&self) -> &'static str;

    /// Predicted class, 0 (no diabetes) or 1 (diabetes)
    fn predict(&self, features: ArrayView1<'_, f64>) -> Result<u8, PredictionError>;
}

/// Estimators that also expose class probabilities
pub trait ProbabilisticEstimator: Estimator {
    /// `[p(class 0), p(class 1)]`
    fn predict_proba(&self, features: ArrayView1<'_, f64>) -> Result<[f64; 2], PredictionError>;
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug)]
pub enum Classifier {
    LabelOnly(Box<dyn Estimator>),
    Probabilistic(Box<dyn ProbabilisticEstimator>),
}

impl Classifier {
    pub fn model_type(&self) -> &'static str {
        match self {
            Classifier::LabelOnly(model) => model.name(),
            Classifier::Probabilistic(model) => model.name(),
        }
    }

    pub fn supports_probability(&self) -> bool {
        matches!(self, Classifier::Probabilistic(_))
    }

    /// Predict `(label, probability of class 1)`.
    ///
    /// Label-only models report the label itself as the probability.
    pub fn predict(&self, features: ArrayView1<'_, f64>) -> Result<(u8, f64), PredictionError> {
        match self {
            Classifier::LabelOnly(model) => {
                let label = model.predict(features)?;
                Ok((label, f64::from(label)))
            }
            Classifier::Probabilistic(model) => {
                let label = model.predict(features)?;
                let [_, positive] = model.predict_proba(features)?;
                Ok((label, positive))
            }
        }
    }
}

// ============================================================================
// SAVED FORM
// ============================================================================

/// Classifier as stored in the artifact directory, tagged by model family
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "model_type")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    #[serde(rename = "LinearSVC")]
    LinearSvc(LinearSvc),
    DecisionTreeClassifier(DecisionTree),
    RandomForestClassifier(RandomForest),
}

impl ClassifierArtifact {
    /// Structural checks that do not depend on an input vector
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::LogisticRegression(m) => m.validate(),
            ClassifierArtifact::LinearSvc(m) => m.validate(),
            ClassifierArtifact::DecisionTreeClassifier(m) => m.validate(),
            ClassifierArtifact::RandomForestClassifier(m) => m.validate(),
        }
    }
}

impl From<ClassifierArtifact> for Classifier {
    fn from(artifact: ClassifierArtifact) -> Self {
        match artifact {
            ClassifierArtifact::LogisticRegression(m) => Classifier::Probabilistic(Box::new(m)),
            ClassifierArtifact::LinearSvc(m) => Classifier::LabelOnly(Box::new(m)),
            ClassifierArtifact::DecisionTreeClassifier(m) => Classifier::Probabilistic(Box::new(m)),
            ClassifierArtifact::RandomForestClassifier(m) => Classifier::Probabilistic(Box::new(m)),
        }
    }
}

/// Class with the highest probability; ties go to class 0
pub(crate) fn argmax(proba: [f64; 2]) -> u8 {
    if proba[1] > proba[0] {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn load(json: &str) -> Classifier {
        let artifact: ClassifierArtifact = serde_json::from_str(json).unwrap();
        artifact.validate().unwrap();
        artifact.into()
    }

    #[test]
    fn test_logistic_regression_is_probabilistic() {
        let classifier = load(r#"{"model_type": "LogisticRegression", "coef": [1.0, -1.0], "intercept": 0.0}"#);

        assert_eq!(classifier.model_type(), "LogisticRegression");
        assert!(classifier.supports_probability());

        let (label, probability) = classifier.predict(array![2.0, 2.0].view()).unwrap();
        assert_eq!(label, 0);
        assert!((probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_label_only_probability_equals_label() {
        let classifier = load(r#"{"model_type": "LinearSVC", "coef": [1.0], "intercept": -1.0}"#);

        assert_eq!(classifier.model_type(), "LinearSVC");
        assert!(!classifier.supports_probability());

        assert_eq!(classifier.predict(array![3.0].view()).unwrap(), (1, 1.0));
        assert_eq!(classifier.predict(array![0.5].view()).unwrap(), (0, 0.0));
    }

    #[test]
    fn test_tree_artifact() {
        let classifier = load(
            r#"{
                "model_type": "DecisionTreeClassifier",
                "nodes": [
                    {"split": {"feature": 0, "threshold": 6.5, "left": 1, "right": 2}},
                    {"leaf": {"value": [9.0, 1.0]}},
                    {"leaf": {"value": [1.0, 3.0]}}
                ]
            }"#,
        );

        assert_eq!(classifier.model_type(), "DecisionTreeClassifier");
        assert_eq!(classifier.predict(array![7.0].view()).unwrap(), (1, 0.75));
    }

    #[test]
    fn test_unknown_model_type_is_rejected() {
        let result = serde_json::from_str::<ClassifierArtifact>(r#"{"model_type": "XGBClassifier"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_argmax_ties_go_to_negative_class() {
        assert_eq!(argmax([0.5, 0.5]), 0);
        assert_eq!(argmax([0.4, 0.6]), 1);
    }
}
