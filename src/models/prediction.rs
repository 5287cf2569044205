//! Prediction response models

use serde::{Deserialize, Serialize};

use crate::model::{Prediction, RiskLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 0 (no diabetes) or 1 (diabetes)
    pub prediction: u8,
    /// Probability of diabetes, rounded to 4 decimals
    pub probability: f64,
    pub risk_level: RiskLevel,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            prediction: p.label,
            probability: round4(p.probability),
            // bucketed on the unrounded probability
            risk_level: p.risk_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResponse>,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
