//! Feature scaling
//!
//! Per-column affine transforms fitted at training time and applied to the
//! full encoded row before feature selection.

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

use super::error::PredictionError;

/// Saved scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    /// `(x - mean) / scale`. Either part may be absent when the scaler was
    /// fitted without centering or without scaling.
    Standard {
        #[serde(default)]
        mean: Option<Vec<f64>>,
        #[serde(default)]
        scale: Option<Vec<f64>>,
    },

    /// `(x - min) / (max - min)`
    MinMax { min_vals: Vec<f64>, max_vals: Vec<f64> },
}

impl FeatureScaler {
    /// Number of columns the scaler was fitted on, if it constrains width
    pub fn width(&self) -> Option<usize> {
        match self {
            FeatureScaler::Standard { mean, scale } => mean
                .as_ref()
                .map(Vec::len)
                .or_else(|| scale.as_ref().map(Vec::len)),
            FeatureScaler::MinMax { min_vals, .. } => Some(min_vals.len()),
        }
    }

    /// Check internal consistency of the saved parameters
    pub fn validate(&self) -> Result<(), String> {
        match self {
            FeatureScaler::Standard { mean: Some(mean), scale: Some(scale) } if mean.len() != scale.len() => {
                Err(format!("mean has {} columns but scale has {}", mean.len(), scale.len()))
            }
            FeatureScaler::MinMax { min_vals, max_vals } if min_vals.len() != max_vals.len() => {
                Err(format!("min_vals has {} columns but max_vals has {}", min_vals.len(), max_vals.len()))
            }
            _ => Ok(()),
        }
    }

    /// Apply the transform to one full row
    pub fn transform(&self, row: &Array1<f64>) -> Result<Array1<f64>, PredictionError> {
        if let Some(width) = self.width() {
            if width != row.len() {
                return Err(PredictionError::DimensionMismatch {
                    stage: "scaler",
                    expected: width,
                    actual: row.len(),
                });
            }
        }

        let mut out = row.clone();
        match self {
            FeatureScaler::Standard { mean, scale } => {
                if let Some(mean) = mean {
                    out -= &Array1::from(mean.clone());
                }
                if let Some(scale) = scale {
                    // Constant columns were fitted with a zero scale; leave them unscaled
                    Zip::from(&mut out).and(scale.as_slice()).for_each(|v, &s| {
                        if s != 0.0 {
                            *v /= s;
                        }
                    });
                }
            }
            FeatureScaler::MinMax { min_vals, max_vals } => {
                Zip::from(&mut out)
                    .and(min_vals.as_slice())
                    .and(max_vals.as_slice())
                    .for_each(|v, &min, &max| {
                        let range = max - min;
                        *v = if range != 0.0 { (*v - min) / range } else { *v - min };
                    });
            }
        }

        Ok(out)
    }
}
