//! Prediction engine
//!
//! `ModelService` is built once at startup and shared read-only by every
//! request handler. It never changes after construction, so concurrent
//! requests need no locking.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::PatientRecord;

use super::artifacts::ModelArtifacts;
use super::error::{ArtifactError, PredictionError};
use super::layout::{feature_name, LayoutInfo};
use super::risk::RiskLevel;

/// Output of a single prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// 0 (no diabetes) or 1 (diabetes)
    pub label: u8,
    /// Probability of diabetes in [0, 1]
    pub probability: f64,
}

impl Prediction {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }
}

#[derive(Debug, Default)]
pub struct ModelService {
    artifacts: Option<ModelArtifacts>,
}

impl ModelService {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts: Some(artifacts) }
    }

    /// A service with no classifier. Every prediction fails with
    /// `ModelNotLoaded`.
    pub fn unloaded() -> Self {
        Self { artifacts: None }
    }

    /// Load artifacts from `models_dir`.
    ///
    /// A missing classifier is fatal when `required` is set; otherwise the
    /// service starts without a model.
    pub fn load(models_dir: &Path, required: bool) -> Result<Self, ArtifactError> {
        match ModelArtifacts::load(models_dir) {
            Ok(artifacts) => Ok(Self::new(artifacts)),
            Err(ArtifactError::Missing(path)) if !required => {
                tracing::error!("Model file not found: {}. Starting without a model", path.display());
                Ok(Self::unloaded())
            }
            Err(e) => {
                tracing::error!("Error loading model: {}", e);
                Err(e)
            }
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn model_type(&self) -> Option<&'static str> {
        self.artifacts.as_ref().map(ModelArtifacts::model_type)
    }

    /// Predict diabetes for one patient
    pub fn predict(&self, patient: &PatientRecord) -> Result<Prediction, PredictionError> {
        let artifacts = self.artifacts.as_ref().ok_or(PredictionError::ModelNotLoaded)?;

        let features = artifacts.preprocessor.preprocess(patient)?;
        let (label, probability) = artifacts.classifier.predict(features.view())?;

        Ok(Prediction { label, probability })
    }

    /// Predict each patient in order. The first failure aborts the batch.
    pub fn predict_batch(&self, patients: &[PatientRecord]) -> Result<Vec<Prediction>, PredictionError> {
        patients.iter().map(|p| self.predict(p)).collect()
    }

    pub fn info(&self) -> ModelInfo {
        let Some(artifacts) = &self.artifacts else {
            return ModelInfo::default();
        };

        let preprocessor = &artifacts.preprocessor;
        let selection = preprocessor.selection();

        ModelInfo {
            model_loaded: true,
            model_type: Some(artifacts.model_type()),
            supports_probability: Some(artifacts.classifier.supports_probability()),
            models_dir: Some(artifacts.models_dir.clone()),
            loaded_at: Some(artifacts.loaded_at),
            layout: Some(LayoutInfo::current()),
            scaler_loaded: preprocessor.scaler().is_some(),
            encoders: preprocessor.encoders().map(|encoders| {
                encoders
                    .iter()
                    .map(|(column, encoder)| (column.clone(), encoder.classes().to_vec()))
                    .collect()
            }),
            feature_indices: selection.indices().map(<[usize]>::to_vec),
            selected_features: selection.effective_indices().map(|indices| {
                indices
                    .into_iter()
                    .map(|i| feature_name(i).map_or_else(|| format!("#{}", i), str::to_string))
                    .collect()
            }),
            input_width: Some(preprocessor.output_width()),
        }
    }
}

/// Loaded model description
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelInfo {
    pub model_loaded: bool,
    pub model_type: Option<&'static str>,
    pub supports_probability: Option<bool>,
    pub models_dir: Option<PathBuf>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub layout: Option<LayoutInfo>,
    pub scaler_loaded: bool,
    pub encoders: Option<BTreeMap<String, Vec<String>>>,
    pub feature_indices: Option<Vec<usize>>,
    /// Columns fed to the classifier, in order
    pub selected_features: Option<Vec<String>>,
    pub input_width: Option<usize>,
}
