//! Artifact loading
//!
//! Reads the offline training outputs from the models directory once at
//! startup. Only the classifier is mandatory; every other artifact may be
//! missing, in which case the matching pipeline step is skipped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::classifier::{Classifier, ClassifierArtifact};
use super::encoder::EncoderMap;
use super::error::ArtifactError;
use super::layout::{is_categorical, FEATURE_COUNT};
use super::pipeline::Preprocessor;
use super::scaler::FeatureScaler;
use super::selection::FeatureSelection;

// ============================================================================
// FILE LAYOUT
// ============================================================================

pub const MODEL_FILE: &str = "best_diabetes_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const SELECTED_FEATURES_FILE: &str = "selected_features.json";
pub const FEATURE_INDICES_FILE: &str = "feature_indices.json";

// ============================================================================
// LOADED ARTIFACTS
// ============================================================================

/// Everything needed to serve predictions, immutable after load
#[derive(Debug)]
pub struct ModelArtifacts {
    pub classifier: Classifier,
    pub preprocessor: Preprocessor,
    pub models_dir: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

impl ModelArtifacts {
    pub fn new(classifier: Classifier, preprocessor: Preprocessor, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            classifier,
            preprocessor,
            models_dir: models_dir.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn model_type(&self) -> &'static str {
        self.classifier.model_type()
    }

    /// Load all artifacts from `models_dir`
    pub fn load(models_dir: &Path) -> Result<Self, ArtifactError> {
        let model_path = models_dir.join(MODEL_FILE);
        if !model_path.exists() {
            return Err(ArtifactError::Missing(model_path));
        }

        let artifact: ClassifierArtifact = read_json(&model_path)?;
        artifact
            .validate()
            .map_err(|reason| ArtifactError::Invalid { path: model_path.clone(), reason })?;
        let classifier = Classifier::from(artifact);
        tracing::info!("Model loaded from {} ({})", model_path.display(), classifier.model_type());

        let scaler_path = models_dir.join(SCALER_FILE);
        let scaler: Option<FeatureScaler> = read_optional(&scaler_path, "Scaler")?;
        if let Some(scaler) = &scaler {
            scaler
                .validate()
                .map_err(|reason| ArtifactError::Invalid { path: scaler_path.clone(), reason })?;
            if let Some(width) = scaler.width().filter(|&w| w != FEATURE_COUNT) {
                tracing::warn!(
                    "Scaler was fitted on {} features but rows have {}; predictions will fail",
                    width,
                    FEATURE_COUNT
                );
            }
        }

        let encoders_path = models_dir.join(ENCODERS_FILE);
        let encoders: Option<EncoderMap> = read_optional(&encoders_path, "Label encoders")?;
        if let Some(encoders) = &encoders {
            for (column, encoder) in encoders {
                encoder.validate().map_err(|reason| ArtifactError::Invalid {
                    path: encoders_path.clone(),
                    reason: format!("encoder for '{}': {}", column, reason),
                })?;
            }
            for column in encoders.keys().filter(|c| !is_categorical(c)) {
                tracing::warn!("Ignoring label encoder for non-categorical column '{}'", column);
            }
        }

        let names: Option<Vec<String>> = read_optional(&models_dir.join(SELECTED_FEATURES_FILE), "Selected features")?;
        if let Some(names) = &names {
            tracing::info!("Selected features: {:?}", names);
        }

        let indices: Option<Vec<usize>> = read_optional(&models_dir.join(FEATURE_INDICES_FILE), "Feature indices")?;

        let selection = FeatureSelection::new(indices, names);
        if let Some(bad) = selection.indices().and_then(|i| i.iter().find(|&&i| i >= FEATURE_COUNT)) {
            tracing::warn!("Feature index {} is outside the {}-feature layout", bad, FEATURE_COUNT);
        }
        if selection.indices().is_none() {
            let unknown = selection.unknown_names();
            if !unknown.is_empty() {
                tracing::warn!("Selected features not in the feature layout will be skipped: {:?}", unknown);
            }
        }

        let preprocessor = Preprocessor::new(encoders, scaler, selection);
        tracing::info!(
            "Model service initialized successfully ({} input features)",
            preprocessor.output_width()
        );

        Ok(Self::new(classifier, preprocessor, models_dir))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an optional artifact, logging a degraded-mode warning when absent
fn read_optional<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Option<T>, ArtifactError> {
    if !path.exists() {
        tracing::warn!("{} file not found: {}", what, path.display());
        return Ok(None);
    }

    let value = read_json(path)?;
    tracing::info!("{} loaded from {}", what, path.display());
    Ok(Some(value))
}
