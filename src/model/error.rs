//! Model errors
//!
//! `ArtifactError` is fatal and only raised at startup.
//! `PredictionError` is raised per request and propagated unchanged to the
//! HTTP boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Mandatory artifact (the classifier) is absent
    #[error("Model file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model is not loaded")]
    ModelNotLoaded,

    #[error("Unknown value '{value}' for feature '{column}'. Allowed values: {}", format_allowed(.allowed))]
    UnknownCategory {
        column: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Feature '{column}' has no label encoder, cannot convert '{value}' to a number")]
    UnencodedCategory { column: String, value: String },

    #[error("{stage}: expected {expected} features, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Feature index {index} is out of bounds for a row of {width} features")]
    FeatureIndexOutOfRange { index: usize, width: usize },

    #[error("Malformed model: {0}")]
    MalformedModel(String),
}

impl PredictionError {
    /// Errors caused by the caller's input rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictionError::UnknownCategory { .. } | PredictionError::UnencodedCategory { .. }
        )
    }
}

fn format_allowed(allowed: &[String]) -> String {
    let quoted: Vec<String> = allowed.iter().map(|a| format!("'{}'", a)).collect();
    format!("[{}]", quoted.join(", "))
}
