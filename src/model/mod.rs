//! Model Module - preprocessing and inference
//!
//! Loads the offline training artifacts and turns patient records into
//! predictions. Nothing here is mutated after startup.

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod linear;
pub mod pipeline;
pub mod risk;
pub mod scaler;
pub mod selection;
pub mod service;
pub mod tree;

#[cfg(test)]
pub(crate) mod tests;

// Re-export common types
pub use error::{ArtifactError, PredictionError};
pub use risk::RiskLevel;
pub use service::{ModelInfo, ModelService, Prediction};
