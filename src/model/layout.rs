//! Feature Layout - Canonical Column Order
//!
//! **This file controls the feature schema the model was trained on.**
//!
//! Encoding, scaling and feature selection all index into a row built in
//! exactly this order. Changing it invalidates every saved scaler and
//! feature index list.

use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order they were used during training
pub const FEATURE_LAYOUT: &[&str] = &[
    "gender",              // 0: categorical
    "age",                 // 1: years
    "hypertension",        // 2: 0/1
    "heart_disease",       // 3: 0/1
    "smoking_history",     // 4: categorical
    "bmi",                 // 5: body mass index
    "HbA1c_level",         // 6: glycated hemoglobin
    "blood_glucose_level", // 7: mg/dL
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 8;

/// Columns whose raw value is a string and must go through a label encoder
pub const CATEGORICAL_FEATURES: &[&str] = &["gender", "smoking_history"];

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

pub fn is_categorical(name: &str) -> bool {
    CATEGORICAL_FEATURES.contains(&name)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description for the model info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    pub categorical: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}
