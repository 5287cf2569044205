//! Patient model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One patient's features, as submitted for prediction.
///
/// Numeric ranges are checked at the request boundary. Categorical values are
/// kept as strings: the trained label encoders decide what is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatientRecord {
    /// 'Female', 'Male' or 'Other'
    #[validate(length(min = 1, message = "gender must not be empty"))]
    pub gender: String,

    /// Age in years
    #[validate(range(min = 0.0, max = 120.0, message = "age must be between 0 and 120"))]
    pub age: f64,

    /// 0 (no) or 1 (yes)
    #[validate(range(min = 0, max = 1, message = "hypertension must be 0 or 1"))]
    pub hypertension: i32,

    /// 0 (no) or 1 (yes)
    #[validate(range(min = 0, max = 1, message = "heart_disease must be 0 or 1"))]
    pub heart_disease: i32,

    /// 'No Info', 'current', 'ever', 'former', 'never' or 'not current'
    #[validate(length(min = 1, message = "smoking_history must not be empty"))]
    pub smoking_history: String,

    /// Body Mass Index
    #[validate(range(min = 10.0, max = 100.0, message = "bmi must be between 10 and 100"))]
    pub bmi: f64,

    /// Glycated hemoglobin
    #[serde(rename = "HbA1c_level")]
    #[validate(range(min = 3.5, max = 10.0, message = "HbA1c_level must be between 3.5 and 10"))]
    pub hba1c_level: f64,

    #[validate(range(min = 80.0, max = 300.0, message = "blood_glucose_level must be between 80 and 300"))]
    pub blood_glucose_level: f64,
}

/// Raw value of a single patient field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

impl PatientRecord {
    /// Look up a field by its feature name
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "gender" => FieldValue::Categorical(&self.gender),
            "age" => FieldValue::Numeric(self.age),
            "hypertension" => FieldValue::Numeric(f64::from(self.hypertension)),
            "heart_disease" => FieldValue::Numeric(f64::from(self.heart_disease)),
            "smoking_history" => FieldValue::Categorical(&self.smoking_history),
            "bmi" => FieldValue::Numeric(self.bmi),
            "HbA1c_level" => FieldValue::Numeric(self.hba1c_level),
            "blood_glucose_level" => FieldValue::Numeric(self.blood_glucose_level),
            _ => return None,
        };
        Some(value)
    }

    /// The documented example patient
    pub fn example() -> Self {
        Self {
            gender: "Female".to_string(),
            age: 45.0,
            hypertension: 0,
            heart_disease: 0,
            smoking_history: "never".to_string(),
            bmi: 25.5,
            hba1c_level: 5.7,
            blood_glucose_level: 140.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchPredictionRequest {
    #[validate(nested)]
    pub patients: Vec<PatientRecord>,
}
