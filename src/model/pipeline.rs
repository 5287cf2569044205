//! Preprocessing pipeline
//!
//! Turns one patient record into the feature vector the classifier was
//! trained on. The steps run in a fixed order:
//!
//! 1. encode categorical columns with the saved label encoders
//! 2. lay the row out in canonical feature order
//! 3. scale the full row
//! 4. select the trained feature subset

use ndarray::Array1;

use crate::models::{FieldValue, PatientRecord};

use super::encoder::EncoderMap;
use super::error::PredictionError;
use super::layout::FEATURE_LAYOUT;
use super::scaler::FeatureScaler;
use super::selection::FeatureSelection;

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    encoders: Option<EncoderMap>,
    scaler: Option<FeatureScaler>,
    selection: FeatureSelection,
}

impl Preprocessor {
    pub fn new(
        encoders: Option<EncoderMap>,
        scaler: Option<FeatureScaler>,
        selection: FeatureSelection,
    ) -> Self {
        Self { encoders, scaler, selection }
    }

    pub fn encoders(&self) -> Option<&EncoderMap> {
        self.encoders.as_ref()
    }

    pub fn scaler(&self) -> Option<&FeatureScaler> {
        self.scaler.as_ref()
    }

    pub fn selection(&self) -> &FeatureSelection {
        &self.selection
    }

    /// Number of columns `preprocess` produces
    pub fn output_width(&self) -> usize {
        self.selection
            .effective_indices()
            .map_or(FEATURE_LAYOUT.len(), |indices| indices.len())
    }

    pub fn preprocess(&self, record: &PatientRecord) -> Result<Array1<f64>, PredictionError> {
        let row = self.encode_row(record)?;

        let scaled = match &self.scaler {
            Some(scaler) => scaler.transform(&row)?,
            None => row,
        };

        self.selection.apply(scaled)
    }

    /// Steps 1 and 2: encode categorical values and build the canonical row
    fn encode_row(&self, record: &PatientRecord) -> Result<Array1<f64>, PredictionError> {
        let mut row = Vec::with_capacity(FEATURE_LAYOUT.len());

        for &column in FEATURE_LAYOUT {
            let value = match record.field(column) {
                Some(FieldValue::Numeric(v)) => v,
                Some(FieldValue::Categorical(raw)) => match self.encoders.as_ref().and_then(|e| e.get(column)) {
                    Some(encoder) => encoder.encode(column, raw)?,
                    None => {
                        return Err(PredictionError::UnencodedCategory {
                            column: column.to_string(),
                            value: raw.to_string(),
                        })
                    }
                },
                None => {
                    return Err(PredictionError::MalformedModel(format!(
                        "feature '{}' is not a patient field",
                        column
                    )))
                }
            };
            row.push(value);
        }

        Ok(Array1::from(row))
    }
}
