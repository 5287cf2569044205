//! Label encoders for categorical columns
//!
//! A label encoder maps each known class to its position in the sorted class
//! list, the same codes the classifier saw during training.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::PredictionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from its known classes. Classes are sorted and
    /// de-duplicated so that codes are stable regardless of input order.
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Integer code for `value`, if it is a known class
    pub fn code(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    /// Encode `value` for `column`, failing on anything outside the trained
    /// vocabulary.
    pub fn encode(&self, column: &str, value: &str) -> Result<f64, PredictionError> {
        self.code(value)
            .map(|code| code as f64)
            .ok_or_else(|| PredictionError::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
                allowed: self.classes.clone(),
            })
    }

    /// Saved class lists must already be sorted and unique; codes are
    /// positions in that list and are never rewritten.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("label encoder has no classes".to_string());
        }
        match self.classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            Some(pair) if pair[0] == pair[1] => Err(format!("duplicate class '{}'", pair[0])),
            Some(pair) => Err(format!("classes are not sorted: '{}' before '{}'", pair[0], pair[1])),
            None => Ok(()),
        }
    }
}

/// Column name -> encoder
pub type EncoderMap = BTreeMap<String, LabelEncoder>;
