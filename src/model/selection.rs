//! Feature selection
//!
//! Reduces the scaled row to the subset (and order) of columns the
//! classifier was trained on. Saved indices are the primary path; saved
//! feature names are only consulted when no index list exists.

use ndarray::Array1;

use super::error::PredictionError;
use super::layout::feature_index;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSelection {
    indices: Option<Vec<usize>>,
    names: Option<Vec<String>>,
}

impl FeatureSelection {
    pub fn new(indices: Option<Vec<usize>>, names: Option<Vec<String>>) -> Self {
        Self { indices, names }
    }

    pub fn indices(&self) -> Option<&[usize]> {
        self.indices.as_deref()
    }

    /// Saved names that do not exist in the canonical layout. The name
    /// fallback skips these.
    pub fn unknown_names(&self) -> Vec<&str> {
        self.names
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|name| feature_index(name).is_none())
            .collect()
    }

    /// Column positions that will actually be gathered from a full row, or
    /// `None` when the full row passes through.
    pub fn effective_indices(&self) -> Option<Vec<usize>> {
        if let Some(indices) = &self.indices {
            return Some(indices.clone());
        }

        let resolved: Vec<usize> = self
            .names
            .iter()
            .flatten()
            .filter_map(|name| feature_index(name))
            .collect();

        if resolved.is_empty() {
            None
        } else {
            Some(resolved)
        }
    }

    /// Gather the selected columns from a full row
    pub fn apply(&self, row: Array1<f64>) -> Result<Array1<f64>, PredictionError> {
        let Some(indices) = self.effective_indices() else {
            return Ok(row);
        };

        if let Some(&index) = indices.iter().find(|&&i| i >= row.len()) {
            return Err(PredictionError::FeatureIndexOutOfRange { index, width: row.len() });
        }

        Ok(indices.iter().map(|&i| row[i]).collect())
    }
}
