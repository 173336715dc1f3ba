//! Mood classification
//!
//! The classifier is an external capability: anything implementing
//! [`MoodClassifier`] can score a [`FeatureMatrix`]. It is loaded once and
//! shared read-only across requests (`Arc<dyn MoodClassifier>`).
//!
//! Classifier output is a *named* [`ProbabilityMatrix`]. Before the
//! probabilities are merged with the identity table,
//! [`probability_rows`] checks the column names against the mood categories
//! and the row count against the input.
//!
//! # Modules
//! - `chain`: classifier chain of logistic heads loaded from JSON

pub mod chain;

pub use chain::ClassifierChainModel;

use crate::error::{PipelineError, PipelineResult};
use crate::splitter::FeatureMatrix;
use moodrec_common::mood::MOOD_COUNT;
use moodrec_common::{MoodCategory, ProbabilityRow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Classifier adapter failure
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Model file could not be read
    #[error("Failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model file is not valid JSON for the expected format
    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    /// Model parameters are inconsistent
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Input columns differ from what the model was trained on
    #[error("Feature columns do not match model: {0}")]
    FeatureMismatch(String),
}

/// Multi-label mood classifier
pub trait MoodClassifier: Send + Sync {
    /// Per-category probabilities for every row of `features`, in row order
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<ProbabilityMatrix, ClassifierError>;
}

/// Named classifier output: one column per label, one row per input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Validate classifier output and convert it to typed rows
///
/// # Errors
/// `PipelineError::SchemaMismatch` when the columns are not exactly
/// `angry, calm, feelgood, sad` in that order, when the row count differs
/// from `expected_rows`, or when a value is non-finite or outside [0, 1]
pub fn probability_rows(
    matrix: &ProbabilityMatrix,
    expected_rows: usize,
) -> PipelineResult<Vec<ProbabilityRow>> {
    let expected: Vec<&str> = MoodCategory::ALL.iter().map(|c| c.label()).collect();
    if matrix.columns != expected {
        return Err(PipelineError::SchemaMismatch(format!(
            "expected columns {:?}, classifier returned {:?}",
            expected, matrix.columns
        )));
    }

    if matrix.rows.len() != expected_rows {
        return Err(PipelineError::SchemaMismatch(format!(
            "expected {} rows, classifier returned {}",
            expected_rows,
            matrix.rows.len()
        )));
    }

    matrix
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let values: [f64; MOOD_COUNT] = row.as_slice().try_into().map_err(|_| {
                PipelineError::SchemaMismatch(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    MOOD_COUNT
                ))
            })?;
            ProbabilityRow::from_array(values)
                .map_err(|e| PipelineError::SchemaMismatch(format!("row {}: {}", i, e)))
        })
        .collect()
}
