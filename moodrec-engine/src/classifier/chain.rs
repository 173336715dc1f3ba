//! Classifier chain of logistic heads
//!
//! Model file format (JSON):
//! ```json
//! {
//!   "feature_columns": ["artist_pop", "track_pop", "valence", ...],
//!   "scaler": { "mean": [...], "scale": [...] },
//!   "labels": [
//!     { "name": "angry", "weights": [...], "bias": -0.3 },
//!     { "name": "calm",  "weights": [...], "bias": 0.1 }
//!   ]
//! }
//! ```
//!
//! Heads are evaluated in `labels` order. Head `i` sees the (standardized)
//! feature row followed by the 0/1 predictions of heads `0..i`, so its weight
//! vector has `feature_columns.len() + i` entries. `scaler` is optional.

use super::{ClassifierError, MoodClassifier, ProbabilityMatrix};
use crate::splitter::FeatureMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Per-column standardization: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// One logistic head of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelHead {
    pub name: String,
    pub weights: Vec<f64>,
    pub bias: f64,
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    feature_columns: Vec<String>,
    #[serde(default)]
    scaler: Option<Scaler>,
    labels: Vec<LabelHead>,
}

/// Pretrained classifier chain
#[derive(Debug, Clone)]
pub struct ClassifierChainModel {
    feature_columns: Vec<String>,
    scaler: Option<Scaler>,
    heads: Vec<LabelHead>,
}

impl ClassifierChainModel {
    /// Load a model from a JSON file
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            features = model.feature_columns.len(),
            labels = ?model.labels(),
            "Loaded mood classifier"
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let file: ModelFile = serde_json::from_str(json)?;
        Self::new(file.feature_columns, file.scaler, file.labels)
    }

    /// Build a model, checking all dimensions agree
    pub fn new(
        feature_columns: Vec<String>,
        scaler: Option<Scaler>,
        heads: Vec<LabelHead>,
    ) -> Result<Self, ClassifierError> {
        let n = feature_columns.len();
        if n == 0 {
            return Err(ClassifierError::InvalidModel(
                "no feature columns".to_string(),
            ));
        }
        if heads.is_empty() {
            return Err(ClassifierError::InvalidModel("no labels".to_string()));
        }

        if let Some(scaler) = &scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(ClassifierError::InvalidModel(format!(
                    "scaler has {} means and {} scales for {} features",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                )));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(ClassifierError::InvalidModel(
                    "scaler scale must be finite and non-zero".to_string(),
                ));
            }
        }

        for (i, head) in heads.iter().enumerate() {
            if head.weights.len() != n + i {
                return Err(ClassifierError::InvalidModel(format!(
                    "label '{}' has {} weights, expected {}",
                    head.name,
                    head.weights.len(),
                    n + i
                )));
            }
        }

        Ok(Self {
            feature_columns,
            scaler,
            heads,
        })
    }

    /// Label names in chain order
    pub fn labels(&self) -> Vec<&str> {
        self.heads.iter().map(|h| h.name.as_str()).collect()
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    fn predict_row(&self, row: &[f64]) -> Vec<f64> {
        let mut inputs: Vec<f64> = match &self.scaler {
            Some(scaler) => row
                .iter()
                .zip(scaler.mean.iter().zip(scaler.scale.iter()))
                .map(|(x, (mean, scale))| (x - mean) / scale)
                .collect(),
            None => row.to_vec(),
        };
        inputs.reserve(self.heads.len());

        let mut probabilities = Vec::with_capacity(self.heads.len());
        for head in &self.heads {
            let z = head.bias
                + head
                    .weights
                    .iter()
                    .zip(inputs.iter())
                    .map(|(w, x)| w * x)
                    .sum::<f64>();
            probabilities.push(sigmoid(z));
            inputs.push(if z > 0.0 { 1.0 } else { 0.0 });
        }
        probabilities
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl MoodClassifier for ClassifierChainModel {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<ProbabilityMatrix, ClassifierError> {
        if features.columns != self.feature_columns {
            return Err(ClassifierError::FeatureMismatch(format!(
                "model expects {:?}, got {:?}",
                self.feature_columns, features.columns
            )));
        }

        debug!(rows = features.len(), "Running classifier chain");

        Ok(ProbabilityMatrix {
            columns: self.heads.iter().map(|h| h.name.clone()).collect(),
            rows: features.rows.iter().map(|row| self.predict_row(row)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MODEL: &str = r#"{
        "feature_columns": ["x", "y"],
        "labels": [
            { "name": "first", "weights": [1.0, 0.0], "bias": 0.0 },
            { "name": "second", "weights": [0.0, 0.0, 2.0], "bias": -1.0 }
        ]
    }"#;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::new(vec!["x".to_string(), "y".to_string()], rows).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_chain_feeds_earlier_predictions_forward() {
        let model = ClassifierChainModel::from_json(MODEL).unwrap();
        assert_eq!(model.labels(), vec!["first", "second"]);

        let out = model
            .predict_proba(&matrix(vec![vec![1.0, 5.0], vec![-1.0, 5.0]]))
            .unwrap();
        assert_eq!(out.columns, vec!["first", "second"]);

        // Row 0: first z = 1, fires; second z = -1 + 2
        let s1 = sigmoid(1.0);
        assert!(approx(out.rows[0][0], s1));
        assert!(approx(out.rows[0][1], s1));

        // Row 1: first z = -1, does not fire; second z = -1
        let s_neg = sigmoid(-1.0);
        assert!(approx(out.rows[1][0], s_neg));
        assert!(approx(out.rows[1][1], s_neg));
    }

    #[test]
    fn test_scaler_is_applied() {
        let json = r#"{
            "feature_columns": ["x", "y"],
            "scaler": { "mean": [1.0, 0.0], "scale": [2.0, 1.0] },
            "labels": [ { "name": "only", "weights": [1.0, 0.0], "bias": 0.0 } ]
        }"#;
        let model = ClassifierChainModel::from_json(json).unwrap();

        // (3 - 1) / 2 = 1
        let out = model.predict_proba(&matrix(vec![vec![3.0, 9.0]])).unwrap();
        assert!(approx(out.rows[0][0], sigmoid(1.0)));
    }

    #[test]
    fn test_probabilities_in_unit_range() {
        let model = ClassifierChainModel::from_json(MODEL).unwrap();
        let out = model
            .predict_proba(&matrix(vec![vec![1e6, 0.0], vec![-1e6, 0.0]]))
            .unwrap();
        for row in out.rows {
            for p in row {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_rejects_wrong_feature_columns() {
        let model = ClassifierChainModel::from_json(MODEL).unwrap();
        let swapped = FeatureMatrix::new(
            vec!["y".to_string(), "x".to_string()],
            vec![vec![0.0, 0.0]],
        )
        .unwrap();
        assert!(matches!(
            model.predict_proba(&swapped),
            Err(ClassifierError::FeatureMismatch(_))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_dimensions() {
        let json = r#"{
            "feature_columns": ["x", "y"],
            "labels": [
                { "name": "first", "weights": [1.0, 0.0], "bias": 0.0 },
                { "name": "second", "weights": [1.0, 0.0], "bias": 0.0 }
            ]
        }"#;
        assert!(matches!(
            ClassifierChainModel::from_json(json),
            Err(ClassifierError::InvalidModel(_))
        ));

        let json = r#"{
            "feature_columns": ["x", "y"],
            "scaler": { "mean": [0.0, 0.0], "scale": [1.0, 0.0] },
            "labels": [ { "name": "only", "weights": [1.0, 0.0], "bias": 0.0 } ]
        }"#;
        assert!(matches!(
            ClassifierChainModel::from_json(json),
            Err(ClassifierError::InvalidModel(_))
        ));

        assert!(matches!(
            ClassifierChainModel::from_json("not json"),
            Err(ClassifierError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();

        let model = ClassifierChainModel::load(file.path()).unwrap();
        assert_eq!(model.feature_columns(), &["x".to_string(), "y".to_string()]);

        let missing = ClassifierChainModel::load(Path::new("/nonexistent/model.json"));
        assert!(matches!(missing, Err(ClassifierError::Io { .. })));
    }
}
