//! Classifier chain model driven through the full pipeline

mod helpers;

use helpers::{mood, scenario};
use moodrec_engine::classifier::ClassifierChainModel;
use moodrec_engine::pipeline::{Pipeline, PipelineConfig};
use moodrec_engine::splitter::feature_columns;
use moodrec_engine::PipelineError;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

/// Chain over the full feature set: `angry` fires above tempo 102, every
/// later head leans against the previous head's decision
fn write_model(labels: &[&str]) -> tempfile::NamedTempFile {
    let columns = feature_columns();
    let n = columns.len();
    let tempo = columns.iter().position(|c| *c == "tempo").unwrap();

    let heads: Vec<_> = labels
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut weights = vec![0.0; n + i];
            if i == 0 {
                weights[tempo] = 5.0;
            } else {
                weights[n + i - 1] = -1.0;
            }
            let bias = if i == 0 { -510.0 } else { 0.0 };
            json!({ "name": name, "weights": weights, "bias": bias })
        })
        .collect();

    let model = json!({ "feature_columns": columns, "labels": heads });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(model.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_chain_model_ranks_by_predicted_mood() {
    let file = write_model(&["angry", "calm", "feelgood", "sad"]);
    let model = ClassifierChainModel::load(file.path()).unwrap();
    let (candidates, source, _) = scenario();

    let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(source), Arc::new(model));
    let output = pipeline
        .run(&candidates, &mood(1.0, 0.0, 0.0, 0.0))
        .await
        .unwrap();

    // Tempo 103 is the only row whose angry head fires
    assert_eq!(output.ranked.rows[0].identity.id, "3");
    for row in &output.ranked.rows {
        for p in [row.angry_prob, row.calm_prob, row.feelgood_prob, row.sad_prob] {
            assert!((0.0..=1.0).contains(&p));
        }
    }
    for pair in output.ranked.rows.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[tokio::test]
async fn test_chain_model_with_foreign_labels_is_schema_mismatch() {
    let file = write_model(&["happy", "relaxed", "energetic", "sad"]);
    let model = ClassifierChainModel::load(file.path()).unwrap();
    let (candidates, source, _) = scenario();

    let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(source), Arc::new(model));
    let err = pipeline
        .run(&candidates, &mood(1.0, 0.0, 0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::SchemaMismatch(_)));
}
