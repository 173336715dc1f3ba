//! Table Splitter
//!
//! Partitions annotated track rows into the numeric model input
//! ([`FeatureMatrix`]) and the display columns ([`IdentityTable`]). Every
//! column lands in exactly one side, and both sides keep the input row order.

use crate::error::{PipelineError, PipelineResult};
use moodrec_common::track::{ColumnValue, ALL_COLUMNS, IDENTITY_COLUMNS};
use moodrec_common::AnnotatedTrack;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Model-input column names, in table order
pub fn feature_columns() -> Vec<&'static str> {
    ALL_COLUMNS
        .iter()
        .copied()
        .filter(|c| !IDENTITY_COLUMNS.contains(c))
        .collect()
}

/// Numeric model input: one row per track, one value per named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a matrix, checking every row has one value per column
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> PipelineResult<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(PipelineError::InvalidInput(format!(
                "Feature row {} has {} values for {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Mean of each named column; `None` if a column is unknown or the matrix
    /// has no rows
    pub fn column_means(&self, names: &[&str]) -> Option<Vec<f64>> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        names
            .iter()
            .map(|name| {
                let idx = self.column_index(name)?;
                Some(self.rows.iter().map(|row| row[idx]).sum::<f64>() / n)
            })
            .collect()
    }
}

/// Display columns of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRow {
    pub id: String,
    pub artist_name: String,
    pub track_name: String,
    pub album: String,
    pub album_img: String,
    pub preview_url: String,
}

/// Display columns of every track, aligned with a [`FeatureMatrix`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentityTable {
    pub rows: Vec<IdentityRow>,
}

impl IdentityTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split annotated rows into model input and display columns
pub fn split(tracks: &[AnnotatedTrack]) -> PipelineResult<(FeatureMatrix, IdentityTable)> {
    let columns = feature_columns();

    let mut feature_rows = Vec::with_capacity(tracks.len());
    let mut identity_rows = Vec::with_capacity(tracks.len());

    for track in tracks {
        let values = columns
            .iter()
            .map(|name| match track.column(name) {
                Some(ColumnValue::Number(v)) => Ok(v),
                _ => Err(PipelineError::SchemaMismatch(format!(
                    "Column '{}' of track {} is not numeric",
                    name, track.record.id
                ))),
            })
            .collect::<PipelineResult<Vec<f64>>>()?;
        feature_rows.push(values);

        let record = &track.record;
        identity_rows.push(IdentityRow {
            id: record.id.clone(),
            artist_name: record.artist_name.clone(),
            track_name: record.track_name.clone(),
            album: record.album.clone(),
            album_img: record.album_img.clone(),
            preview_url: record.preview_url.clone(),
        });
    }

    info!(
        rows = tracks.len(),
        feature_columns = columns.len(),
        "Split track table"
    );

    let matrix = FeatureMatrix::new(
        columns.into_iter().map(String::from).collect(),
        feature_rows,
    )?;
    Ok((matrix, IdentityTable { rows: identity_rows }))
}
