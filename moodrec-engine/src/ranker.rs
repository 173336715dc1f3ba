//! Similarity Ranker
//!
//! Scores each track's mood probabilities against the user's mood vector by
//! cosine similarity and sorts best match first.
//!
//! A zero vector has no direction, so a zero probability row (or a zero mood
//! vector) gets [`DEGENERATE_SIMILARITY`] instead of a NaN. Such rows are
//! logged and counted in [`RankingReport`]; they are not errors.

use crate::error::{PipelineError, PipelineResult};
use crate::splitter::IdentityRow;
use moodrec_common::{MoodCategory, MoodVector, ProbabilityRow};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Similarity assigned when either vector has zero norm
pub const DEGENERATE_SIMILARITY: f64 = 0.0;

/// Cosine similarity of two equal-length vectors
///
/// Returns `Ok(None)` when either vector has zero norm.
///
/// # Errors
/// `PipelineError::InvalidInput` when the lengths differ
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> PipelineResult<Option<f64>> {
    if a.len() != b.len() {
        return Err(PipelineError::InvalidInput(format!(
            "Vector length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let max_a = max_abs(a);
    let max_b = max_abs(b);
    if max_a == 0.0 || max_b == 0.0 {
        return Ok(None);
    }

    // Unit max-norm inputs keep the squares clear of underflow
    let a: Vec<f64> = a.iter().map(|x| x / max_a).collect();
    let b: Vec<f64> = b.iter().map(|x| x / max_b).collect();

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    Ok(Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0)))
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Score every item against `target` and sort descending (stable)
///
/// `vector` yields each item's scores in the same order as `target`.
/// Returns the scored items and how many fell back to
/// [`DEGENERATE_SIMILARITY`].
pub fn rank_by_similarity<T, F>(
    items: Vec<T>,
    target: &[f64],
    vector: F,
) -> PipelineResult<(Vec<(T, f64)>, usize)>
where
    F: Fn(&T) -> &[f64],
{
    let mut degenerate = 0;
    let mut scored = Vec::with_capacity(items.len());

    for item in items {
        let similarity = match cosine_similarity(vector(&item), target)? {
            Some(s) => s,
            None => {
                degenerate += 1;
                DEGENERATE_SIMILARITY
            }
        };
        scored.push((item, similarity));
    }

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok((scored, degenerate))
}

/// Identity columns joined with the classifier's probabilities
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub identity: IdentityRow,
    pub probabilities: ProbabilityRow,
}

/// One row of the final recommendation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    /// Position after sorting, starting at 0
    pub rank: usize,
    #[serde(flatten)]
    pub identity: IdentityRow,
    pub angry_prob: f64,
    pub calm_prob: f64,
    pub feelgood_prob: f64,
    pub sad_prob: f64,
    pub similarity: f64,
}

impl RankedRow {
    pub fn probability(&self, category: MoodCategory) -> f64 {
        match category {
            MoodCategory::Angry => self.angry_prob,
            MoodCategory::Calm => self.calm_prob,
            MoodCategory::Feelgood => self.feelgood_prob,
            MoodCategory::Sad => self.sad_prob,
        }
    }
}

/// Degenerate-input summary of one ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RankingReport {
    /// Rows that received [`DEGENERATE_SIMILARITY`]
    pub degenerate_rows: usize,
}

/// Recommendation table, best match first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedResult {
    pub rows: Vec<RankedRow>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `page_size` rows, or all of them when there are fewer
    pub fn page(&self, page_size: usize) -> &[RankedRow] {
        if self.rows.len() < page_size {
            warn!(
                available = self.rows.len(),
                requested = page_size,
                "Fewer ranked tracks than requested, showing all"
            );
        }
        &self.rows[..page_size.min(self.rows.len())]
    }

    /// Ids of the best `n` tracks, in rank order
    pub fn top_track_ids(&self, n: usize) -> Vec<String> {
        self.rows
            .iter()
            .take(n)
            .map(|row| row.identity.id.clone())
            .collect()
    }
}

/// Rank merged rows against the user's mood
pub fn rank(rows: Vec<MergedRow>, mood: &MoodVector) -> PipelineResult<(RankedResult, RankingReport)> {
    if mood.is_zero() {
        warn!("Mood vector is all zeros, every track gets the fallback similarity");
    }

    for row in rows
        .iter()
        .filter(|r| r.probabilities.as_slice().iter().all(|p| *p == 0.0))
    {
        warn!(track_id = %row.identity.id, "All mood probabilities are zero");
    }

    let (scored, degenerate_rows) =
        rank_by_similarity(rows, mood.as_slice(), |row| row.probabilities.as_slice())?;

    let rows: Vec<RankedRow> = scored
        .into_iter()
        .enumerate()
        .map(|(rank, (row, similarity))| {
            let p = row.probabilities;
            RankedRow {
                rank,
                identity: row.identity,
                angry_prob: p.get(MoodCategory::Angry),
                calm_prob: p.get(MoodCategory::Calm),
                feelgood_prob: p.get(MoodCategory::Feelgood),
                sad_prob: p.get(MoodCategory::Sad),
                similarity,
            }
        })
        .collect();

    info!(rows = rows.len(), degenerate_rows, "Ranked tracks");

    Ok((RankedResult { rows }, RankingReport { degenerate_rows }))
}
