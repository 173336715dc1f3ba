//! Feature Extractor
//!
//! Turns raw recommendation candidates into flat `TrackRecord` rows, one per
//! track, by looking up the primary artist's popularity and the track's
//! audio features through an injected `TrackSource`.
//!
//! # Row construction
//! - Album art comes from image slot [`ALBUM_ART_SLOT`] (the second size, as
//!   sources list images largest first); a missing slot stores [`UNKNOWN`]
//! - A missing or null preview stores [`UNKNOWN`], never an empty field
//! - Rows are deduplicated by id after the whole batch is built, keeping the
//!   first occurrence in input order
//!
//! # Error Handling
//! A failed lookup fails that track's row. What happens next depends on the
//! [`FailurePolicy`]: `FailFast` aborts the batch with the failing track id,
//! `Skip` drops the track and lists it in [`ExtractionReport::skipped`].
//! Default audio features are never substituted.

use crate::error::{PipelineError, PipelineResult};
use crate::types::{FetchError, TrackSource};
use futures::stream::{self, StreamExt};
use moodrec_common::config::FailurePolicy;
use moodrec_common::{CandidateTrack, TrackRecord, UNKNOWN};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Album image slot used for the art reference
pub const ALBUM_ART_SLOT: usize = 1;

/// A track dropped under the skip policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTrack {
    pub track_id: String,
    pub reason: String,
}

/// Output of one extraction batch
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Deduplicated rows in input order
    pub tracks: Vec<TrackRecord>,
    /// Tracks whose lookups failed (skip policy only)
    pub skipped: Vec<SkippedTrack>,
    /// Rows removed because their id had already been seen
    pub duplicates_removed: usize,
}

/// Builds track rows from candidates
pub struct FeatureExtractor {
    source: Arc<dyn TrackSource>,
    policy: FailurePolicy,
    concurrency: usize,
}

impl FeatureExtractor {
    /// Extractor with fail-fast policy and sequential lookups
    pub fn new(source: Arc<dyn TrackSource>) -> Self {
        Self {
            source,
            policy: FailurePolicy::FailFast,
            concurrency: 1,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Allow up to `concurrency` tracks to be looked up at once
    ///
    /// Output order does not depend on this value.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build, then deduplicate, one row per candidate
    ///
    /// # Errors
    /// `PipelineError::UpstreamFetch` naming the first failed track when the
    /// policy is `FailFast`
    pub async fn extract(&self, candidates: &[CandidateTrack]) -> PipelineResult<ExtractionReport> {
        info!(
            candidates = candidates.len(),
            concurrency = self.concurrency,
            policy = ?self.policy,
            "Extracting track features"
        );

        let mut rows = stream::iter(candidates.iter())
            .map(|candidate| async move {
                self.build_row(candidate)
                    .await
                    .map_err(|e| (candidate.id.clone(), e))
            })
            .buffered(self.concurrency);

        let mut tracks = Vec::with_capacity(candidates.len());
        let mut skipped = Vec::new();

        while let Some(result) = rows.next().await {
            match result {
                Ok(record) => tracks.push(record),
                Err((track_id, source)) => match self.policy {
                    FailurePolicy::FailFast => {
                        return Err(PipelineError::UpstreamFetch { track_id, source });
                    }
                    FailurePolicy::Skip => {
                        warn!(track_id = %track_id, error = %source, "Skipping track");
                        skipped.push(SkippedTrack {
                            track_id,
                            reason: source.to_string(),
                        });
                    }
                },
            }
        }

        let (tracks, duplicates_removed) = dedup_by_id(tracks);

        info!(
            rows = tracks.len(),
            skipped = skipped.len(),
            duplicates_removed,
            "Feature extraction complete"
        );

        Ok(ExtractionReport {
            tracks,
            skipped,
            duplicates_removed,
        })
    }

    /// Look up everything one row needs
    async fn build_row(&self, candidate: &CandidateTrack) -> Result<TrackRecord, FetchError> {
        let artist = candidate
            .primary_artist()
            .ok_or_else(|| FetchError::Malformed {
                id: candidate.id.clone(),
                message: "track has no artists".to_string(),
            })?;

        debug!(track_id = %candidate.id, artist_id = %artist.id, "Looking up track");

        let artist_pop = self.source.artist_popularity(&artist.id).await?;
        let features = self.source.audio_features(&candidate.id).await?;

        Ok(TrackRecord {
            id: candidate.id.clone(),
            track_name: candidate.name.clone(),
            artist_name: artist.name.clone(),
            artist_pop,
            album: candidate.album.name.clone(),
            album_img: album_art(candidate),
            track_pop: candidate.popularity,
            preview_url: preview_reference(candidate),
            features,
        })
    }
}

/// Art reference from the fixed image slot
fn album_art(candidate: &CandidateTrack) -> String {
    candidate
        .album
        .images
        .get(ALBUM_ART_SLOT)
        .map(|image| image.url.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Preview reference or the sentinel
fn preview_reference(candidate: &CandidateTrack) -> String {
    candidate
        .preview_url
        .as_ref()
        .filter(|url| !url.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Keep the first row for each id, preserving order
///
/// Returns the kept rows and the number removed.
pub fn dedup_by_id(rows: Vec<TrackRecord>) -> (Vec<TrackRecord>, usize) {
    let before = rows.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<TrackRecord> = rows
        .into_iter()
        .filter(|row| seen.insert(row.id.clone()))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}
