//! Pipeline Orchestrator
//!
//! Runs one recommendation request end to end:
//!
//! # Architecture
//! - **Extract**: candidates → deduplicated track rows (`extractor`)
//! - **Annotate**: sentiment of the configured text column (`sentiment`)
//! - **Split**: model input vs display columns (`splitter`)
//! - **Classify**: mood probabilities per row (`classifier`)
//! - **Merge**: probabilities joined to display rows by category name
//! - **Rank**: cosine similarity to the user's mood, best first (`ranker`)
//!
//! Every run gets a fresh `run_id` and executes inside a `pipeline` tracing
//! span carrying it.
//!
//! # Error Handling
//! - Fetch failures follow the configured `FailurePolicy`
//! - Classifier output that does not match the mood categories aborts the
//!   run with `SchemaMismatch` before anything is ranked
//! - Zero vectors and short results are logged, never errors
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new(PipelineConfig::default(), source, classifier);
//! let output = pipeline.recommend(&spotify, &request, &mood).await?;
//! for row in output.ranked.page(25) {
//!     println!("{} - {}", row.identity.artist_name, row.identity.track_name);
//! }
//! ```

use crate::classifier::{probability_rows, MoodClassifier};
use crate::error::{PipelineError, PipelineResult};
use crate::extractor::{FeatureExtractor, SkippedTrack};
use crate::ranker::{self, MergedRow, RankedResult, RankingReport};
use crate::sentiment::{self, LexiconScorer, SentimentScorer, TextColumn};
use crate::splitter::{self, FeatureMatrix};
use crate::types::{
    PlaylistSink, RecommendationRequest, RecommendationSource, SeedKind, SeedSource,
    TopItemsRequest, TrackSource,
};
use chrono::{DateTime, Utc};
use moodrec_common::config::{FailurePolicy, DEFAULT_PAGE_SIZE};
use moodrec_common::{CandidateTrack, MoodVector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Columns averaged into a [`RadarProfile`]
pub const RADAR_COLUMNS: [&str; 7] = [
    "valence",
    "energy",
    "danceability",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
];

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Column scored for sentiment
    pub text_column: TextColumn,
    /// What to do when one track's lookups fail
    pub failure_policy: FailurePolicy,
    /// Concurrent track lookups (1 = sequential)
    pub fetch_concurrency: usize,
    /// Rows per displayed page and playlist size
    pub page_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_column: TextColumn::TrackName,
            failure_policy: FailurePolicy::FailFast,
            fetch_concurrency: 4,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Average audio character of the candidate set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarProfile {
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
}

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub ranked: RankedResult,
    /// Model input, kept for display (radar profile)
    pub features: FeatureMatrix,
    /// Tracks dropped under the skip policy
    pub skipped: Vec<SkippedTrack>,
    pub duplicates_removed: usize,
    pub ranking: RankingReport,
}

impl PipelineOutput {
    /// Column means of [`RADAR_COLUMNS`]; `None` when no tracks survived
    pub fn radar_profile(&self) -> Option<RadarProfile> {
        let means = self.features.column_means(&RADAR_COLUMNS)?;
        Some(RadarProfile {
            valence: means[0],
            energy: means[1],
            danceability: means[2],
            speechiness: means[3],
            acousticness: means[4],
            instrumentalness: means[5],
            liveness: means[6],
        })
    }
}

/// Recommendation pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    source: Arc<dyn TrackSource>,
    classifier: Arc<dyn MoodClassifier>,
    scorer: Arc<dyn SentimentScorer>,
}

impl Pipeline {
    /// Pipeline using the built-in lexicon sentiment scorer
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn TrackSource>,
        classifier: Arc<dyn MoodClassifier>,
    ) -> Self {
        Self {
            config,
            source,
            classifier,
            scorer: Arc::new(LexiconScorer::new()),
        }
    }

    /// Replace the sentiment backend
    pub fn with_scorer(mut self, scorer: Arc<dyn SentimentScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Rank `candidates` against `mood`
    ///
    /// # Returns
    /// Ranked recommendations plus the feature matrix they were classified
    /// from. Result rows never exceed the number of distinct candidate ids.
    pub async fn run(
        &self,
        candidates: &[CandidateTrack],
        mood: &MoodVector,
    ) -> PipelineResult<PipelineOutput> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);
        self.run_inner(run_id, candidates, mood).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        candidates: &[CandidateTrack],
        mood: &MoodVector,
    ) -> PipelineResult<PipelineOutput> {
        info!(candidates = candidates.len(), mood = ?mood.as_slice(), "Pipeline started");

        // Extract
        let extraction = FeatureExtractor::new(Arc::clone(&self.source))
            .with_policy(self.config.failure_policy)
            .with_concurrency(self.config.fetch_concurrency)
            .extract(candidates)
            .await?;

        // Annotate
        let annotated = sentiment::annotate(
            extraction.tracks,
            self.scorer.as_ref(),
            self.config.text_column,
        );

        // Split
        let (features, identity) = splitter::split(&annotated)?;

        // Classify
        let probabilities = self.classifier.predict_proba(&features)?;
        debug!(columns = ?probabilities.columns, rows = probabilities.rows.len(), "Classifier output");

        // Merge
        let probability_rows = probability_rows(&probabilities, identity.len())?;
        let merged: Vec<MergedRow> = identity
            .rows
            .into_iter()
            .zip(probability_rows)
            .map(|(identity, probabilities)| MergedRow {
                identity,
                probabilities,
            })
            .collect();

        // Rank
        let (ranked, ranking) = ranker::rank(merged, mood)?;

        info!(
            ranked = ranked.len(),
            skipped = extraction.skipped.len(),
            degenerate_rows = ranking.degenerate_rows,
            "Pipeline complete"
        );

        Ok(PipelineOutput {
            run_id,
            generated_at: Utc::now(),
            ranked,
            features,
            skipped: extraction.skipped,
            duplicates_removed: extraction.duplicates_removed,
            ranking,
        })
    }

    /// Fetch candidates for `request`, then run the pipeline on them
    pub async fn recommend(
        &self,
        recommendations: &dyn RecommendationSource,
        request: &RecommendationRequest,
        mood: &MoodVector,
    ) -> PipelineResult<PipelineOutput> {
        request.validate().map_err(PipelineError::InvalidInput)?;

        info!(
            seed_kind = ?request.seed_kind,
            seeds = request.seeds.len(),
            target_tempo = request.target_tempo,
            target_popularity = request.target_popularity,
            "Fetching recommendations"
        );
        let candidates = recommendations.recommendations(request).await?;
        if candidates.is_empty() {
            warn!("Recommendation source returned no candidates");
        }

        self.run(&candidates, mood).await
    }
}

/// The listener's favourites as recommendation seeds
///
/// # Errors
/// `PipelineError::InvalidInput` for genre seeds (there is no top-genre list)
/// or when the listener has no favourites in the requested window
pub async fn fetch_seeds(
    seeds: &dyn SeedSource,
    request: &TopItemsRequest,
) -> PipelineResult<Vec<String>> {
    if request.kind == SeedKind::Genres {
        return Err(PipelineError::InvalidInput(
            "top items exist only for tracks and artists".to_string(),
        ));
    }

    let ids = seeds.top_items(request).await?;
    if ids.is_empty() {
        return Err(PipelineError::InvalidInput(format!(
            "no top {:?} for time range {} at offset {}",
            request.kind, request.time_range, request.offset
        )));
    }

    debug!(seeds = ?ids, "Fetched seeds");
    Ok(ids)
}

/// Save the best `count` tracks of `result` as a playlist
///
/// # Returns
/// Id of the created playlist
pub async fn publish_playlist(
    sink: &dyn PlaylistSink,
    user_id: &str,
    name: &str,
    result: &RankedResult,
    count: usize,
) -> PipelineResult<String> {
    let track_ids = result.top_track_ids(count);
    if track_ids.is_empty() {
        return Err(PipelineError::InvalidInput(
            "no ranked tracks to put in a playlist".to_string(),
        ));
    }

    let playlist_id = sink.create_playlist(user_id, name, &track_ids).await?;
    info!(playlist_id = %playlist_id, tracks = track_ids.len(), "Created playlist");
    Ok(playlist_id)
}
