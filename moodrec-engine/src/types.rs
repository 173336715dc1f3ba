//! Core Types and Trait Definitions for moodrec-engine
//!
//! Defines the capabilities the pipeline consumes from external
//! collaborators. Each one is an injected trait object so tests can swap in
//! fakes:
//! - **TrackSource:** per-track audio features and per-artist popularity
//! - **RecommendationSource:** candidate tracks for a set of seeds
//! - **SeedSource:** the listener's top tracks/artists, used as seeds
//! - **PlaylistSink:** persists an ordered list of track ids as a playlist
//!
//! # Example
//! ```rust,ignore
//! use moodrec_engine::types::{TrackSource, FetchError};
//!
//! struct CachedFeatures { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl TrackSource for CachedFeatures {
//!     async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, FetchError> {
//!         self.cache.get(track_id).copied()
//!             .ok_or_else(|| FetchError::MissingFeatures(track_id.to_string()))
//!     }
//!     async fn artist_popularity(&self, artist_id: &str) -> Result<u32, FetchError> {
//!         Ok(50)
//!     }
//! }
//! ```

use moodrec_common::{AudioFeatures, CandidateTrack};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Fetch errors
// ============================================================================

/// Failure of one external lookup
///
/// Every variant names the id that was being looked up (track, artist or
/// endpoint) so callers can decide whether to skip or abort.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network communication error
    #[error("Network error for {id}: {message}")]
    Network { id: String, message: String },

    /// External API returned an error response
    #[error("API error {status} for {id}: {message}")]
    Api {
        id: String,
        status: u16,
        message: String,
    },

    /// Requested resource does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream has no (complete) audio features for the track
    #[error("Audio features missing for track {0}")]
    MissingFeatures(String),

    /// Failed to parse response body
    #[error("Parse error for {id}: {message}")]
    Parse { id: String, message: String },

    /// Record lacks data every row needs
    #[error("Malformed record {id}: {message}")]
    Malformed { id: String, message: String },
}

impl FetchError {
    /// Id of the track, artist or endpoint the failed lookup was about
    pub fn subject_id(&self) -> &str {
        match self {
            FetchError::Network { id, .. }
            | FetchError::Api { id, .. }
            | FetchError::Parse { id, .. }
            | FetchError::Malformed { id, .. } => id,
            FetchError::NotFound(id) | FetchError::MissingFeatures(id) => id,
        }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Per-track and per-artist lookups used by feature extraction
#[async_trait::async_trait]
pub trait TrackSource: Send + Sync {
    /// Full audio-feature set of one track
    ///
    /// # Errors
    /// `FetchError::MissingFeatures` when upstream has no features for the track
    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, FetchError>;

    /// Popularity (0-100) of one artist
    async fn artist_popularity(&self, artist_id: &str) -> Result<u32, FetchError>;
}

/// Source of candidate tracks
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Up to `request.limit` candidates for the request's seeds
    async fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<CandidateTrack>, FetchError>;
}

/// The listener's favourites, used as recommendation seeds
#[async_trait::async_trait]
pub trait SeedSource: Send + Sync {
    /// Ids of the listener's top tracks or artists
    async fn top_items(&self, request: &TopItemsRequest) -> Result<Vec<String>, FetchError>;
}

/// Persists a playlist (fire-and-forget from the pipeline's perspective)
#[async_trait::async_trait]
pub trait PlaylistSink: Send + Sync {
    /// Create a playlist for `user_id` holding `track_ids` in order
    ///
    /// # Returns
    /// Id of the created playlist
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        track_ids: &[String],
    ) -> Result<String, FetchError>;
}

// ============================================================================
// Requests
// ============================================================================

/// Maximum number of seeds per recommendation request
pub const MAX_SEEDS: usize = 5;
/// Maximum number of candidates per recommendation request
pub const MAX_RECOMMENDATIONS: usize = 100;

/// What kind of favourites to seed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedKind {
    Tracks,
    Artists,
    Genres,
}

impl SeedKind {
    /// Query parameter name for this kind of seed
    pub fn query_param(&self) -> &'static str {
        match self {
            SeedKind::Tracks => "seed_tracks",
            SeedKind::Artists => "seed_artists",
            SeedKind::Genres => "seed_genres",
        }
    }
}

impl FromStr for SeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tracks" => Ok(SeedKind::Tracks),
            "artists" => Ok(SeedKind::Artists),
            "genres" => Ok(SeedKind::Genres),
            other => Err(format!("unknown seed kind: {}", other)),
        }
    }
}

/// Parameters of one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub seed_kind: SeedKind,
    pub seeds: Vec<String>,
    /// Target tempo in BPM (0-250)
    pub target_tempo: u32,
    /// Target popularity (0-100); low values favour deep cuts
    pub target_popularity: u32,
    /// ISO 3166-1 alpha-2 market
    pub country: String,
    pub limit: usize,
}

impl RecommendationRequest {
    /// Request with the default limit of 100 candidates
    pub fn new(
        seed_kind: SeedKind,
        seeds: Vec<String>,
        target_tempo: u32,
        target_popularity: u32,
        country: impl Into<String>,
    ) -> Self {
        Self {
            seed_kind,
            seeds,
            target_tempo,
            target_popularity,
            country: country.into(),
            limit: MAX_RECOMMENDATIONS,
        }
    }

    /// Check parameter ranges before hitting the network
    pub fn validate(&self) -> Result<(), String> {
        if self.seeds.is_empty() || self.seeds.len() > MAX_SEEDS {
            return Err(format!(
                "between 1 and {} seeds required, got {}",
                MAX_SEEDS,
                self.seeds.len()
            ));
        }
        if self.target_tempo > 250 {
            return Err(format!("target tempo {} outside 0-250", self.target_tempo));
        }
        if self.target_popularity > 100 {
            return Err(format!(
                "target popularity {} outside 0-100",
                self.target_popularity
            ));
        }
        if self.limit == 0 || self.limit > MAX_RECOMMENDATIONS {
            return Err(format!(
                "limit {} outside 1-{}",
                self.limit, MAX_RECOMMENDATIONS
            ));
        }
        if self.country.len() != 2 {
            return Err(format!("country code '{}' is not two letters", self.country));
        }
        Ok(())
    }
}

/// Time window over which favourites are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_term" => Ok(TimeRange::ShortTerm),
            "medium_term" => Ok(TimeRange::MediumTerm),
            "long_term" => Ok(TimeRange::LongTerm),
            other => Err(format!("unknown time range: {}", other)),
        }
    }
}

/// Parameters of a top-items lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItemsRequest {
    /// Tracks or artists (genres have no top list)
    pub kind: SeedKind,
    pub limit: usize,
    /// How far down the favourites list to start (0-50)
    pub offset: usize,
    pub time_range: TimeRange,
}

impl TopItemsRequest {
    /// Five favourites starting at `offset`
    pub fn new(kind: SeedKind, offset: usize, time_range: TimeRange) -> Self {
        Self {
            kind,
            limit: MAX_SEEDS,
            offset,
            time_range,
        }
    }
}
