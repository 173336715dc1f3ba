//! In-memory stand-ins for the external capabilities

use async_trait::async_trait;
use moodrec_common::{AudioFeatures, CandidateTrack};
use moodrec_engine::classifier::{ClassifierError, MoodClassifier, ProbabilityMatrix};
use moodrec_engine::splitter::FeatureMatrix;
use moodrec_engine::types::{
    FetchError, PlaylistSink, RecommendationRequest, RecommendationSource, SeedSource,
    TopItemsRequest, TrackSource,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Track source
// ============================================================================

/// Serves audio features and artist popularity from memory
///
/// Artist popularity defaults to 50 for any artist not set explicitly.
#[derive(Default)]
pub struct FakeTrackSource {
    features: HashMap<String, AudioFeatures>,
    artist_pop: HashMap<String, u32>,
    failing_artists: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeTrackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, id: &str, features: AudioFeatures) -> Self {
        self.features.insert(id.to_string(), features);
        self
    }

    pub fn with_artist_popularity(mut self, artist_id: &str, popularity: u32) -> Self {
        self.artist_pop.insert(artist_id.to_string(), popularity);
        self
    }

    pub fn failing_artist(mut self, artist_id: &str) -> Self {
        self.failing_artists.insert(artist_id.to_string());
        self
    }

    /// Total lookups served (features + artists)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackSource for FakeTrackSource {
    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.features
            .get(track_id)
            .copied()
            .ok_or_else(|| FetchError::MissingFeatures(track_id.to_string()))
    }

    async fn artist_popularity(&self, artist_id: &str) -> Result<u32, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_artists.contains(artist_id) {
            return Err(FetchError::Api {
                id: artist_id.to_string(),
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(self.artist_pop.get(artist_id).copied().unwrap_or(50))
    }
}

// ============================================================================
// Recommendation, seed and playlist fakes
// ============================================================================

/// Returns a fixed candidate list and records every request
#[derive(Default)]
pub struct FakeRecommendations {
    tracks: Vec<CandidateTrack>,
    requests: Mutex<Vec<RecommendationRequest>>,
}

impl FakeRecommendations {
    pub fn new(tracks: Vec<CandidateTrack>) -> Self {
        Self {
            tracks,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationSource for FakeRecommendations {
    async fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<CandidateTrack>, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.tracks.iter().take(request.limit).cloned().collect())
    }
}

/// Returns `limit` ids starting at `offset` from a fixed favourites list
pub struct FakeSeeds {
    favourites: Vec<String>,
}

impl FakeSeeds {
    pub fn new(favourites: &[&str]) -> Self {
        Self {
            favourites: favourites.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl SeedSource for FakeSeeds {
    async fn top_items(&self, request: &TopItemsRequest) -> Result<Vec<String>, FetchError> {
        Ok(self
            .favourites
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect())
    }
}

/// A playlist as received by [`RecordingPlaylistSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlaylist {
    pub user_id: String,
    pub name: String,
    pub track_ids: Vec<String>,
}

#[derive(Default)]
pub struct RecordingPlaylistSink {
    created: Mutex<Vec<CreatedPlaylist>>,
}

impl RecordingPlaylistSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<CreatedPlaylist> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistSink for RecordingPlaylistSink {
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        track_ids: &[String],
    ) -> Result<String, FetchError> {
        let mut created = self.created.lock().unwrap();
        created.push(CreatedPlaylist {
            user_id: user_id.to_string(),
            name: name.to_string(),
            track_ids: track_ids.to_vec(),
        });
        Ok(format!("playlist-{}", created.len()))
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Scripted classifier: looks each row up by its `tempo` value
pub struct TempoKeyedClassifier {
    rows: Vec<(f64, [f64; 4])>,
    columns: Vec<String>,
    extra_row: bool,
}

impl Default for TempoKeyedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoKeyedClassifier {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            columns: ["angry", "calm", "feelgood", "sad"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extra_row: false,
        }
    }

    pub fn with_row(mut self, tempo: f64, probabilities: [f64; 4]) -> Self {
        self.rows.push((tempo, probabilities));
        self
    }

    /// Report these column names instead of the mood categories
    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append one row more than was asked for
    pub fn with_extra_row(mut self) -> Self {
        self.extra_row = true;
        self
    }
}

impl MoodClassifier for TempoKeyedClassifier {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<ProbabilityMatrix, ClassifierError> {
        let tempo = features
            .column_index("tempo")
            .ok_or_else(|| ClassifierError::FeatureMismatch("no tempo column".to_string()))?;

        let mut rows = features
            .rows
            .iter()
            .map(|row| {
                self.rows
                    .iter()
                    .find(|(t, _)| *t == row[tempo])
                    .map(|(_, p)| p.to_vec())
                    .ok_or_else(|| {
                        ClassifierError::InvalidModel(format!("no scripted row for tempo {}", row[tempo]))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.extra_row {
            rows.push(vec![0.25; 4]);
        }

        Ok(ProbabilityMatrix {
            columns: self.columns.clone(),
            rows,
        })
    }
}
