//! Spotify Web API request and response bodies

use crate::types::FetchError;
use moodrec_common::{AudioFeatures, CandidateTrack};
use serde::{Deserialize, Serialize};

/// `GET /recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<CandidateTrack>,
}

/// `GET /audio-features?ids=...`
///
/// Entries are `null` for tracks without analysis. Each entry is kept as raw
/// JSON so one incomplete object fails only its own track.
#[derive(Debug, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<serde_json::Value>>,
}

impl AudioFeaturesResponse {
    /// Complete feature set of `track_id`
    ///
    /// # Errors
    /// `FetchError::MissingFeatures` when the entry is absent, null or lacks
    /// any of the 13 values
    pub fn features_for(self, track_id: &str) -> Result<AudioFeatures, FetchError> {
        let entry = self
            .audio_features
            .into_iter()
            .flatten()
            .find(|value| value.get("id").and_then(|id| id.as_str()) == Some(track_id))
            .ok_or_else(|| FetchError::MissingFeatures(track_id.to_string()))?;

        serde_json::from_value(entry)
            .map_err(|_| FetchError::MissingFeatures(track_id.to_string()))
    }
}

/// `GET /artists/{id}` (only the fields used)
#[derive(Debug, Deserialize)]
pub struct ArtistResponse {
    pub id: String,
    pub popularity: u32,
}

/// `GET /me/top/{type}`
#[derive(Debug, Deserialize)]
pub struct TopItemsResponse {
    #[serde(default)]
    pub items: Vec<TopItem>,
}

#[derive(Debug, Deserialize)]
pub struct TopItem {
    pub id: String,
}

/// `POST /users/{user_id}/playlists` body
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistResponse {
    pub id: String,
}

/// `POST /playlists/{id}/tracks` body
#[derive(Debug, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

impl AddTracksRequest {
    pub fn from_track_ids(track_ids: &[String]) -> Self {
        Self {
            uris: track_ids
                .iter()
                .map(|id| format!("spotify:track:{}", id))
                .collect(),
        }
    }
}

/// Error object returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}
