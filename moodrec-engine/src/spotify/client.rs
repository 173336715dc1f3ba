//! Spotify Web API client
//!
//! Implements every capability the pipeline consumes (`TrackSource`,
//! `RecommendationSource`, `SeedSource`, `PlaylistSink`) over HTTP with a
//! bearer access token. All requests share one rate limiter and a 30 s
//! timeout.

use super::models::{
    AddTracksRequest, ArtistResponse, AudioFeaturesResponse, CreatePlaylistRequest,
    ErrorResponse, PlaylistResponse, RecommendationsResponse, TopItemsResponse,
};
use crate::types::{
    FetchError, PlaylistSink, RecommendationRequest, RecommendationSource, SeedKind, SeedSource,
    TopItemsRequest, TrackSource,
};
use async_trait::async_trait;
use moodrec_common::{AudioFeatures, CandidateTrack};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

pub use moodrec_common::config::SPOTIFY_API_URL;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SpotifyClient {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl SpotifyClient {
    /// Create a client for `api_base` authenticating with `access_token`
    ///
    /// # Errors
    /// `FetchError::Malformed` for a zero rate limit, `FetchError::Network`
    /// when the HTTP client cannot be built
    pub fn new(
        api_base: impl Into<String>,
        access_token: impl Into<String>,
        rate_limit_per_second: u32,
    ) -> Result<Self, FetchError> {
        let api_base = api_base.into().trim_end_matches('/').to_string();

        let per_second = NonZeroU32::new(rate_limit_per_second).ok_or_else(|| {
            FetchError::Malformed {
                id: api_base.clone(),
                message: "rate limit must be at least 1 request per second".to_string(),
            }
        })?;
        let rate_limiter = governor::RateLimiter::direct(governor::Quota::per_second(per_second));

        let client = reqwest::Client::builder()
            .user_agent(concat!("moodrec/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network {
                id: api_base.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base,
            access_token: access_token.into(),
            rate_limiter,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body
    ///
    /// `subject` is the id reported in errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        subject: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        self.rate_limiter.until_ready().await;
        debug!(subject = %subject, path = %path, "Spotify GET");

        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| network_error(subject, e))?;

        decode(subject, response).await
    }

    /// POST a JSON body to `path` and decode the JSON response
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        subject: &str,
        path: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        self.rate_limiter.until_ready().await;
        debug!(subject = %subject, path = %path, "Spotify POST");

        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(subject, e))?;

        decode(subject, response).await
    }
}

fn network_error(subject: &str, err: reqwest::Error) -> FetchError {
    FetchError::Network {
        id: subject.to_string(),
        message: err.to_string(),
    }
}

/// Map non-2xx statuses to errors, otherwise parse the body
async fn decode<T: DeserializeOwned>(
    subject: &str,
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound(subject.to_string()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(FetchError::Api {
            id: subject.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    response.json::<T>().await.map_err(|e| FetchError::Parse {
        id: subject.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl TrackSource for SpotifyClient {
    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures, FetchError> {
        let response: AudioFeaturesResponse = self
            .get_json(track_id, "audio-features", &[("ids", track_id.to_string())])
            .await?;
        response.features_for(track_id)
    }

    async fn artist_popularity(&self, artist_id: &str) -> Result<u32, FetchError> {
        let artist: ArtistResponse = self
            .get_json(artist_id, &format!("artists/{}", artist_id), &[])
            .await?;
        Ok(artist.popularity)
    }
}

#[async_trait]
impl RecommendationSource for SpotifyClient {
    async fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<CandidateTrack>, FetchError> {
        let query = [
            (request.seed_kind.query_param(), request.seeds.join(",")),
            ("target_tempo", request.target_tempo.to_string()),
            ("target_popularity", request.target_popularity.to_string()),
            ("market", request.country.clone()),
            ("limit", request.limit.to_string()),
        ];
        let response: RecommendationsResponse =
            self.get_json("recommendations", "recommendations", &query).await?;
        debug!(tracks = response.tracks.len(), "Received recommendations");
        Ok(response.tracks)
    }
}

#[async_trait]
impl SeedSource for SpotifyClient {
    async fn top_items(&self, request: &TopItemsRequest) -> Result<Vec<String>, FetchError> {
        let kind = match request.kind {
            SeedKind::Tracks => "tracks",
            SeedKind::Artists => "artists",
            SeedKind::Genres => {
                return Err(FetchError::Malformed {
                    id: "me/top".to_string(),
                    message: "genres have no top list".to_string(),
                })
            }
        };
        let query = [
            ("limit", request.limit.to_string()),
            ("offset", request.offset.to_string()),
            ("time_range", request.time_range.as_str().to_string()),
        ];
        let response: TopItemsResponse = self
            .get_json(&format!("me/top/{}", kind), &format!("me/top/{}", kind), &query)
            .await?;
        Ok(response.items.into_iter().map(|item| item.id).collect())
    }
}

#[async_trait]
impl PlaylistSink for SpotifyClient {
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        track_ids: &[String],
    ) -> Result<String, FetchError> {
        let playlist: PlaylistResponse = self
            .post_json(
                user_id,
                &format!("users/{}/playlists", user_id),
                &CreatePlaylistRequest {
                    name,
                    public: false,
                },
            )
            .await?;

        let _snapshot: serde_json::Value = self
            .post_json(
                &playlist.id,
                &format!("playlists/{}/tracks", playlist.id),
                &AddTracksRequest::from_track_ids(track_ids),
            )
            .await?;

        Ok(playlist.id)
    }
}
