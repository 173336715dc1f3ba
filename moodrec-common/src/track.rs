//! Track records and audio features
//!
//! `CandidateTrack` mirrors the raw track object returned by a recommendation
//! source. `TrackRecord` is the flat row built from it by feature
//! extraction, and `AnnotatedTrack` adds the two sentiment columns.
//!
//! Every row exposes its columns by name through [`AnnotatedTrack::column`],
//! in the order given by [`ALL_COLUMNS`].

use serde::{Deserialize, Serialize};

/// Sentinel stored in text columns whose source value is absent
pub const UNKNOWN: &str = "unknown";

/// Display/reference columns (never model input)
pub const IDENTITY_COLUMNS: [&str; 6] = [
    "id",
    "artist_name",
    "track_name",
    "album",
    "album_img",
    "preview_url",
];

/// The 13 audio-feature columns, in table order
pub const AUDIO_FEATURE_COLUMNS: [&str; 13] = [
    "valence",
    "energy",
    "danceability",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "mode",
    "key",
    "tempo",
    "duration_ms",
    "time_signature",
];

/// Every column of an annotated track table, in table order
pub const ALL_COLUMNS: [&str; 23] = [
    "id",
    "track_name",
    "artist_name",
    "artist_pop",
    "album",
    "album_img",
    "track_pop",
    "preview_url",
    "valence",
    "energy",
    "danceability",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "mode",
    "key",
    "tempo",
    "duration_ms",
    "time_signature",
    "subjectivity",
    "polarity",
];

// ============================================================================
// Raw recommendation candidates
// ============================================================================

/// Raw track candidate as returned by a recommendation source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    /// Track popularity (0-100); required, it is a model input
    pub popularity: u32,
    /// Absent (or null) when the source has no preview clip
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl CandidateTrack {
    /// First credited artist
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }
}

/// Artist reference embedded in a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Album reference embedded in a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
    /// Cover art in several sizes, largest first
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// One size of album cover art
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

// ============================================================================
// Extracted rows
// ============================================================================

/// The full audio-feature set of a track
///
/// All fields are mandatory: a lookup that cannot supply every value fails
/// instead of producing a partial record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    /// Overall loudness in dB (typically -60..0)
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    /// 1 = major, 0 = minor
    pub mode: i32,
    /// Pitch class, -1 when no key was detected
    pub key: i32,
    /// Beats per minute
    pub tempo: f64,
    pub duration_ms: u64,
    pub time_signature: i32,
}

impl AudioFeatures {
    /// Values in [`AUDIO_FEATURE_COLUMNS`] order
    pub fn values(&self) -> [f64; 13] {
        [
            self.valence,
            self.energy,
            self.danceability,
            self.loudness,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.mode as f64,
            self.key as f64,
            self.tempo,
            self.duration_ms as f64,
            self.time_signature as f64,
        ]
    }
}

/// One extracted track row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub track_name: String,
    pub artist_name: String,
    pub artist_pop: u32,
    pub album: String,
    pub album_img: String,
    pub track_pop: u32,
    pub preview_url: String,
    pub features: AudioFeatures,
}

/// A track row with sentiment columns derived from one of its text columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedTrack {
    pub record: TrackRecord,
    /// 0.0 = objective, 1.0 = subjective
    pub subjectivity: f64,
    /// -1.0 = negative, 1.0 = positive
    pub polarity: f64,
}

/// Value of one table cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl TrackRecord {
    /// Text column by name (`id`, `track_name`, `artist_name`, `album`,
    /// `album_img`, `preview_url`)
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            "id" => Some(&self.id),
            "track_name" => Some(&self.track_name),
            "artist_name" => Some(&self.artist_name),
            "album" => Some(&self.album),
            "album_img" => Some(&self.album_img),
            "preview_url" => Some(&self.preview_url),
            _ => None,
        }
    }
}

impl AnnotatedTrack {
    /// Cell value by column name, `None` for unknown columns
    pub fn column(&self, name: &str) -> Option<ColumnValue<'_>> {
        if let Some(text) = self.record.text(name) {
            return Some(ColumnValue::Text(text));
        }

        let number = match name {
            "artist_pop" => self.record.artist_pop as f64,
            "track_pop" => self.record.track_pop as f64,
            "subjectivity" => self.subjectivity,
            "polarity" => self.polarity,
            other => {
                let idx = AUDIO_FEATURE_COLUMNS.iter().position(|c| *c == other)?;
                self.record.features.values()[idx]
            }
        };
        Some(ColumnValue::Number(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> AudioFeatures {
        AudioFeatures {
            valence: 0.4,
            energy: 0.8,
            danceability: 0.6,
            loudness: -5.5,
            speechiness: 0.05,
            acousticness: 0.1,
            instrumentalness: 0.0,
            liveness: 0.2,
            mode: 1,
            key: 7,
            tempo: 128.0,
            duration_ms: 215_000,
            time_signature: 4,
        }
    }

    fn sample_track() -> AnnotatedTrack {
        AnnotatedTrack {
            record: TrackRecord {
                id: "t1".to_string(),
                track_name: "Song".to_string(),
                artist_name: "Artist".to_string(),
                artist_pop: 70,
                album: "Album".to_string(),
                album_img: "https://img/300".to_string(),
                track_pop: 55,
                preview_url: UNKNOWN.to_string(),
                features: sample_features(),
            },
            subjectivity: 0.3,
            polarity: -0.2,
        }
    }

    #[test]
    fn test_every_column_resolves() {
        let track = sample_track();
        for name in ALL_COLUMNS {
            assert!(track.column(name).is_some(), "column {} should resolve", name);
        }
        assert!(track.column("nonexistent").is_none());
    }

    #[test]
    fn test_column_values() {
        let track = sample_track();
        assert_eq!(track.column("id"), Some(ColumnValue::Text("t1")));
        assert_eq!(track.column("preview_url"), Some(ColumnValue::Text(UNKNOWN)));
        assert_eq!(track.column("artist_pop"), Some(ColumnValue::Number(70.0)));
        assert_eq!(track.column("key"), Some(ColumnValue::Number(7.0)));
        assert_eq!(track.column("duration_ms"), Some(ColumnValue::Number(215_000.0)));
        assert_eq!(track.column("polarity"), Some(ColumnValue::Number(-0.2)));
    }

    #[test]
    fn test_identity_and_audio_columns_are_table_columns() {
        for name in IDENTITY_COLUMNS.iter().chain(AUDIO_FEATURE_COLUMNS.iter()) {
            assert!(ALL_COLUMNS.contains(name), "{} missing from ALL_COLUMNS", name);
        }
    }

    #[test]
    fn test_candidate_deserializes_without_preview() {
        let json = r#"{
            "id": "abc",
            "name": "Track",
            "artists": [{"id": "a1", "name": "Someone", "uri": "spotify:artist:a1"}],
            "album": {"name": "LP", "images": [{"url": "big", "height": 640, "width": 640}]},
            "popularity": 42
        }"#;
        let candidate: CandidateTrack = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.preview_url, None);
        assert_eq!(candidate.primary_artist().map(|a| a.id.as_str()), Some("a1"));
        assert_eq!(candidate.album.images.len(), 1);
    }

    #[test]
    fn test_candidate_without_popularity_is_rejected() {
        let json = r#"{
            "id": "abc",
            "name": "Track",
            "artists": [{"id": "a1", "name": "Someone"}],
            "album": {"name": "LP", "images": []}
        }"#;
        let err = serde_json::from_str::<CandidateTrack>(json).unwrap_err();
        assert!(err.to_string().contains("popularity"), "got {}", err);
    }

    #[test]
    fn test_audio_features_reject_missing_field() {
        // No "tempo"
        let json = r#"{
            "valence": 0.1, "energy": 0.2, "danceability": 0.3, "loudness": -7.0,
            "speechiness": 0.04, "acousticness": 0.5, "instrumentalness": 0.0,
            "liveness": 0.1, "mode": 0, "key": 2, "duration_ms": 1000,
            "time_signature": 4
        }"#;
        assert!(serde_json::from_str::<AudioFeatures>(json).is_err());
    }
}
