//! Candidate and feature fixtures

use super::fakes::{FakeTrackSource, TempoKeyedClassifier};
use moodrec_common::track::{AlbumRef, ArtistRef, ImageRef};
use moodrec_common::{AudioFeatures, CandidateTrack, MoodVector};

/// Audio features whose tempo doubles as the row key for
/// [`TempoKeyedClassifier`]
pub fn features(tempo: f64) -> AudioFeatures {
    AudioFeatures {
        valence: 0.5,
        energy: 0.6,
        danceability: 0.7,
        loudness: -6.0,
        speechiness: 0.04,
        acousticness: 0.25,
        instrumentalness: 0.0,
        liveness: 0.12,
        mode: 1,
        key: 4,
        tempo,
        duration_ms: 210_000,
        time_signature: 4,
    }
}

/// Candidate with one artist (`artist-<id>`), three album images and a
/// preview
pub fn candidate(id: &str, name: &str) -> CandidateTrack {
    CandidateTrack {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![ArtistRef {
            id: format!("artist-{}", id),
            name: format!("Artist {}", id),
            uri: Some(format!("spotify:artist:artist-{}", id)),
        }],
        album: AlbumRef {
            name: format!("Album {}", id),
            images: vec![
                ImageRef {
                    url: format!("https://img/{}/640", id),
                    height: Some(640),
                    width: Some(640),
                },
                ImageRef {
                    url: format!("https://img/{}/300", id),
                    height: Some(300),
                    width: Some(300),
                },
                ImageRef {
                    url: format!("https://img/{}/64", id),
                    height: Some(64),
                    width: Some(64),
                },
            ],
        },
        popularity: 35,
        preview_url: Some(format!("https://preview/{}", id)),
    }
}

pub fn mood(angry: f64, calm: f64, feelgood: f64, sad: f64) -> MoodVector {
    MoodVector::new(angry, calm, feelgood, sad).unwrap()
}

/// Three tracks, a source that knows them and a classifier that scores them
/// (0.9, 0.05, 0.05, 0.0), (0.1, 0.1, 0.7, 0.1) and (0.0, 0.9, 0.05, 0.05)
pub fn scenario() -> (Vec<CandidateTrack>, FakeTrackSource, TempoKeyedClassifier) {
    let candidates = vec![
        candidate("1", "Rage"),
        candidate("2", "Sunny Day"),
        candidate("3", "Still Water"),
    ];

    let source = FakeTrackSource::new()
        .with_track("1", features(101.0))
        .with_track("2", features(102.0))
        .with_track("3", features(103.0));

    let classifier = TempoKeyedClassifier::new()
        .with_row(101.0, [0.9, 0.05, 0.05, 0.0])
        .with_row(102.0, [0.1, 0.1, 0.7, 0.1])
        .with_row(103.0, [0.0, 0.9, 0.05, 0.05]);

    (candidates, source, classifier)
}
