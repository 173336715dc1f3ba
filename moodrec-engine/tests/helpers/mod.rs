//! Test Helper Utilities
//!
//! Shared fakes and fixtures for moodrec-engine integration tests

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;
pub mod log_capture;

#[allow(unused_imports)]
pub use fakes::{
    FakeRecommendations, FakeSeeds, FakeTrackSource, RecordingPlaylistSink, TempoKeyedClassifier,
};
#[allow(unused_imports)]
pub use fixtures::{candidate, features, mood, scenario};
#[allow(unused_imports)]
pub use log_capture::LogCapture;
