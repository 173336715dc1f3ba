//! # moodrec Common Library
//!
//! Shared code for the moodrec workspace:
//! - Mood categories and the user's mood vector
//! - Track records, audio features and raw recommendation candidates
//! - Configuration loading (TOML + environment)
//! - Common error type

pub mod config;
pub mod error;
pub mod mood;
pub mod track;

pub use error::{Error, Result};
pub use mood::{MoodCategory, MoodVector, ProbabilityRow};
pub use track::{AnnotatedTrack, AudioFeatures, CandidateTrack, TrackRecord, UNKNOWN};
