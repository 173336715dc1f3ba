//! moodrec-engine - Mood-based song recommendation
//!
//! Ranks recommendation candidates by how well their predicted mood matches
//! the listener's self-reported mood.
//!
//! # Pipeline
//! 1. Feature extraction (`extractor`)
//! 2. Sentiment annotation (`sentiment`)
//! 3. Table split (`splitter`)
//! 4. Mood classification (`classifier`)
//! 5. Similarity ranking (`ranker`)
//!
//! `pipeline` wires the stages together; `spotify` provides the HTTP
//! implementations of the capabilities in `types`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod ranker;
pub mod sentiment;
pub mod spotify;
pub mod splitter;
pub mod types;

pub use classifier::{ClassifierChainModel, ClassifierError, MoodClassifier, ProbabilityMatrix};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput, RadarProfile};
pub use ranker::{RankedResult, RankedRow, RankingReport};
pub use splitter::{FeatureMatrix, IdentityTable};
pub use types::{FetchError, RecommendationSource, TrackSource};
