//! Error types for moodrec-engine
//!
//! Fetch and schema errors abort the current request. Degenerate similarity
//! inputs and short result pages are not errors (see `ranker` and
//! `pipeline`).

use crate::classifier::ClassifierError;
use crate::types::FetchError;
use thiserror::Error;

/// Pipeline error type
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A lookup needed to build one track's row failed
    #[error("Upstream fetch failed for track {track_id}: {source}")]
    UpstreamFetch {
        track_id: String,
        #[source]
        source: FetchError,
    },

    /// A request to an external collaborator not tied to one track failed
    #[error("External source error: {0}")]
    Source(#[from] FetchError),

    /// Classifier output does not match the mood category contract
    #[error("Classifier schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The classifier itself failed
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Invalid request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// moodrec-common error
    #[error("Common error: {0}")]
    Common(#[from] moodrec_common::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
