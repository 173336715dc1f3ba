//! Sentiment Annotator
//!
//! Adds `subjectivity` and `polarity` to each track row, computed from one of
//! its text columns by a pluggable [`SentimentScorer`].
//!
//! The bundled [`LexiconScorer`] averages word-level scores from a small
//! English lexicon:
//! - Intensifiers ("very", "so", ...) scale the next sentiment word
//! - Negations ("not", "never", "no", "...n't") multiply the next sentiment
//!   word's polarity by -0.5
//! - Text without any lexicon word scores (0, 0)

use crate::error::{PipelineError, PipelineResult};
use moodrec_common::{AnnotatedTrack, TrackRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

/// Sentiment of one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 (negative) to 1.0 (positive)
    pub polarity: f64,
    /// 0.0 (objective) to 1.0 (subjective)
    pub subjectivity: f64,
}

/// Text sentiment backend
///
/// Implementations must be deterministic: the same text always yields the
/// same scores.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Sentiment;
}

/// Text column sentiment can be computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColumn {
    #[default]
    TrackName,
    ArtistName,
    Album,
}

impl TextColumn {
    /// Parse a column name
    ///
    /// # Errors
    /// `PipelineError::InvalidInput` for anything but `track_name`,
    /// `artist_name` or `album`
    pub fn from_name(name: &str) -> PipelineResult<Self> {
        match name {
            "track_name" => Ok(TextColumn::TrackName),
            "artist_name" => Ok(TextColumn::ArtistName),
            "album" => Ok(TextColumn::Album),
            other => Err(PipelineError::InvalidInput(format!(
                "Unknown text column '{}' (expected track_name, artist_name or album)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextColumn::TrackName => "track_name",
            TextColumn::ArtistName => "artist_name",
            TextColumn::Album => "album",
        }
    }

    fn value<'a>(&self, record: &'a TrackRecord) -> &'a str {
        match self {
            TextColumn::TrackName => &record.track_name,
            TextColumn::ArtistName => &record.artist_name,
            TextColumn::Album => &record.album,
        }
    }
}

impl fmt::Display for TextColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score every row's text column and attach the result
pub fn annotate(
    records: Vec<TrackRecord>,
    scorer: &dyn SentimentScorer,
    column: TextColumn,
) -> Vec<AnnotatedTrack> {
    info!(rows = records.len(), column = %column, "Annotating sentiment");

    records
        .into_iter()
        .map(|record| {
            let sentiment = scorer.score(column.value(&record));
            debug!(
                track_id = %record.id,
                polarity = sentiment.polarity,
                subjectivity = sentiment.subjectivity,
                "Scored"
            );
            AnnotatedTrack {
                record,
                subjectivity: sentiment.subjectivity,
                polarity: sentiment.polarity,
            }
        })
        .collect()
}

// ============================================================================
// Lexicon scorer
// ============================================================================

/// Polarity multiplier applied by a negation
const NEGATION_FACTOR: f64 = -0.5;

/// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    ("alive", 0.1, 0.4),
    ("alone", -0.1, 0.2),
    ("amazing", 0.6, 0.9),
    ("angry", -0.5, 1.0),
    ("awesome", 1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.667),
    ("beautiful", 0.85, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("bitter", -0.1, 0.5),
    ("blue", 0.0, 0.1),
    ("bright", 0.7, 0.9),
    ("broken", -0.4, 0.4),
    ("calm", 0.3, 0.75),
    ("cold", -0.6, 1.0),
    ("crazy", -0.6, 0.9),
    ("cruel", -1.0, 1.0),
    ("dark", -0.15, 0.4),
    ("dead", -0.2, 0.4),
    ("dirty", -0.6, 0.8),
    ("easy", 0.433, 0.833),
    ("empty", -0.1, 0.5),
    ("evil", -1.0, 1.0),
    ("fine", 0.417, 0.5),
    ("free", 0.4, 0.8),
    ("fun", 0.3, 0.2),
    ("funny", 0.25, 0.75),
    ("gentle", 0.35, 0.6),
    ("golden", 0.3, 0.5),
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("happy", 0.8, 1.0),
    ("hard", -0.292, 0.542),
    ("heavy", -0.2, 0.5),
    ("high", 0.16, 0.54),
    ("hot", 0.25, 0.85),
    ("lonely", -0.1, 0.4),
    ("lost", 0.0, 0.0),
    ("love", 0.5, 0.6),
    ("lovely", 0.5, 0.75),
    ("lucky", 0.333, 1.0),
    ("mad", -0.625, 1.0),
    ("magic", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("perfect", 1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("pretty", 0.25, 1.0),
    ("sad", -0.5, 1.0),
    ("sick", -0.714, 0.857),
    ("slow", -0.3, 0.4),
    ("strange", 0.0, 0.15),
    ("strong", 0.433, 0.733),
    ("sweet", 0.35, 0.65),
    ("terrible", -1.0, 1.0),
    ("true", 0.35, 0.65),
    ("ugly", -0.7, 1.0),
    ("warm", 0.6, 0.6),
    ("wild", 0.1, 0.4),
    ("wonderful", 1.0, 1.0),
    ("worst", -1.0, 1.0),
    ("wrong", -0.5, 0.9),
    ("young", 0.1, 0.4),
];

/// (word, multiplier)
const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.5),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("really", 1.3),
    ("slightly", 0.7),
    ("so", 1.3),
    ("super", 1.4),
    ("too", 1.2),
    ("totally", 1.4),
    ("very", 1.3),
];

const NEGATIONS: &[&str] = &["not", "never", "no", "nothing", "nobody"];

#[derive(Debug, Clone, Copy)]
struct Entry {
    polarity: f64,
    subjectivity: f64,
}

/// Lexicon-based [`SentimentScorer`]
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<&'static str, Entry>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    /// Scorer with the built-in English lexicon
    pub fn new() -> Self {
        let words = LEXICON
            .iter()
            .map(|(word, polarity, subjectivity)| {
                (
                    *word,
                    Entry {
                        polarity: *polarity,
                        subjectivity: *subjectivity,
                    },
                )
            })
            .collect();
        let intensifiers = INTENSIFIERS.iter().copied().collect();
        Self {
            words,
            intensifiers,
        }
    }

    fn is_negation(token: &str) -> bool {
        NEGATIONS.contains(&token) || token.ends_with("n't")
    }
}

/// Lowercased Unicode words; apostrophes stay inside words ("don't")
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .unicode_words()
        .map(|w| w.replace('\u{2019}', "'"))
        .collect()
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Sentiment {
        let mut assessed: Vec<(f64, f64)> = Vec::new();
        let mut multiplier = 1.0;
        let mut negated = false;

        for token in tokenize(text) {
            let token = token.as_str();
            if let Some(entry) = self.words.get(token) {
                let mut polarity = entry.polarity * multiplier;
                let subjectivity = entry.subjectivity * multiplier;
                if negated {
                    polarity *= NEGATION_FACTOR;
                }
                assessed.push((polarity, subjectivity));
                multiplier = 1.0;
                negated = false;
            } else if let Some(factor) = self.intensifiers.get(token) {
                multiplier *= factor;
            } else if Self::is_negation(token) {
                negated = !negated;
            }
        }

        if assessed.is_empty() {
            return Sentiment::default();
        }

        let n = assessed.len() as f64;
        let polarity = assessed.iter().map(|(p, _)| p).sum::<f64>() / n;
        let subjectivity = assessed.iter().map(|(_, s)| s).sum::<f64>() / n;

        Sentiment {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}
