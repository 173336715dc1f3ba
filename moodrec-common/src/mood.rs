//! Mood categories, the user's mood vector and per-track mood probabilities
//!
//! The category order `angry, calm, feelgood, sad` is the order used
//! everywhere a mood is laid out positionally. Code that receives mood data
//! from outside (classifier output) maps it by category name first.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of mood categories
pub const MOOD_COUNT: usize = 4;

/// Fixed mood label set for classification and similarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Angry,
    Calm,
    Feelgood,
    Sad,
}

impl MoodCategory {
    /// All categories in canonical order
    pub const ALL: [MoodCategory; MOOD_COUNT] = [
        MoodCategory::Angry,
        MoodCategory::Calm,
        MoodCategory::Feelgood,
        MoodCategory::Sad,
    ];

    /// Label used by classifiers and configuration
    pub fn label(&self) -> &'static str {
        match self {
            MoodCategory::Angry => "angry",
            MoodCategory::Calm => "calm",
            MoodCategory::Feelgood => "feelgood",
            MoodCategory::Sad => "sad",
        }
    }

    /// Column name of this category's probability in a ranked result
    pub fn probability_column(&self) -> &'static str {
        match self {
            MoodCategory::Angry => "angry_prob",
            MoodCategory::Calm => "calm_prob",
            MoodCategory::Feelgood => "feelgood_prob",
            MoodCategory::Sad => "sad_prob",
        }
    }

    /// Position of this category in canonical order
    pub fn index(&self) -> usize {
        match self {
            MoodCategory::Angry => 0,
            MoodCategory::Calm => 1,
            MoodCategory::Feelgood => 2,
            MoodCategory::Sad => 3,
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MoodCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MoodCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown mood category: {}", s)))
    }
}

/// Check that a value is a finite scalar in [0, 1]
fn check_unit(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be within [0, 1], got {}",
            what, value
        )))
    }
}

/// The user's self-reported mood, one scalar per category
///
/// Supplied per request and discarded afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodVector {
    values: [f64; MOOD_COUNT],
}

impl MoodVector {
    /// Create a mood vector from per-category values (each within [0, 1])
    pub fn new(angry: f64, calm: f64, feelgood: f64, sad: f64) -> Result<Self> {
        Self::from_array([angry, calm, feelgood, sad])
    }

    /// Create a mood vector from values in canonical category order
    pub fn from_array(values: [f64; MOOD_COUNT]) -> Result<Self> {
        for (category, value) in MoodCategory::ALL.iter().zip(values.iter()) {
            check_unit(*value, &format!("Mood '{}'", category))?;
        }
        Ok(Self { values })
    }

    /// Value for one category
    pub fn get(&self, category: MoodCategory) -> f64 {
        self.values[category.index()]
    }

    /// Values in canonical category order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// True when every component is zero (no direction to compare against)
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

/// Classifier output for one track: independent per-category probabilities
///
/// Multi-label, so the values need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRow {
    values: [f64; MOOD_COUNT],
}

impl ProbabilityRow {
    /// Create from values in canonical category order (each within [0, 1])
    pub fn from_array(values: [f64; MOOD_COUNT]) -> Result<Self> {
        for (category, value) in MoodCategory::ALL.iter().zip(values.iter()) {
            check_unit(*value, &format!("Probability '{}'", category))?;
        }
        Ok(Self { values })
    }

    /// Probability for one category
    pub fn get(&self, category: MoodCategory) -> f64 {
        self.values[category.index()]
    }

    /// Values in canonical category order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
