//! Matching configuration.
//!
//! Noise phrases, the acceptance threshold and the scoring weights are passed
//! explicitly into the parser and the match engine. Defaults reproduce the
//! stock behaviour; a JSON file can override any subset of fields.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Defaults
// ============================================================================

/// Phrases removed from lowercased titles, in this order.
pub const DEFAULT_NOISE_PHRASES: [&str; 9] = [
    "official video",
    "official music video",
    "lyrics",
    "lyric video",
    "audio",
    "hd",
    "4k",
    "video song",
    "full song",
];

/// Minimum score to accept a candidate
pub const ACCEPT_THRESHOLD: f64 = 0.5;

pub const TITLE_WEIGHT: f64 = 0.6;
pub const ARTIST_WEIGHT: f64 = 0.4;

pub const EXACT_TITLE_BONUS: f64 = 0.3;
pub const TITLE_CONTAINMENT_BONUS: f64 = 0.15;
pub const ARTIST_CONTAINMENT_BONUS: f64 = 0.15;

/// Results requested per search query
pub const SEARCH_LIMIT: usize = 15;

/// Maximum URIs per playlist append request
pub const APPEND_BATCH_SIZE: usize = 100;

// ============================================================================
// MatchConfig
// ============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub noise_phrases: Vec<String>,
    pub acceptance_threshold: f64,
    pub title_weight: f64,
    pub artist_weight: f64,
    pub exact_title_bonus: f64,
    pub title_containment_bonus: f64,
    pub artist_containment_bonus: f64,
    pub search_limit: usize,
    pub batch_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            noise_phrases: DEFAULT_NOISE_PHRASES.iter().map(|s| s.to_string()).collect(),
            acceptance_threshold: ACCEPT_THRESHOLD,
            title_weight: TITLE_WEIGHT,
            artist_weight: ARTIST_WEIGHT,
            exact_title_bonus: EXACT_TITLE_BONUS,
            title_containment_bonus: TITLE_CONTAINMENT_BONUS,
            artist_containment_bonus: ARTIST_CONTAINMENT_BONUS,
            search_limit: SEARCH_LIMIT,
            batch_size: APPEND_BATCH_SIZE,
        }
    }
}

impl MatchConfig {
    /// Parse a JSON override document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MatchConfig =
            serde_json::from_str(json).context("Failed to parse match config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read match config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("acceptance_threshold", self.acceptance_threshold),
            ("title_weight", self.title_weight),
            ("artist_weight", self.artist_weight),
            ("exact_title_bonus", self.exact_title_bonus),
            ("title_containment_bonus", self.title_containment_bonus),
            ("artist_containment_bonus", self.artist_containment_bonus),
        ];
        for (name, value) in numbers {
            if !value.is_finite() || value < 0.0 {
                bail!("Invalid match config: {} must be a non-negative number, got {}", name, value);
            }
        }
        if self.search_limit == 0 {
            bail!("Invalid match config: search_limit must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("Invalid match config: batch_size must be at least 1");
        }
        Ok(())
    }
}
