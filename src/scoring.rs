//! Scoring functions for candidate matching.
//!
//! This module contains:
//! - Dice (bigram) similarity
//! - Per-candidate scoring with weighted title/artist similarity and bonuses

use rustc_hash::FxHashSet;

use crate::config::MatchConfig;
use crate::models::CandidateTrack;
use crate::normalize::{normalize_keep_spaces, normalize_strip_spaces};

// ============================================================================
// Dice Similarity
// ============================================================================

fn bigrams(chars: &[char]) -> FxHashSet<(char, char)> {
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Dice coefficient over character-bigram sets (0.0 to 1.0).
/// Identical strings score 1.0; otherwise a string shorter than two
/// characters has no bigrams and scores 0.0.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.len() < 2 || b_chars.len() < 2 {
        return 0.0;
    }

    let a_bigrams = bigrams(&a_chars);
    let b_bigrams = bigrams(&b_chars);
    let intersection = a_bigrams.intersection(&b_bigrams).count();

    (2 * intersection) as f64 / (a_bigrams.len() + b_bigrams.len()) as f64
}

// ============================================================================
// Candidate Scoring
// ============================================================================

/// Components of a candidate's score, kept for logging and previews.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub title_similarity: f64,
    /// `None` when no effective artist is known.
    pub artist_similarity: Option<f64>,
    pub exact_title: bool,
    pub title_contains: bool,
    pub artist_contains: bool,
    pub score: f64,
}

/// Score one candidate against the target track and optional effective artist.
///
/// Base score is `title_weight * title_sim + artist_weight * artist_sim`, or
/// `title_sim` alone without an artist. Bonuses stack on top and the result
/// is not clamped, so strong matches exceed 1.0.
pub fn score_candidate(
    config: &MatchConfig,
    target_track: &str,
    effective_artist: Option<&str>,
    candidate: &CandidateTrack,
) -> ScoreBreakdown {
    let track_norm = normalize_keep_spaces(target_track);
    let candidate_norm = normalize_keep_spaces(&candidate.name);
    let title_similarity = dice_coefficient(&track_norm, &candidate_norm);

    // An artist that normalizes to nothing counts as unknown
    let artist_norm = effective_artist
        .map(normalize_keep_spaces)
        .filter(|a| !a.is_empty());

    let artist_similarity = artist_norm.as_deref().map(|target| {
        candidate
            .artists
            .iter()
            .map(|a| dice_coefficient(target, &normalize_keep_spaces(&a.name)))
            .fold(0.0, f64::max)
    });

    let mut score = match artist_similarity {
        Some(artist_sim) => config.title_weight * title_similarity + config.artist_weight * artist_sim,
        None => title_similarity,
    };

    let track_compact = normalize_strip_spaces(target_track);
    let candidate_compact = normalize_strip_spaces(&candidate.name);

    let exact_title = candidate_compact == track_compact;
    let title_contains =
        candidate_compact.contains(&track_compact) || track_compact.contains(&candidate_compact);
    let artist_contains = match (&artist_norm, effective_artist) {
        (Some(_), Some(artist)) => {
            let artist_compact = normalize_strip_spaces(artist);
            candidate.artists.iter().any(|a| {
                let a_compact = normalize_strip_spaces(&a.name);
                a_compact.contains(&artist_compact) || artist_compact.contains(&a_compact)
            })
        }
        _ => false,
    };

    if exact_title {
        score += config.exact_title_bonus;
    }
    if title_contains {
        score += config.title_containment_bonus;
    }
    if artist_contains {
        score += config.artist_containment_bonus;
    }

    ScoreBreakdown {
        title_similarity,
        artist_similarity,
        exact_title,
        title_contains,
        artist_contains,
        score,
    }
}
