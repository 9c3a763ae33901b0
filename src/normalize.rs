//! Shared normalization functions for title parsing and candidate scoring.
//!
//! There are two comparison normalizations and they are NOT interchangeable:
//! `normalize_keep_spaces` feeds the Dice similarity, `normalize_strip_spaces`
//! feeds the exact/containment bonuses. Merging them changes match results.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Parenthesized segments: "(Official Video)", "(2019)"
pub static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Bracketed segments: "[HD]", "[Lyrics]"
pub static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Auto-generated music channels end in " - Topic"
pub static CHANNEL_TOPIC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*-\s*Topic$").unwrap());

/// Anything that is not a lowercase ASCII letter, digit or whitespace
pub static NON_ALNUM_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Anything that is not a lowercase ASCII letter or digit
pub static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]").unwrap());

/// Runs of whitespace
pub static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Lowercase, drop everything except `[a-z0-9]` and whitespace, collapse
/// whitespace, trim. Used for Dice similarity.
/// e.g., "Don't Stop  Me-Now!" → "dont stop menow"
pub fn normalize_keep_spaces(s: &str) -> String {
    let lower = s.to_lowercase();
    let kept = NON_ALNUM_SPACE.replace_all(&lower, "");
    WHITESPACE_RUN.replace_all(&kept, " ").trim().to_string()
}

/// Lowercase and drop everything except `[a-z0-9]`, spaces included.
/// Used for the exact-title and containment bonuses.
/// e.g., "Don't Stop Me Now" → "dontstopmenow"
pub fn normalize_strip_spaces(s: &str) -> String {
    let lower = s.to_lowercase();
    NON_ALNUM.replace_all(&lower, "").to_string()
}

/// Remove every "(...)" and "[...]" segment.
pub fn strip_bracketed(s: &str) -> String {
    let without_parens = PARENTHESIZED.replace_all(s, "");
    BRACKETED.replace_all(&without_parens, "").to_string()
}

/// Capitalize the first letter of each space-separated word, keeping the rest.
/// Empty words are dropped, so repeated spaces collapse.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip a trailing " - Topic" (any case) from a channel name and trim.
/// e.g., "Daft Punk - Topic" → "Daft Punk"
pub fn clean_channel_title(channel: &str) -> String {
    CHANNEL_TOPIC_SUFFIX.replace(channel, "").trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================
