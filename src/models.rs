//! Core data models for playlist transfer.
//!
//! This module contains the source/destination records, the parsed title,
//! the per-item match result and the progress events emitted during a run.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Source Models
// ============================================================================

/// One entry of the source playlist, as supplied by the lister.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    #[serde(alias = "videoId")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
}

impl SourceItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel_title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel_title: channel_title.into(),
        }
    }
}

/// Best-guess (artist, track) pair recovered from a noisy source title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedTitle {
    /// `None` when the title has no " - " separator.
    pub artist: Option<String>,
    /// Empty only when the whole title cleans down to nothing.
    pub track: String,
    /// Original, untouched title.
    pub raw: String,
}

// ============================================================================
// Destination Models
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateArtist {
    pub name: String,
}

/// Track returned by a destination catalog search. Read-only input to scoring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<CandidateArtist>,
    pub uri: String,
}

impl CandidateTrack {
    /// First credited artist, used for display.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

/// Playlist created on the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub external_url: String,
}

// ============================================================================
// Match Results
// ============================================================================

/// Why a source item was not matched. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    EmptyTrackName,
    NoCandidateAboveThreshold,
}

impl SkipReason {
    /// Human-readable reason reported to the user.
    pub fn message(self) -> &'static str {
        match self {
            SkipReason::EmptyTrackName => "Could not extract track name",
            SkipReason::NoCandidateAboveThreshold => "No match found on Spotify",
        }
    }
}

/// Outcome of matching one source item. Exactly one per item.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchResult {
    Matched { candidate: CandidateTrack, score: f64 },
    Skipped { reason: SkipReason },
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// Skipped item with the original title, kept for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub title: String,
    pub reason: SkipReason,
}

/// Aggregate result of a finished transfer run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub playlist_id: String,
    pub playlist_url: String,
    pub added_uris: Vec<String>,
    pub skipped: Vec<SkippedItem>,
}

impl TransferOutcome {
    /// URIs that were matched by more than one source item, with their counts.
    /// They are appended as-is; this is only used for reporting.
    pub fn duplicate_uris(&self) -> Vec<(String, usize)> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for uri in &self.added_uris {
            *counts.entry(uri.as_str()).or_insert(0) += 1;
        }
        let mut dupes: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(uri, n)| (uri.to_string(), n))
            .collect();
        dupes.sort();
        dupes
    }
}

// ============================================================================
// Progress Events
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Matched,
    Skipped,
}

/// Discrete events emitted by the orchestrator, in source order.
/// A run emits one `Start`, one `Progress` per item, then exactly one of
/// `Complete` or `Error`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    Start { playlist_name: String, total: usize },
    #[serde(rename_all = "camelCase")]
    Progress {
        /// 1-based position in the source list.
        index: usize,
        total: usize,
        title: String,
        status: ItemStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        matched_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        matched_artist: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        skip_reason: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        playlist_url: String,
        added_count: usize,
        skipped_count: usize,
    },
    Error { message: String },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Complete { .. } | ProgressEvent::Error { .. })
    }
}
