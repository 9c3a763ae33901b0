//! Transfer orchestrator.
//!
//! Creates the destination playlist, matches source items strictly in order
//! (one search in flight at a time), then appends matched URIs in fixed-size
//! batches. Progress is reported through a caller-supplied event sink.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::matcher::{MatchEngine, TrackSearch};
use crate::models::{
    CreatedPlaylist, ItemStatus, MatchResult, ProgressEvent, SkippedItem, SourceItem, TransferOutcome,
};

/// Used when no playlist name is given.
pub const DEFAULT_PLAYLIST_NAME: &str = "YouTube Playlist";

// ============================================================================
// Destination Collaborator
// ============================================================================

/// Playlist side of the destination catalog.
pub trait PlaylistDestination: TrackSearch {
    fn current_user_id(&mut self) -> Result<String>;
    fn create_playlist(&mut self, owner_id: &str, name: &str, public: bool) -> Result<CreatedPlaylist>;
    fn append_tracks(&mut self, playlist_id: &str, uris: &[String]) -> Result<()>;
}

// ============================================================================
// Request
// ============================================================================

/// Items to transfer plus the destination playlist name.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub items: Vec<SourceItem>,
    #[serde(default)]
    pub playlist_name: Option<String>,
}

impl TransferRequest {
    pub fn new(items: Vec<SourceItem>, playlist_name: Option<String>) -> Self {
        Self { items, playlist_name }
    }

    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read items file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse items file {}", path.display()))
    }

    /// Requested name as given, or the default when missing or blank.
    pub fn playlist_name(&self) -> &str {
        self.playlist_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_PLAYLIST_NAME)
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// Append `uris` in order, at most `batch_size` per request, each request
/// finishing before the next starts. Returns the number of requests made.
pub fn submit_in_batches<D>(destination: &mut D, playlist_id: &str, uris: &[String], batch_size: usize) -> Result<usize>
where
    D: PlaylistDestination + ?Sized,
{
    let mut requests = 0;
    for (i, batch) in uris.chunks(batch_size.max(1)).enumerate() {
        destination
            .append_tracks(playlist_id, batch)
            .with_context(|| format!("Failed to add batch {} ({} tracks)", i + 1, batch.len()))?;
        requests += 1;
        info!(batch = i + 1, tracks = batch.len(), "Added tracks to playlist");
    }
    Ok(requests)
}

/// Run a whole transfer. Emits `Start`, one `Progress` per item, then
/// `Complete`, or `Error` as soon as any collaborator call fails. On error
/// nothing more is appended; a playlist created before the failure is left
/// in place.
pub fn run_transfer<D, F>(
    engine: &MatchEngine,
    destination: &mut D,
    request: &TransferRequest,
    mut on_event: F,
) -> Result<TransferOutcome>
where
    D: PlaylistDestination + ?Sized,
    F: FnMut(ProgressEvent),
{
    let playlist_name = request.playlist_name();
    on_event(ProgressEvent::Start {
        playlist_name: playlist_name.to_string(),
        total: request.items.len(),
    });

    match transfer_items(engine, destination, playlist_name, &request.items, &mut on_event) {
        Ok(outcome) => {
            on_event(ProgressEvent::Complete {
                playlist_url: outcome.playlist_url.clone(),
                added_count: outcome.added_uris.len(),
                skipped_count: outcome.skipped.len(),
            });
            Ok(outcome)
        }
        Err(err) => {
            on_event(ProgressEvent::Error {
                message: format!("{:#}", err),
            });
            Err(err)
        }
    }
}

fn transfer_items<D, F>(
    engine: &MatchEngine,
    destination: &mut D,
    playlist_name: &str,
    items: &[SourceItem],
    on_event: &mut F,
) -> Result<TransferOutcome>
where
    D: PlaylistDestination + ?Sized,
    F: FnMut(ProgressEvent),
{
    let user_id = destination
        .current_user_id()
        .context("Failed to fetch destination user")?;
    let playlist = destination
        .create_playlist(&user_id, playlist_name, false)
        .context("Failed to create playlist")?;
    info!(playlist_id = %playlist.id, name = %playlist_name, "Created playlist");

    let total = items.len();
    let mut outcome = TransferOutcome {
        playlist_id: playlist.id,
        playlist_url: playlist.external_url,
        ..Default::default()
    };

    for (i, item) in items.iter().enumerate() {
        let result = engine
            .match_item(item, &mut *destination)
            .with_context(|| format!("Search failed for '{}'", item.title))?;

        let event = match result {
            MatchResult::Matched { candidate, .. } => {
                outcome.added_uris.push(candidate.uri.clone());
                ProgressEvent::Progress {
                    index: i + 1,
                    total,
                    title: item.title.clone(),
                    status: ItemStatus::Matched,
                    matched_artist: candidate.primary_artist().map(str::to_string),
                    matched_name: Some(candidate.name),
                    skip_reason: None,
                }
            }
            MatchResult::Skipped { reason } => {
                warn!(title = %item.title, reason = reason.message(), "Skipped");
                outcome.skipped.push(SkippedItem {
                    title: item.title.clone(),
                    reason,
                });
                ProgressEvent::Progress {
                    index: i + 1,
                    total,
                    title: item.title.clone(),
                    status: ItemStatus::Skipped,
                    matched_name: None,
                    matched_artist: None,
                    skip_reason: Some(reason.message().to_string()),
                }
            }
        };
        on_event(event);
    }

    for (uri, count) in outcome.duplicate_uris() {
        warn!(uri = %uri, count, "Track matched by several source items");
    }

    submit_in_batches(
        destination,
        &outcome.playlist_id,
        &outcome.added_uris,
        engine.config().batch_size,
    )?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkipReason;
    use crate::testing::{candidate, FakeDestination, ScriptedSearch};

    fn three_item_request() -> TransferRequest {
        TransferRequest::new(
            vec![
                SourceItem::new("1", "Abc - Xyz (Official Video)", "Abc"),
                SourceItem::new("2", "Second Song [Lyrics]", "Someone Else"),
                SourceItem::new("3", "(Official Video) | \"\"", "Nobody"),
            ],
            Some("Road Trip".to_string()),
        )
    }

    fn three_item_destination() -> FakeDestination {
        FakeDestination::new(
            ScriptedSearch::default()
                .respond("track:Xyz artist:Abc", vec![candidate("Xyz", &["Abc"])])
                .respond("Second Song", vec![candidate("Second Song", &["Real Artist"])]),
        )
    }

    #[test]
    fn test_end_to_end_three_items() {
        let engine = MatchEngine::default();
        let mut destination = three_item_destination();
        let mut events = Vec::new();

        let outcome = run_transfer(&engine, &mut destination, &three_item_request(), |e| events.push(e)).unwrap();

        assert_eq!(outcome.added_uris.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::EmptyTrackName);
        assert_eq!(outcome.playlist_id, "pl-1");

        // Item 2 only matches on its third (track-only) query
        assert_eq!(
            destination.search.calls,
            vec![
                "track:Xyz artist:Abc",
                "track:Second Song artist:Someone Else",
                "Second Song Someone Else",
                "Second Song",
            ]
        );

        let indices: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(matches!(events[0], ProgressEvent::Start { total: 3, .. }));
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Complete {
                playlist_url: "https://open.spotify.com/playlist/pl-1".to_string(),
                added_count: 2,
                skipped_count: 1,
            })
        );
        assert_eq!(destination.created, vec![("user-1".to_string(), "Road Trip".to_string(), false)]);
        assert_eq!(destination.batches.len(), 1);
    }

    #[test]
    fn test_progress_event_contents() {
        let engine = MatchEngine::default();
        let mut destination = three_item_destination();
        let mut events = Vec::new();
        run_transfer(&engine, &mut destination, &three_item_request(), |e| events.push(e)).unwrap();

        assert_eq!(
            events[1],
            ProgressEvent::Progress {
                index: 1,
                total: 3,
                title: "Abc - Xyz (Official Video)".to_string(),
                status: ItemStatus::Matched,
                matched_name: Some("Xyz".to_string()),
                matched_artist: Some("Abc".to_string()),
                skip_reason: None,
            }
        );
        assert!(matches!(
            &events[3],
            ProgressEvent::Progress { status: ItemStatus::Skipped, skip_reason: Some(r), .. }
                if r == "Could not extract track name"
        ));
    }

    #[test]
    fn test_batches_of_one_hundred() {
        let mut destination = FakeDestination::default();
        let uris: Vec<String> = (0..250).map(|i| format!("spotify:track:{}", i)).collect();

        let requests = submit_in_batches(&mut destination, "pl", &uris, 100).unwrap();

        assert_eq!(requests, 3);
        let sizes: Vec<usize> = destination.batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(destination.batches[0][0], "spotify:track:0");
        assert_eq!(destination.batches[2][49], "spotify:track:249");
    }

    #[test]
    fn test_no_matches_makes_no_append_requests() {
        let mut destination = FakeDestination::default();
        assert_eq!(submit_in_batches(&mut destination, "pl", &[], 100).unwrap(), 0);
        assert!(destination.batches.is_empty());
    }

    #[test]
    fn test_search_failure_aborts_run() {
        let engine = MatchEngine::default();
        let mut destination = FakeDestination::new(
            ScriptedSearch::default()
                .respond("track:Xyz artist:Abc", vec![candidate("Xyz", &["Abc"])])
                .fail_on("track:Second Song artist:Someone Else"),
        );
        let mut events = Vec::new();

        let result = run_transfer(&engine, &mut destination, &three_item_request(), |e| events.push(e));

        assert!(result.is_err());
        // Playlist was created but nothing appended
        assert_eq!(destination.created.len(), 1);
        assert!(destination.batches.is_empty());
        // Item 3 is never reached
        assert_eq!(destination.search.calls.len(), 2);
        match events.last() {
            Some(ProgressEvent::Error { message }) => {
                assert!(message.contains("Second Song"));
                assert!(message.contains("search failed"));
            }
            other => panic!("expected error event, got {:?}", other),
        }
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn test_append_failure_is_fatal() {
        let engine = MatchEngine::default();
        let mut destination = FakeDestination::new(ScriptedSearch::default().respond_to_all(vec![candidate("Song", &["Band"])]));
        destination.fail_append_at = Some(1);
        let items: Vec<SourceItem> = (0..150).map(|i| SourceItem::new(i.to_string(), "Band - Song", "")).collect();
        let mut events = Vec::new();

        let err = run_transfer(&engine, &mut destination, &TransferRequest::new(items, None), |e| events.push(e))
            .unwrap_err();

        assert!(format!("{:#}", err).contains("batch 2"));
        // First batch stays, no rollback
        assert_eq!(destination.batches.len(), 1);
        assert!(matches!(events.last(), Some(ProgressEvent::Error { .. })));
    }

    #[test]
    fn test_duplicate_matches_are_appended() {
        let engine = MatchEngine::default();
        let mut destination = FakeDestination::new(ScriptedSearch::default().respond_to_all(vec![candidate("Song", &["Band"])]));
        let items = vec![
            SourceItem::new("1", "Band - Song", ""),
            SourceItem::new("2", "Band - Song (Live)", ""),
        ];

        let outcome = run_transfer(&engine, &mut destination, &TransferRequest::new(items, None), |_| {}).unwrap();

        assert_eq!(outcome.added_uris.len(), 2);
        assert_eq!(outcome.duplicate_uris(), vec![("spotify:track:Song".to_string(), 2)]);
    }

    #[test]
    fn test_default_playlist_name() {
        assert_eq!(TransferRequest::new(Vec::new(), None).playlist_name(), "YouTube Playlist");
        assert_eq!(
            TransferRequest::new(Vec::new(), Some("  ".to_string())).playlist_name(),
            "YouTube Playlist"
        );
        let request: TransferRequest =
            serde_json::from_str(r#"{"items":[{"videoId":"v","title":"T","channelTitle":"C"}],"playlistName":"Mix"}"#)
                .unwrap();
        assert_eq!(request.playlist_name(), "Mix");
        assert_eq!(request.items[0].id, "v");
    }

    #[test]
    fn test_playlist_name_kept_verbatim() {
        let request = TransferRequest::new(Vec::new(), Some("  Mix  ".to_string()));
        assert_eq!(request.playlist_name(), "  Mix  ");
    }

    #[test]
    fn test_empty_request_completes() {
        let engine = MatchEngine::default();
        let mut destination = FakeDestination::default();
        let mut events = Vec::new();
        let outcome =
            run_transfer(&engine, &mut destination, &TransferRequest::default(), |e| events.push(e)).unwrap();
        assert!(outcome.added_uris.is_empty());
        assert_eq!(events.len(), 2);
        assert!(destination.batches.is_empty());
    }
}
