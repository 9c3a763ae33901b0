//! In-memory collaborators shared by unit tests.

use anyhow::{bail, Result};
use rustc_hash::FxHashMap;

use crate::matcher::TrackSearch;
use crate::models::{CandidateArtist, CandidateTrack, CreatedPlaylist};
use crate::transfer::PlaylistDestination;

pub fn candidate(name: &str, artists: &[&str]) -> CandidateTrack {
    CandidateTrack {
        id: format!("id-{}", name),
        name: name.to_string(),
        artists: artists
            .iter()
            .map(|a| CandidateArtist { name: a.to_string() })
            .collect(),
        uri: format!("spotify:track:{}", name.replace(' ', "_")),
    }
}

/// Search stub answering from a query → results table and recording every query.
#[derive(Default)]
pub struct ScriptedSearch {
    responses: FxHashMap<String, Vec<CandidateTrack>>,
    fallback: Vec<CandidateTrack>,
    fail_on: Option<String>,
    pub calls: Vec<String>,
}

impl ScriptedSearch {
    pub fn respond(mut self, query: &str, results: Vec<CandidateTrack>) -> Self {
        self.responses.insert(query.to_string(), results);
        self
    }

    pub fn respond_to_all(mut self, results: Vec<CandidateTrack>) -> Self {
        self.fallback = results;
        self
    }

    pub fn fail_on(mut self, query: &str) -> Self {
        self.fail_on = Some(query.to_string());
        self
    }
}

impl TrackSearch for ScriptedSearch {
    fn search(&mut self, query: &str) -> Result<Vec<CandidateTrack>> {
        self.calls.push(query.to_string());
        if self.fail_on.as_deref() == Some(query) {
            bail!("search failed for '{}'", query);
        }
        Ok(self
            .responses
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Destination stub: scripted search plus recorded playlist calls.
#[derive(Default)]
pub struct FakeDestination {
    pub search: ScriptedSearch,
    pub created: Vec<(String, String, bool)>,
    pub batches: Vec<Vec<String>>,
    pub fail_append_at: Option<usize>,
}

impl FakeDestination {
    pub fn new(search: ScriptedSearch) -> Self {
        Self {
            search,
            ..Default::default()
        }
    }
}

impl TrackSearch for FakeDestination {
    fn search(&mut self, query: &str) -> Result<Vec<CandidateTrack>> {
        self.search.search(query)
    }
}

impl PlaylistDestination for FakeDestination {
    fn current_user_id(&mut self) -> Result<String> {
        Ok("user-1".to_string())
    }

    fn create_playlist(&mut self, owner_id: &str, name: &str, public: bool) -> Result<CreatedPlaylist> {
        self.created.push((owner_id.to_string(), name.to_string(), public));
        Ok(CreatedPlaylist {
            id: "pl-1".to_string(),
            external_url: "https://open.spotify.com/playlist/pl-1".to_string(),
        })
    }

    fn append_tracks(&mut self, _playlist_id: &str, uris: &[String]) -> Result<()> {
        if self.fail_append_at == Some(self.batches.len()) {
            bail!("append failed");
        }
        self.batches.push(uris.to_vec());
        Ok(())
    }
}
