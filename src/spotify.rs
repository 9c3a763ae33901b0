//! Spotify Web API client (blocking).
//!
//! Implements the destination side of a transfer: track search, current user
//! lookup, playlist creation and track append. Token refresh and rate limits
//! are not handled here; a non-2xx response is returned as an error.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::SEARCH_LIMIT;
use crate::matcher::TrackSearch;
use crate::models::{CandidateTrack, CreatedPlaylist};
use crate::transfer::PlaylistDestination;

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Response Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserProfile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistPayload {
    id: String,
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Option<CandidateTrack>>,
}

// ============================================================================
// Client
// ============================================================================

pub struct SpotifyClient {
    http: Client,
    base_url: String,
    token: String,
    search_limit: usize,
}

impl SpotifyClient {
    pub fn new(token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            bail!("Spotify access token is empty");
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: SPOTIFY_API_BASE.to_string(),
            token: token.trim().to_string(),
            search_limit: SEARCH_LIMIT,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("Spotify request failed: {}", what))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("Spotify API error ({}): {}", status.as_u16(), body);
        }

        response
            .json()
            .with_context(|| format!("Failed to decode Spotify response: {}", what))
    }

    pub fn search_tracks(&self, query: &str) -> Result<Vec<CandidateTrack>> {
        let limit = self.search_limit.to_string();
        let request = self
            .http
            .get(self.url("search"))
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);
        let payload: SearchPayload = self.send(request, "search")?;
        let tracks: Vec<CandidateTrack> = payload
            .tracks
            .map(|page| page.items.into_iter().flatten().collect())
            .unwrap_or_default();
        debug!(query = %query, results = tracks.len(), "Spotify search");
        Ok(tracks)
    }

    pub fn me(&self) -> Result<String> {
        let profile: UserProfile = self.send(self.http.get(self.url("me")), "me")?;
        Ok(profile.id)
    }

    pub fn create_user_playlist(&self, user_id: &str, name: &str, public: bool) -> Result<CreatedPlaylist> {
        let request = self
            .http
            .post(self.url(&format!("users/{}/playlists", user_id)))
            .json(&json!({ "name": name, "public": public }));
        let payload: PlaylistPayload = self.send(request, "create playlist")?;
        Ok(CreatedPlaylist {
            id: payload.id,
            external_url: payload.external_urls.spotify,
        })
    }

    pub fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let request = self
            .http
            .post(self.url(&format!("playlists/{}/tracks", playlist_id)))
            .json(&json!({ "uris": uris }));
        let _: serde_json::Value = self.send(request, "add tracks")?;
        Ok(())
    }
}

impl TrackSearch for SpotifyClient {
    fn search(&mut self, query: &str) -> Result<Vec<CandidateTrack>> {
        self.search_tracks(query)
    }
}

impl PlaylistDestination for SpotifyClient {
    fn current_user_id(&mut self) -> Result<String> {
        self.me()
    }

    fn create_playlist(&mut self, owner_id: &str, name: &str, public: bool) -> Result<CreatedPlaylist> {
        self.create_user_playlist(owner_id, name, public)
    }

    fn append_tracks(&mut self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.add_tracks(playlist_id, uris)
    }
}
