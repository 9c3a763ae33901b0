//! YouTube Data API playlist lister (blocking).
//!
//! Follows `nextPageToken` until the playlist is exhausted and maps each
//! entry to a `SourceItem`. Entries without a video id (deleted or private
//! videos) are dropped.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::SourceItem;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum page size accepted by playlistItems.list
const PAGE_SIZE: &str = "50";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bare playlist ids: "PLxxxx", "OLAK5uy_..."
static PLAYLIST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Source of playlist entries, in playlist order.
pub trait PlaylistSource {
    fn list_items(&mut self, playlist_id: &str) -> Result<Vec<SourceItem>>;
}

/// Playlist id from a YouTube URL's `list` parameter, or a bare id.
/// e.g., "https://www.youtube.com/playlist?list=PL123" → Some("PL123")
pub fn extract_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "list")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty()),
        Err(_) if PLAYLIST_ID.is_match(input) => Some(input.to_string()),
        Err(_) => None,
    }
}

// ============================================================================
// Response Payloads
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsPage {
    items: Option<Vec<PlaylistEntry>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    video_owner_channel_title: Option<String>,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

impl PlaylistEntry {
    fn into_source_item(self) -> Option<SourceItem> {
        let snippet = self.snippet?;
        let video_id = snippet.resource_id?.video_id.filter(|id| !id.is_empty())?;
        Some(SourceItem {
            id: video_id,
            title: snippet.title,
            channel_title: snippet.video_owner_channel_title.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct YouTubeClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("YouTube API key is empty");
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: YOUTUBE_API_BASE.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn fetch_page(&self, playlist_id: &str, page_token: Option<&str>) -> Result<PlaylistItemsPage> {
        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", PAGE_SIZE),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .http
            .get(format!("{}/playlistItems", self.base_url))
            .query(&params)
            .send()
            .context("YouTube request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("YouTube API error ({}): {}", status.as_u16(), body);
        }

        response.json().context("Failed to decode YouTube response")
    }

    pub fn playlist_items(&self, playlist_id: &str) -> Result<Vec<SourceItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self.fetch_page(playlist_id, page_token.as_deref())?;
            pages += 1;

            let Some(entries) = page.items else {
                break;
            };
            items.extend(entries.into_iter().filter_map(PlaylistEntry::into_source_item));
            debug!(page = pages, total = items.len(), "Fetched playlist page");

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(playlist_id = %playlist_id, items = items.len(), pages, "Fetched source playlist");
        Ok(items)
    }
}

impl PlaylistSource for YouTubeClient {
    fn list_items(&mut self, playlist_id: &str) -> Result<Vec<SourceItem>> {
        self.playlist_items(playlist_id)
    }
}
