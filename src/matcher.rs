//! Match engine: escalating catalog search with early stop.
//!
//! For each source item the engine builds an ordered list of queries, from
//! field-qualified (track + artist) down to the raw title, and walks them
//! through `EscalatingSearch`. The first query whose best candidate reaches
//! the acceptance threshold wins; later queries are never issued.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::models::{CandidateTrack, MatchResult, SkipReason, SourceItem};
use crate::normalize::clean_channel_title;
use crate::parser::TitleParser;
use crate::scoring::score_candidate;

// ============================================================================
// Search Collaborator
// ============================================================================

/// Destination catalog search. Must return an empty list, not an error,
/// when nothing matches; errors are transport/auth failures.
pub trait TrackSearch {
    fn search(&mut self, query: &str) -> Result<Vec<CandidateTrack>>;
}

impl<F> TrackSearch for F
where
    F: FnMut(&str) -> Result<Vec<CandidateTrack>>,
{
    fn search(&mut self, query: &str) -> Result<Vec<CandidateTrack>> {
        self(query)
    }
}

// ============================================================================
// Query Building
// ============================================================================

/// Artist used for matching: parsed from the title, else the cleaned channel name.
pub fn effective_artist(parsed_artist: Option<&str>, channel_title: &str) -> Option<String> {
    if let Some(artist) = parsed_artist.filter(|a| !a.is_empty()) {
        return Some(artist.to_string());
    }
    let channel = clean_channel_title(channel_title);
    (!channel.is_empty()).then_some(channel)
}

/// Queries in escalation order, specific to generic, without duplicates:
/// `track:<t> artist:<a>`, `<t> <a>`, `<t>`, then the raw title.
pub fn build_queries(track: &str, artist: Option<&str>, raw_title: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(artist) = artist {
        candidates.push(format!("track:{} artist:{}", track, artist));
        candidates.push(format!("{} {}", track, artist));
    }
    candidates.push(track.to_string());
    candidates.push(raw_title.to_string());

    let mut queries: Vec<String> = Vec::with_capacity(candidates.len());
    for query in candidates {
        if !query.is_empty() && !queries.contains(&query) {
            queries.push(query);
        }
    }
    queries
}

// ============================================================================
// Search State Machine
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum SearchState {
    NotStarted,
    /// Waiting for the results of `queries[index]`.
    Searching(usize),
    Accepted {
        candidate: CandidateTrack,
        score: f64,
        query_index: usize,
    },
    Exhausted,
}

/// Walks the query list one result set at a time, independent of any I/O.
#[derive(Debug)]
pub struct EscalatingSearch<'a> {
    config: &'a MatchConfig,
    track: String,
    artist: Option<String>,
    queries: Vec<String>,
    state: SearchState,
}

impl<'a> EscalatingSearch<'a> {
    pub fn new(config: &'a MatchConfig, track: &str, artist: Option<&str>, queries: Vec<String>) -> Self {
        Self {
            config,
            track: track.to_string(),
            artist: artist.map(str::to_string),
            queries,
            state: SearchState::NotStarted,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Move from `NotStarted` to the first query (or straight to `Exhausted`).
    pub fn start(&mut self) {
        if self.state == SearchState::NotStarted {
            self.state = if self.queries.is_empty() {
                SearchState::Exhausted
            } else {
                SearchState::Searching(0)
            };
        }
    }

    /// Query whose results are expected next, if still searching.
    pub fn current_query(&self) -> Option<&str> {
        match self.state {
            SearchState::Searching(i) => self.queries.get(i).map(String::as_str),
            _ => None,
        }
    }

    /// Best candidate of one result set. Ties keep the earlier candidate.
    pub fn best_candidate<'c>(&self, candidates: &'c [CandidateTrack]) -> Option<(&'c CandidateTrack, f64)> {
        let mut best: Option<(&CandidateTrack, f64)> = None;
        for candidate in candidates {
            let breakdown = score_candidate(self.config, &self.track, self.artist.as_deref(), candidate);
            debug!(
                name = %candidate.name,
                artist = candidate.primary_artist().unwrap_or(""),
                score = breakdown.score,
                title_sim = breakdown.title_similarity,
                artist_sim = breakdown.artist_similarity.unwrap_or(0.0),
                "Scored candidate"
            );
            if best.map_or(true, |(_, s)| breakdown.score > s) {
                best = Some((candidate, breakdown.score));
            }
        }
        best
    }

    /// Feed the results of the current query and advance the state.
    /// Ignored unless the machine is `Searching`.
    pub fn record_results(&mut self, candidates: &[CandidateTrack]) {
        let SearchState::Searching(index) = self.state else {
            return;
        };

        let accepted = self
            .best_candidate(candidates)
            .filter(|&(_, score)| score >= self.config.acceptance_threshold)
            .map(|(candidate, score)| (candidate.clone(), score));

        self.state = match accepted {
            Some((candidate, score)) => SearchState::Accepted {
                candidate,
                score,
                query_index: index,
            },
            None if index + 1 < self.queries.len() => SearchState::Searching(index + 1),
            None => SearchState::Exhausted,
        };
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SearchState::Accepted { .. } | SearchState::Exhausted)
    }

    pub fn into_result(self) -> MatchResult {
        match self.state {
            SearchState::Accepted { candidate, score, .. } => MatchResult::Matched { candidate, score },
            _ => MatchResult::Skipped {
                reason: SkipReason::NoCandidateAboveThreshold,
            },
        }
    }
}

// ============================================================================
// Match Engine
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct MatchEngine {
    config: MatchConfig,
    parser: TitleParser,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        let parser = TitleParser::new(&config);
        Self { config, parser }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn parser(&self) -> &TitleParser {
        &self.parser
    }

    /// Match one source item. "No match" is a `Skipped` result; search
    /// errors are returned unchanged.
    pub fn match_item<S>(&self, item: &SourceItem, search: &mut S) -> Result<MatchResult>
    where
        S: TrackSearch + ?Sized,
    {
        let parsed = self.parser.parse(&item.title);
        debug!(title = %item.title, artist = ?parsed.artist, track = %parsed.track, "Parsed title");

        if parsed.track.is_empty() {
            return Ok(MatchResult::Skipped {
                reason: SkipReason::EmptyTrackName,
            });
        }

        let artist = effective_artist(parsed.artist.as_deref(), &item.channel_title);
        let queries = build_queries(&parsed.track, artist.as_deref(), &item.title);

        let mut machine = EscalatingSearch::new(&self.config, &parsed.track, artist.as_deref(), queries);
        machine.start();

        while let Some(query) = machine.current_query().map(str::to_string) {
            let candidates = search.search(&query)?;
            debug!(query = %query, results = candidates.len(), "Search");
            machine.record_results(&candidates);
        }

        if let SearchState::Accepted {
            candidate,
            score,
            query_index,
        } = machine.state()
        {
            info!(
                title = %item.title,
                matched = %candidate.name,
                artist = candidate.primary_artist().unwrap_or(""),
                score = *score,
                query = query_index + 1,
                "Matched"
            );
        }

        Ok(machine.into_result())
    }
}
