//! Preview title parsing and matching without touching Spotify.
//! Usage: match-preview <items.json> [--candidates <search_results.json>] [--config <config.json>]
//!
//! The candidates file maps search queries to recorded results:
//! {"track:Xyz artist:Abc": [{"id": "...", "name": "Xyz", "artists": [{"name": "Abc"}], "uri": "..."}]}

use anyhow::{Context, Result};
use clap::Parser;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use playlist_transfer::config::MatchConfig;
use playlist_transfer::matcher::{build_queries, effective_artist, MatchEngine};
use playlist_transfer::models::{CandidateTrack, MatchResult};
use playlist_transfer::progress::format_duration;
use playlist_transfer::transfer::TransferRequest;

#[derive(Parser)]
#[command(name = "match-preview")]
#[command(about = "Show how playlist titles parse and which recorded candidates they would match")]
struct Args {
    items: PathBuf,

    #[arg(long)]
    candidates: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "0")]
    workers: usize,
}

fn load_candidates(path: &Path) -> Result<FxHashMap<String, Vec<CandidateTrack>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse candidates file {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();
    let config = match &args.config {
        Some(path) => MatchConfig::from_json_file(path)?,
        None => MatchConfig::default(),
    };
    let engine = MatchEngine::new(config);
    let request = TransferRequest::from_json_file(&args.items)?;

    println!("Parsing {} titles...", request.items.len());
    let parsed = engine.parser().parse_all(&request.items);

    let mut from_title = 0usize;
    let mut from_channel = 0usize;
    let mut no_artist = 0usize;
    let mut empty_track = 0usize;

    for (item, p) in request.items.iter().zip(&parsed) {
        let artist = effective_artist(p.artist.as_deref(), &item.channel_title);
        if p.track.is_empty() {
            empty_track += 1;
        } else if p.artist.is_some() {
            from_title += 1;
        } else if artist.is_some() {
            from_channel += 1;
        } else {
            no_artist += 1;
        }

        println!("{}", item.title);
        println!(
            "  artist={:?} track={:?} effective_artist={:?}",
            p.artist, p.track, artist
        );
        if !p.track.is_empty() {
            for (i, query) in build_queries(&p.track, artist.as_deref(), &item.title).iter().enumerate() {
                println!("  query {}: {}", i + 1, query);
            }
        }
    }

    if let Some(path) = &args.candidates {
        let recorded = load_candidates(path)?;
        let mut searches = 0usize;
        let mut lookup = |query: &str| -> Result<Vec<CandidateTrack>> {
            searches += 1;
            Ok(recorded.get(query).cloned().unwrap_or_default())
        };

        println!("\nMatching against recorded candidates...");
        let mut matched = 0usize;
        for item in &request.items {
            match engine.match_item(item, &mut lookup)? {
                MatchResult::Matched { candidate, score } => {
                    matched += 1;
                    println!(
                        "  ✓ {} → {} by {} (score {:.2})",
                        item.title,
                        candidate.name,
                        candidate.primary_artist().unwrap_or("?"),
                        score
                    );
                }
                MatchResult::Skipped { reason } => {
                    println!("  ✗ {} ({})", item.title, reason.message());
                }
            }
        }
        println!(
            "Matched {}/{} using {} searches",
            matched,
            request.items.len(),
            searches
        );
    }

    println!("\n{:=<60}", "");
    println!("Parse summary:");
    println!("  Artist from title:   {}", from_title);
    println!("  Artist from channel: {}", from_channel);
    println!("  No artist:           {}", no_artist);
    println!("  Unparseable:         {}", empty_track);
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
