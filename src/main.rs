use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use playlist_transfer::config::MatchConfig;
use playlist_transfer::matcher::MatchEngine;
use playlist_transfer::models::TransferOutcome;
use playlist_transfer::progress::{create_spinner, format_duration, set_log_only, TransferProgress};
use playlist_transfer::safety::validate_report_path;
use playlist_transfer::spotify::SpotifyClient;
use playlist_transfer::transfer::{run_transfer, TransferRequest};
use playlist_transfer::youtube::{extract_playlist_id, PlaylistSource, YouTubeClient};

#[derive(Parser)]
#[command(name = "playlist-transfer")]
#[command(about = "Copy a YouTube playlist into a new Spotify playlist")]
struct Args {
    /// YouTube playlist URL or id
    #[arg(long, conflicts_with = "items", required_unless_present = "items")]
    playlist: Option<String>,

    /// JSON file with {"items": [...], "playlistName": "..."} instead of fetching from YouTube
    #[arg(long)]
    items: Option<PathBuf>,

    /// Name of the Spotify playlist to create
    #[arg(long)]
    name: Option<String>,

    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    spotify_token: String,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,

    /// JSON file overriding matching thresholds, weights and noise phrases
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the transfer outcome to this JSON file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Hide progress bars and print periodic progress lines
    #[arg(long)]
    log_only: bool,

    /// Print every matched/skipped item
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_request(args: &Args) -> Result<TransferRequest> {
    let mut request = match (&args.items, &args.playlist) {
        (Some(path), _) => TransferRequest::from_json_file(path)?,
        (None, Some(playlist)) => {
            let playlist_id = extract_playlist_id(playlist)
                .with_context(|| format!("Could not find a playlist id in '{}'", playlist))?;
            let api_key = args
                .youtube_api_key
                .as_deref()
                .context("A YouTube API key is required to fetch a playlist (--youtube-api-key or YOUTUBE_API_KEY)")?;

            let spinner = create_spinner(&format!("Fetching playlist {}", playlist_id));
            let items = YouTubeClient::new(api_key)?.list_items(&playlist_id);
            spinner.finish_and_clear();
            TransferRequest::new(items?, None)
        }
        (None, None) => anyhow::bail!("Either --playlist or --items is required"),
    };

    if args.name.is_some() {
        request.playlist_name = args.name.clone();
    }
    Ok(request)
}

/// Files read by this run, which the report must not overwrite.
fn input_files(args: &Args) -> Vec<&Path> {
    args.items
        .iter()
        .chain(args.config.iter())
        .map(PathBuf::as_path)
        .collect()
}

fn write_report(path: &Path, outcome: &TransferOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("Failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    set_log_only(args.log_only);

    let start = Instant::now();

    if let Some(report) = &args.report {
        validate_report_path(report, &input_files(&args))?;
    }

    let config = match &args.config {
        Some(path) => MatchConfig::from_json_file(path)?,
        None => MatchConfig::default(),
    };

    let request = load_request(&args)?;
    println!("Loaded {} source items", request.items.len());

    let mut spotify = SpotifyClient::new(&args.spotify_token)?.with_search_limit(config.search_limit);
    let engine = MatchEngine::new(config);

    let mut progress = TransferProgress::new(args.verbose);
    let outcome = run_transfer(&engine, &mut spotify, &request, |event| progress.handle(&event))?;

    println!("\n{:=<60}", "");
    println!("Transfer complete!");
    println!("  Playlist: {}", outcome.playlist_url);
    println!("  Added: {}", outcome.added_uris.len());
    println!("  Skipped: {}", outcome.skipped.len());
    for skipped in &outcome.skipped {
        println!("    - {} ({})", skipped.title, skipped.reason.message());
    }
    let duplicates = outcome.duplicate_uris();
    if !duplicates.is_empty() {
        println!("  Tracks added more than once: {}", duplicates.len());
    }
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    if let Some(report) = &args.report {
        write_report(report, &outcome)?;
        println!("Report written to {:?}", report);
    }

    Ok(())
}
