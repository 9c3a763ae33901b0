//! Progress bar and logging utilities.
//!
//! Renders transfer `ProgressEvent`s as a progress bar, with support for
//! log-only mode where bars are hidden for tail-friendly output.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::models::{ItemStatus, ProgressEvent};

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

/// Items between progress lines in log-only mode
const LOG_INTERVAL: u64 = 25;

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// Create a progress bar with consistent styling.
/// In log-only mode, the progress bar is hidden.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})")
                .unwrap()
                .progress_chars("=> "),
        );
    }
    pb.set_message(msg.to_string());
    pb
}

/// Whether a log line is due for `current` of `total`.
pub fn should_log(current: u64, total: u64, interval: u64) -> bool {
    interval > 0 && (current % interval == 0 || current == total)
}

/// Log progress periodically for tail-friendly output.
/// Only logs when in log-only mode and at specified intervals.
pub fn log_progress(phase: &str, current: u64, total: u64, interval: u64) {
    if is_log_only() && should_log(current, total, interval) {
        let pct = 100.0 * current as f64 / total as f64;
        eprintln!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
    }
}

/// Create a spinner for indeterminate progress.
/// In log-only mode, the spinner is hidden.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{msg} {spinner} [{elapsed_precise}]")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb.set_message(msg.to_string());
    pb
}

/// One line describing a per-item progress event.
pub fn describe_event(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Progress {
            title,
            status: ItemStatus::Matched,
            matched_name,
            matched_artist,
            ..
        } => Some(format!(
            "✓ {} → {} by {}",
            title,
            matched_name.as_deref().unwrap_or("?"),
            matched_artist.as_deref().unwrap_or("?")
        )),
        ProgressEvent::Progress {
            title,
            status: ItemStatus::Skipped,
            skip_reason,
            ..
        } => Some(format!("✗ {} ({})", title, skip_reason.as_deref().unwrap_or("skipped"))),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineTarget {
    AboveBar,
    Stderr,
}

/// `println` on a hidden bar is dropped, so those lines go to stderr.
fn line_target(bar: &ProgressBar) -> LineTarget {
    if is_log_only() || bar.is_hidden() {
        LineTarget::Stderr
    } else {
        LineTarget::AboveBar
    }
}

/// Event sink that drives a progress bar from transfer events.
pub struct TransferProgress {
    bar: Option<ProgressBar>,
    started: Instant,
    verbose: bool,
}

impl TransferProgress {
    pub fn new(verbose: bool) -> Self {
        Self {
            bar: None,
            started: Instant::now(),
            verbose,
        }
    }

    pub fn handle(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Start { playlist_name, total } => {
                self.started = Instant::now();
                self.bar = Some(create_progress_bar(*total as u64, &format!("Matching '{}'", playlist_name)));
            }
            ProgressEvent::Progress { index, total, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_position(*index as u64);
                    if self.verbose {
                        if let Some(line) = describe_event(event) {
                            match line_target(bar) {
                                LineTarget::AboveBar => bar.println(line),
                                LineTarget::Stderr => eprintln!("{}", line),
                            }
                        }
                    }
                }
                log_progress("match", *index as u64, *total as u64, LOG_INTERVAL);
            }
            ProgressEvent::Complete {
                added_count,
                skipped_count,
                ..
            } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_with_message(format!(
                        "Done: {} added, {} skipped in {}",
                        added_count,
                        skipped_count,
                        format_duration(self.started.elapsed())
                    ));
                }
            }
            ProgressEvent::Error { message } => {
                if let Some(bar) = self.bar.take() {
                    bar.abandon_with_message(format!("Failed: {}", message));
                }
            }
        }
    }
}
