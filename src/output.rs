//! CLI output formatting for every admin command.
//!
//! # Information-First Display
//!
//! Each entity leads with its positional index and human identity (post title,
//! asset name, track title), with keys and paths shown as indented context
//! lines. The output reads as an inventory of the blog while still naming the
//! file each row came from.
//!
//! # Output Format
//!
//! ## Posts
//!
//! ```text
//! Posts
//! 001 Hello World
//!     File: Hello World.md
//!     Date: 2024-05-01T10:00:00.000Z
//!     Tags: rust, hexo
//!     Categories: dev
//!
//! Skipped
//!     broken.md: Malformed front matter in broken.md: ...
//! ```
//!
//! ## Stats
//!
//! ```text
//! Posts: 12
//! Tags: 30
//! Categories: 4
//! ```
//!
//! ## Playlist
//!
//! ```text
//! 001 Interstellar - Hans Zimmer
//!     Cover: /music/Interstellar - Hans Zimmer.jpg
//!     Lyrics: /music/Interstellar - Hans Zimmer.lrc
//!
//! Wrote 1 track to source/json/music.json
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects. `--json` mode bypasses them and prints
//! the serialized value through [`print_json`].

use crate::builder::BuildOutput;
use crate::error::Failure;
use crate::media::MediaAsset;
use crate::playlist::Track;
use crate::posts::{Listing, PostContent};
use crate::site_config::{ConfigDocument, SiteConfigs};
use crate::stats::AggregateStats;
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Last non-empty lines of process output, for a compact failure summary.
fn tail_lines(text: &str, max: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(max);
    lines[skip..].to_vec()
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Posts
// ============================================================================

const TITLE_WIDTH: usize = 60;

/// Format a post listing, followed by any posts the listing skipped.
pub fn format_post_list(listing: &Listing) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];

    if listing.entries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }

    for (i, entry) in listing.entries.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            truncate(&entry.title, TITLE_WIDTH)
        ));
        lines.push(format!("{}File: {}", indent(1), entry.filename));
        if let Some(date) = &entry.date {
            lines.push(format!("{}Date: {}", indent(1), date));
        }
        if !entry.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), entry.tags.join(", ")));
        }
        if !entry.categories.is_empty() {
            lines.push(format!(
                "{}Categories: {}",
                indent(1),
                entry.categories.join(", ")
            ));
        }
        if let Some(cover) = &entry.cover {
            lines.push(format!("{}Cover: {}", indent(1), cover));
        }
    }

    if !listing.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &listing.skipped {
            lines.push(format!("{}{}: {}", indent(1), skipped.filename, skipped.reason));
        }
    }

    lines
}

pub fn print_post_list(listing: &Listing) {
    print_lines(format_post_list(listing));
}

/// Format one post: its stored text, exactly as on disk.
pub fn format_post(post: &PostContent) -> Vec<String> {
    post.raw.lines().map(str::to_string).collect()
}

pub fn print_post(post: &PostContent) {
    print_lines(format_post(post));
}

/// Confirmation line for a created or saved post.
pub fn format_post_saved(key: &str, created: bool) -> Vec<String> {
    let verb = if created { "Created" } else { "Saved" };
    vec![format!("{verb} {key}")]
}

pub fn print_post_saved(key: &str, created: bool) {
    print_lines(format_post_saved(key, created));
}

// ============================================================================
// Stats
// ============================================================================

pub fn format_stats(stats: &AggregateStats) -> Vec<String> {
    vec![
        format!("Posts: {}", stats.posts),
        format!("Tags: {}", stats.tags),
        format!("Categories: {}", stats.categories),
    ]
}

pub fn print_stats(stats: &AggregateStats) {
    print_lines(format_stats(stats));
}

// ============================================================================
// Site configuration documents
// ============================================================================

fn config_section(lines: &mut Vec<String>, label: &str, path: &Path, doc: &ConfigDocument) {
    lines.push(format!("{} ({})", label, path.display()));
    if doc.raw.trim().is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
        return;
    }
    for line in doc.raw.lines() {
        lines.push(format!("{}{}", indent(1), line));
    }
}

/// Format both configuration documents with the files they came from.
pub fn format_configs(configs: &SiteConfigs, site_path: &Path, theme_path: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    config_section(&mut lines, "Site", site_path, &configs.site);
    lines.push(String::new());
    config_section(&mut lines, "Theme", theme_path, &configs.theme);
    lines
}

pub fn print_configs(configs: &SiteConfigs, site_path: &Path, theme_path: &Path) {
    print_lines(format_configs(configs, site_path, theme_path));
}

// ============================================================================
// Media
// ============================================================================

pub fn format_media(assets: &[MediaAsset]) -> Vec<String> {
    let mut lines = vec!["Media".to_string()];
    if assets.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, asset) in assets.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), asset.name));
        lines.push(format!("{}URL: {}", indent(1), asset.url));
    }
    lines
}

pub fn print_media(assets: &[MediaAsset]) {
    print_lines(format_media(assets));
}

pub fn format_upload(asset: &MediaAsset) -> Vec<String> {
    vec![
        format!("Uploaded {}", asset.name),
        format!("{}URL: {}", indent(1), asset.url),
    ]
}

pub fn print_upload(asset: &MediaAsset) {
    print_lines(format_upload(asset));
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(output: &BuildOutput) -> Vec<String> {
    let mut lines: Vec<String> = output.stdout.lines().map(str::to_string).collect();
    lines.push(format!("==> {} complete", output.operation));
    lines
}

pub fn print_build_output(output: &BuildOutput) {
    print_lines(format_build_output(output));
}

// ============================================================================
// Playlist
// ============================================================================

pub fn format_playlist(tracks: &[Track], output_path: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, track) in tracks.iter().enumerate() {
        lines.push(format!(
            "{} {} - {}",
            format_index(i + 1),
            track.title,
            track.artist
        ));
        lines.push(format!("{}Cover: {}", indent(1), track.cover));
        if !track.lrc.is_empty() {
            lines.push(format!("{}Lyrics: {}", indent(1), track.lrc));
        }
    }
    if !tracks.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Wrote {} to {}",
        plural(tracks.len(), "track"),
        output_path.display()
    ));
    lines
}

pub fn print_playlist(tracks: &[Track], output_path: &Path) {
    print_lines(format_playlist(tracks, output_path));
}

// ============================================================================
// Failures
// ============================================================================

const STDERR_TAIL: usize = 20;

/// Format a failure for stderr: the message, then the tail of the tool's
/// stderr when a build failed.
pub fn format_failure(failure: &Failure) -> Vec<String> {
    let mut lines = vec![format!("Error: {}", failure.message)];
    if let Some(details) = &failure.details {
        let tail = tail_lines(&details.stderr, STDERR_TAIL);
        if !tail.is_empty() {
            lines.push(format!("{}stderr:", indent(1)));
            for line in tail {
                lines.push(format!("{}{}", indent(2), line));
            }
        }
    }
    lines
}

pub fn print_failure(failure: &Failure) {
    for line in format_failure(failure) {
        eprintln!("{}", line);
    }
}
