//! Music playlist generation from filenames.
//!
//! A one-shot batch job, separate from the post and config operations: it
//! scans the music directory and rewrites the playlist JSON consumed by the
//! theme's music player. Nothing is carried between runs; every run rebuilds
//! the document from the current directory listing.
//!
//! ## Input layout
//!
//! ```text
//! source/music/
//! ├── Interstellar - Hans Zimmer.mp3   # Track: title - artist
//! ├── Interstellar - Hans Zimmer.jpg   # Cover (jpg > jpeg > png > webp)
//! ├── Interstellar - Hans Zimmer.lrc   # Lyrics (optional)
//! └── Solo.mp3                         # No dash: artist "Unknown", default cover
//! ```
//!
//! ## Output
//!
//! ```json
//! [
//!     {
//!         "name": "Interstellar",
//!         "artist": "Hans Zimmer",
//!         "url": "/music/Interstellar - Hans Zimmer.mp3",
//!         "cover": "/music/Interstellar - Hans Zimmer.jpg",
//!         "lrc": "/music/Interstellar - Hans Zimmer.lrc"
//!     }
//! ]
//! ```

use crate::config::public_url;
use crate::metadata::find_sidecar;
use crate::naming::parse_track_name;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Audio files picked up as tracks, compared case-insensitively.
pub const AUDIO_EXTENSION: &str = "mp3";
/// Cover sidecar extensions in priority order.
pub const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
pub const LYRICS_EXTENSION: &str = "lrc";

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Music directory not found: {0}")]
    MissingMusicDir(PathBuf),
}

/// One playlist record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track title; the player reads it as `name`.
    #[serde(rename = "name")]
    pub title: String,
    pub artist: String,
    pub url: String,
    pub cover: String,
    /// Lyrics URL, empty when the track has none.
    pub lrc: String,
}

/// Where to read tracks from and how to address them.
#[derive(Debug, Clone)]
pub struct PlaylistSettings {
    pub music_dir: PathBuf,
    pub output: PathBuf,
    pub url_prefix: String,
    pub default_cover: String,
}

/// Derive one track per audio file in `music_dir`, sorted by filename.
pub fn scan_tracks(
    music_dir: &Path,
    url_prefix: &str,
    default_cover: &str,
) -> Result<Vec<Track>, PlaylistError> {
    let entries = fs::read_dir(music_dir).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PlaylistError::MissingMusicDir(music_dir.to_path_buf()),
        _ => PlaylistError::Io(err),
    })?;

    let mut listing = HashSet::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                listing.insert(name);
            }
            Err(name) => warn!(file = ?name, "Skipping music file with non-UTF-8 name"),
        }
    }

    let mut audio: Vec<&String> = listing.iter().filter(|name| is_audio(name)).collect();
    audio.sort();

    let tracks = audio
        .into_iter()
        .map(|filename| {
            let stem = Path::new(filename)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parsed = parse_track_name(&stem);
            let cover = find_sidecar(&listing, &stem, COVER_EXTENSIONS)
                .map(|name| public_url(url_prefix, &name))
                .unwrap_or_else(|| default_cover.to_string());
            let lrc = find_sidecar(&listing, &stem, &[LYRICS_EXTENSION])
                .map(|name| public_url(url_prefix, &name))
                .unwrap_or_default();

            debug!(track = %filename, title = %parsed.title, artist = %parsed.artist, "Found track");
            Track {
                title: parsed.title,
                artist: parsed.artist,
                url: public_url(url_prefix, filename),
                cover,
                lrc,
            }
        })
        .collect();

    Ok(tracks)
}

/// Write tracks as a JSON array with 4-space indentation.
pub fn write_playlist(tracks: &[Track], output: &Path) -> Result<(), PlaylistError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tracks.serialize(&mut ser)?;
    fs::write(output, buf)?;
    Ok(())
}

/// Scan the music directory and rewrite the playlist document.
pub fn generate(settings: &PlaylistSettings) -> Result<Vec<Track>, PlaylistError> {
    info!(dir = %settings.music_dir.display(), "Scanning music directory");
    let tracks = scan_tracks(
        &settings.music_dir,
        &settings.url_prefix,
        &settings.default_cover,
    )?;
    write_playlist(&tracks, &settings.output)?;
    info!(
        tracks = tracks.len(),
        output = %settings.output.display(),
        "Playlist written"
    );
    Ok(tracks)
}

fn is_audio(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(AUDIO_EXTENSION))
}
