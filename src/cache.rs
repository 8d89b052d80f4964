//! Invalidate-on-write cache for whole-directory scans.
//!
//! Dashboard stats parse every post. On a large blog that is the slowest
//! request in the admin, and the answer only changes when a post file does.
//! This module lets the stats aggregator reuse its last result until then.
//!
//! # Design
//!
//! ## Cache key
//!
//! The key is a **directory token**: SHA-256 over the `(filename, length,
//! mtime)` triple of every post file, in sorted filename order. Creating,
//! saving, or removing a post changes the token; nothing else does. Tokens
//! are cheap to compute (one `stat` per file, no reads), which is the point.
//!
//! Unlike a content hash, the token does not survive a `git checkout` that
//! resets modification times. That only costs one extra scan.
//!
//! ## Storage
//!
//! In memory only, one slot. The cache lives as long as the process.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::UNIX_EPOCH;

/// Compute the directory token for files in `dir` ending in `.{extension}`.
///
/// A missing directory hashes as an empty listing.
pub fn directory_token(dir: &Path, extension: &str) -> io::Result<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(hash_listing(&[])),
        Err(err) => return Err(err),
    };

    let suffix = format!(".{extension}");
    let mut listing = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            // Post listings skip these too.
            continue;
        };
        if !name.ends_with(&suffix) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        listing.push(FileStamp {
            name,
            len: meta.len(),
            mtime,
        });
    }
    listing.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(hash_listing(&listing))
}

struct FileStamp {
    name: String,
    len: u64,
    mtime: u128,
}

fn hash_listing(listing: &[FileStamp]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"posts\0");
    for stamp in listing {
        hasher.update(stamp.name.as_bytes());
        hasher.update(b"\0");
        hasher.update(stamp.len.to_le_bytes());
        hasher.update(stamp.mtime.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Single-slot cache holding one value and the token it was computed under.
#[derive(Debug, Default)]
pub struct TokenCache<T> {
    slot: Mutex<Option<(String, T)>>,
}

impl<T: Clone> TokenCache<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// The cached value, if it was stored under `token`.
    pub fn get(&self, token: &str) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|(stored, _)| stored == token)
            .map(|(_, value)| value.clone())
    }

    /// Replace the cached value.
    pub fn put(&self, token: String, value: T) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some((token, value));
    }
}
