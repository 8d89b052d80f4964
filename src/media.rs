//! Uploaded media assets.
//!
//! A single flat directory of binary files. The filename is the asset's
//! identity; uploading the same name again replaces the file. The public URL
//! is the configured prefix joined with the filename, matching how Hexo copies
//! `source/image/` to `/image/` in the generated site.

use crate::config::public_url;
use crate::naming::check_bare_filename;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Extensions listed as media, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid media name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAsset {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Image files in the media directory, sorted by name.
    ///
    /// A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<MediaAsset>, MediaError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !is_image(&entry.path()) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!(file = ?name, "Skipping media file with non-UTF-8 name"),
            }
        }
        names.sort();

        Ok(names.into_iter().map(|name| self.asset(name)).collect())
    }

    /// Write `bytes` as `name`, creating the directory if needed.
    ///
    /// An existing file with the same name is overwritten.
    pub fn store(&self, name: &str, bytes: &[u8]) -> Result<MediaAsset, MediaError> {
        check_bare_filename(name).map_err(|reason| MediaError::InvalidName {
            name: name.to_string(),
            reason,
        })?;
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(name), bytes)?;
        info!(media = %name, bytes = bytes.len(), "Stored media asset");
        Ok(self.asset(name.to_string()))
    }

    /// Public URL for a file in the media directory.
    pub fn public_url(&self, name: &str) -> String {
        public_url(&self.url_prefix, name)
    }

    fn asset(&self, name: String) -> MediaAsset {
        MediaAsset {
            url: self.public_url(&name),
            path: self.dir.join(&name),
            name,
        }
    }
}

fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}
