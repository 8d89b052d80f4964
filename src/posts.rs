//! Post repository.
//!
//! Treats the posts directory as a document store keyed by filename. Each
//! `*.md` file is one post; its filename is the primary key and never changes
//! for the lifetime of the post. Renaming a post means creating a new one and
//! removing the old file, which is left to the caller.
//!
//! ## Operations
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | [`PostStore::list`] | Parse every post, return summaries sorted by filename |
//! | [`PostStore::get`] | Metadata, body, and raw text of one post |
//! | [`PostStore::replace`] | Overwrite a post with new metadata and body (creates it if absent) |
//! | [`PostStore::create`] | New post from a title; fails if the file already exists |
//!
//! ## Malformed posts
//!
//! A post whose header block cannot be decoded fails the whole listing by
//! default, so a broken file is noticed instead of silently vanishing from the
//! dashboard. With [`MalformedPolicy::Skip`] the listing leaves such posts out
//! and reports them in [`Listing::skipped`].
//!
//! ## Concurrency
//!
//! There is no locking. `create` checks for an existing file and then writes,
//! so two concurrent creates of the same title can both succeed with one
//! clobbering the other. Concurrent `replace` calls are last-writer-wins.

use crate::config::MalformedPolicy;
use crate::frontmatter::{self, Document, FrontMatterError};
use crate::metadata::{field_text, normalize_terms, resolve};
use crate::naming::check_bare_filename;
use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PostError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Post not found: {0}")]
    NotFound(String),
    #[error("Post already exists: {0}")]
    AlreadyExists(String),
    #[error("Posts directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Invalid post key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
    #[error("Malformed front matter in {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: FrontMatterError,
    },
}

/// Listing row for one post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    /// Filename, the post's key.
    pub filename: String,
    /// `title` field, or the filename without extension.
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// `cover` field, or `top_img`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// A post that was left out of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    pub filename: String,
    pub reason: String,
}

/// Result of a full scan of the posts directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub entries: Vec<EntrySummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

/// One post as stored: decoded header, body, and the exact file text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostContent {
    #[serde(rename = "data")]
    pub metadata: Mapping,
    #[serde(rename = "content")]
    pub body: String,
    pub raw: String,
}

/// File-backed post repository.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
    extension: String,
    policy: MalformedPolicy,
}

impl PostStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, policy: MalformedPolicy) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            policy,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Summaries of every post, sorted by filename.
    ///
    /// Skipped posts (only possible with [`MalformedPolicy::Skip`]) are
    /// logged; use [`scan`](Self::scan) to receive them.
    pub fn list(&self) -> Result<Vec<EntrySummary>, PostError> {
        Ok(self.scan()?.entries)
    }

    /// Parse every post and summarize it, applying the malformed-post policy.
    pub fn scan(&self) -> Result<Listing, PostError> {
        let keys = self.keys()?;

        let parsed: Vec<(String, Result<Document, PostError>)> = keys
            .into_par_iter()
            .map(|key| {
                let doc = self.read(&key).map(|(doc, _)| doc);
                (key, doc)
            })
            .collect();

        let mut listing = Listing::default();
        for (key, result) in parsed {
            match result {
                Ok(doc) => listing.entries.push(self.summarize(&key, &doc.metadata)),
                Err(err @ PostError::Malformed { .. }) if self.policy == MalformedPolicy::Skip => {
                    warn!(post = %key, error = %err, "Skipping malformed post");
                    listing.skipped.push(SkippedEntry {
                        filename: key,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            posts = listing.entries.len(),
            skipped = listing.skipped.len(),
            "Scanned posts directory"
        );
        Ok(listing)
    }

    /// Read one post.
    pub fn get(&self, key: &str) -> Result<PostContent, PostError> {
        self.check_key(key)?;
        let (doc, raw) = self.read(key)?;
        Ok(PostContent {
            metadata: doc.metadata,
            body: doc.body,
            raw,
        })
    }

    /// Whether a post with this key exists.
    pub fn exists(&self, key: &str) -> Result<bool, PostError> {
        self.check_key(key)?;
        Ok(self.path_for(key).try_exists()?)
    }

    /// Overwrite a post with `metadata` and `body`.
    ///
    /// The key does not need to exist beforehand; replacing a missing post
    /// creates it. Repeating the call with the same arguments leaves the file
    /// byte-identical.
    pub fn replace(&self, key: &str, body: &str, metadata: &Mapping) -> Result<(), PostError> {
        self.check_key(key)?;
        let text = frontmatter::serialize(metadata, body).map_err(|source| PostError::Malformed {
            key: key.to_string(),
            source,
        })?;
        self.write(key, &text)?;
        debug!(post = %key, bytes = text.len(), "Saved post");
        Ok(())
    }

    /// Create a post titled `title` and return its key.
    pub fn create(&self, title: &str, layout: &str) -> Result<String, PostError> {
        self.create_at(title, layout, Utc::now())
    }

    /// [`create`](Self::create) with an explicit creation timestamp.
    pub fn create_at(
        &self,
        title: &str,
        layout: &str,
        date: DateTime<Utc>,
    ) -> Result<String, PostError> {
        let key = format!("{title}.{}", self.extension);
        self.check_key(&key)?;

        if self.path_for(&key).try_exists()? {
            return Err(PostError::AlreadyExists(key));
        }

        let metadata = new_post_metadata(title, layout, date);
        self.replace(&key, "", &metadata)?;
        info!(post = %key, layout, "Created post");
        Ok(key)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn check_key(&self, key: &str) -> Result<(), PostError> {
        let invalid = |reason: &str| PostError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        check_bare_filename(key).map_err(invalid)?;
        let stem = key
            .strip_suffix(&self.extension)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(|| invalid(&format!("must end in .{}", self.extension)))?;
        if stem.trim().is_empty() {
            return Err(invalid("missing a name before the extension"));
        }
        Ok(())
    }

    /// Post filenames in the directory, sorted.
    fn keys(&self) -> Result<Vec<String>, PostError> {
        let entries = fs::read_dir(&self.dir).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PostError::MissingDirectory(self.dir.clone()),
            _ => PostError::Io(err),
        })?;

        let suffix = format!(".{}", self.extension);
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    warn!(file = ?name, "Skipping post with non-UTF-8 filename");
                    continue;
                }
            };
            if name.ends_with(&suffix) && entry.path().is_file() {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &str) -> Result<(Document, String), PostError> {
        let bytes = fs::read(self.path_for(key)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PostError::NotFound(key.to_string()),
            _ => PostError::Io(err),
        })?;
        // Legacy encodings decode with replacement characters instead of failing.
        let raw = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                warn!(post = %key, "Post is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        let doc = frontmatter::parse(&raw).map_err(|source| PostError::Malformed {
            key: key.to_string(),
            source,
        })?;
        Ok((doc, raw))
    }

    fn write(&self, key: &str, text: &str) -> Result<(), PostError> {
        fs::write(self.path_for(key), text).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PostError::MissingDirectory(self.dir.clone()),
            _ => PostError::Io(err),
        })
    }

    fn summarize(&self, key: &str, metadata: &Mapping) -> EntrySummary {
        let stem = key
            .strip_suffix(&format!(".{}", self.extension))
            .unwrap_or(key);
        let title = field_text(metadata, "title");
        let cover = field_text(metadata, "cover");
        let top_img = field_text(metadata, "top_img");

        EntrySummary {
            filename: key.to_string(),
            title: resolve(&[title.as_deref(), Some(stem)]).unwrap_or_else(|| stem.to_string()),
            date: field_text(metadata, "date"),
            tags: normalize_terms(metadata.get("tags")),
            categories: normalize_terms(metadata.get("categories")),
            cover: resolve(&[cover.as_deref(), top_img.as_deref()]),
        }
    }
}

/// Header fields seeded into a new post.
pub fn new_post_metadata(title: &str, layout: &str, date: DateTime<Utc>) -> Mapping {
    let mut metadata = Mapping::new();
    metadata.insert("title".into(), title.into());
    metadata.insert(
        "date".into(),
        date.to_rfc3339_opts(SecondsFormat::Millis, true).into(),
    );
    metadata.insert("tags".into(), Value::Sequence(Vec::new()));
    metadata.insert("categories".into(), Value::Sequence(Vec::new()));
    metadata.insert("layout".into(), layout.into());
    metadata
}
