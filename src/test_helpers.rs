//! Shared test utilities for the hexo-admin test suite.
//!
//! Provides a throwaway Hexo site layout plus lookup helpers over post
//! listings.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! site.write_post("hello.md", "---\ntitle: Hello\n---\n");
//!
//! let entries = PostStore::new(site.posts_dir(), "md", MalformedPolicy::Abort)
//!     .list()
//!     .unwrap();
//! assert_eq!(find_entry(&entries, "hello.md").title, "Hello");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::posts::EntrySummary;

// =========================================================================
// Fixture setup
// =========================================================================

/// A Hexo site root in a temp directory.
///
/// Starts with an empty `source/_posts/` and nothing else. Config files,
/// theme, and music directory are written on demand so tests can exercise
/// their absence.
pub struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("source/_posts")).unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root().join("source/_posts")
    }

    pub fn music_dir(&self) -> PathBuf {
        self.root().join("source/music")
    }

    pub fn theme_config_path(&self) -> PathBuf {
        self.root().join("themes/anzhiyu/_config.yml")
    }

    pub fn write_post(&self, name: &str, content: &str) {
        fs::write(self.posts_dir().join(name), content).unwrap();
    }

    pub fn write_site_config(&self, content: &str) {
        fs::write(self.root().join("_config.yml"), content).unwrap();
    }

    pub fn write_theme_config(&self, content: &str) {
        let path = self.theme_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Create empty files in `source/music/`.
    pub fn write_music_files(&self, names: &[&str]) {
        let dir = self.music_dir();
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    pub fn write_admin_config(&self, content: &str) {
        fs::write(self.root().join(crate::config::CONFIG_FILENAME), content).unwrap();
    }
}

// =========================================================================
// Listing lookups: panic with a clear message on miss
// =========================================================================

/// Find a listing entry by filename. Panics if not found.
pub fn find_entry<'a>(entries: &'a [EntrySummary], filename: &str) -> &'a EntrySummary {
    entries
        .iter()
        .find(|e| e.filename == filename)
        .unwrap_or_else(|| {
            let names = entry_filenames(entries);
            panic!("post '{filename}' not found. Available: {names:?}")
        })
}

/// All entry filenames in listing order.
pub fn entry_filenames(entries: &[EntrySummary]) -> Vec<&str> {
    entries.iter().map(|e| e.filename.as_str()).collect()
}
