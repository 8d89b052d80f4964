//! Admin configuration module.
//!
//! Handles loading, validating, and merging the optional `admin.toml` file in
//! the site root. Stock defaults describe a standard Hexo checkout with the
//! anzhiyu theme, so most sites need no config file at all.
//!
//! ## Config File Location
//!
//! ```text
//! blog/
//! ├── admin.toml                  # Admin config (optional)
//! ├── _config.yml                 # Hexo site config
//! ├── themes/anzhiyu/_config.yml  # Theme config (optional)
//! └── source/
//!     ├── _posts/                 # Posts
//!     ├── image/                  # Uploaded media
//!     ├── music/                  # Playlist input
//!     └── json/music.json         # Playlist output
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [posts]
//! dir = "source/_posts"
//! extension = "md"
//! default_layout = "post"
//! on_malformed = "abort"    # or "skip"
//!
//! [site]
//! config = "_config.yml"
//! theme_config = "themes/anzhiyu/_config.yml"
//!
//! [media]
//! dir = "source/image"
//! url_prefix = "/image"
//!
//! [build]
//! command = ["hexo"]
//!
//! [stats]
//! cache = false
//!
//! [playlist]
//! music_dir = "source/music"
//! output = "source/json/music.json"
//! url_prefix = "/music"
//! default_cover = "https://img02.anheyu.com/adminuploads/1/2022/09/26/6330e9bcc3955.jpg"
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early. All paths are relative to the site root.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the admin config file within the site root.
pub const CONFIG_FILENAME: &str = "admin.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Admin configuration loaded from `admin.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    /// Post storage settings.
    pub posts: PostsConfig,
    /// Locations of the Hexo site and theme config files.
    pub site: SiteFilesConfig,
    /// Uploaded media settings.
    pub media: MediaConfig,
    /// External build tool invocation.
    pub build: BuildConfig,
    /// Dashboard statistics settings.
    pub stats: StatsConfig,
    /// Music playlist generation settings.
    pub playlist: PlaylistConfig,
}

impl AdminConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.posts.extension;
        if ext.is_empty() || ext.contains('.') || ext.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "posts.extension must be a bare extension like \"md\"".into(),
            ));
        }
        if self.posts.default_layout.trim().is_empty() {
            return Err(ConfigError::Validation(
                "posts.default_layout must not be empty".into(),
            ));
        }
        if self
            .build
            .command
            .first()
            .is_none_or(|program| program.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "build.command must name a program".into(),
            ));
        }
        Ok(())
    }
}

/// What a listing does when one post fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// The whole listing fails with the first malformed post.
    #[default]
    Abort,
    /// Malformed posts are left out and reported alongside the listing.
    Skip,
}

/// Post storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// Directory holding post files.
    pub dir: PathBuf,
    /// File extension of post files, without the dot.
    pub extension: String,
    /// Layout written into newly created posts.
    pub default_layout: String,
    /// Listing behavior on malformed front matter.
    pub on_malformed: MalformedPolicy,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("source/_posts"),
            extension: "md".to_string(),
            default_layout: "post".to_string(),
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

/// Locations of the two YAML configuration documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteFilesConfig {
    /// Site-level Hexo config.
    pub config: PathBuf,
    /// Theme-level config. Optional on disk.
    pub theme_config: PathBuf,
}

impl Default for SiteFilesConfig {
    fn default() -> Self {
        Self {
            config: PathBuf::from("_config.yml"),
            theme_config: PathBuf::from("themes/anzhiyu/_config.yml"),
        }
    }
}

/// Uploaded media settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Flat directory holding uploaded files.
    pub dir: PathBuf,
    /// Public URL prefix the generated site serves the directory under.
    pub url_prefix: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("source/image"),
            url_prefix: "/image".to_string(),
        }
    }
}

/// External build tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Program plus leading arguments; the operation name is appended.
    /// `["npx", "hexo"]` runs `npx hexo generate`.
    pub command: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: vec!["hexo".to_string()],
        }
    }
}

/// Dashboard statistics settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    /// Reuse the last result until a post file changes.
    pub cache: bool,
}

/// Music playlist generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaylistConfig {
    /// Directory scanned for `.mp3` files and their sidecars.
    pub music_dir: PathBuf,
    /// JSON document written by each run.
    pub output: PathBuf,
    /// Public URL prefix of the music directory.
    pub url_prefix: String,
    /// Cover URL for tracks without a sibling image.
    pub default_cover: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            music_dir: PathBuf::from("source/music"),
            output: PathBuf::from("source/json/music.json"),
            url_prefix: "/music".to_string(),
            default_cover:
                "https://img02.anheyu.com/adminuploads/1/2022/09/26/6330e9bcc3955.jpg"
                    .to_string(),
        }
    }
}

/// Join a URL prefix and a file name with exactly one slash between them.
pub fn public_url(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AdminConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `admin.toml` from the site root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AdminConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AdminConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the admin config for a site root, falling back to stock defaults.
pub fn load_config(root: &Path) -> Result<AdminConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `admin.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# hexo-admin configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to the site root.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Posts
# ---------------------------------------------------------------------------
[posts]
# Directory holding post files.
dir = "source/_posts"

# Extension of post files, without the dot.
extension = "md"

# Layout written into posts created with `posts new`.
default_layout = "post"

# What listings and stats do when a post has a broken header block:
#   "abort" - fail the whole listing
#   "skip"  - leave the post out and report it
on_malformed = "abort"

# ---------------------------------------------------------------------------
# Site configuration documents
# ---------------------------------------------------------------------------
[site]
config = "_config.yml"

# The theme config may be absent; it then reads as an empty document.
theme_config = "themes/anzhiyu/_config.yml"

# ---------------------------------------------------------------------------
# Media uploads
# ---------------------------------------------------------------------------
[media]
dir = "source/image"

# Public URL prefix the generated site serves the media directory under.
url_prefix = "/image"

# ---------------------------------------------------------------------------
# Build tool
# ---------------------------------------------------------------------------
[build]
# Program plus leading arguments; the operation (clean, generate, deploy,
# server) is appended. Runs with the site root as working directory.
command = ["hexo"]

# ---------------------------------------------------------------------------
# Dashboard statistics
# ---------------------------------------------------------------------------
[stats]
# Reuse the last computed stats until a post file is added or modified.
cache = false

# ---------------------------------------------------------------------------
# Music playlist
# ---------------------------------------------------------------------------
[playlist]
music_dir = "source/music"
output = "source/json/music.json"
url_prefix = "/music"

# Cover used for tracks without a sibling jpg/jpeg/png/webp file.
default_cover = "https://img02.anheyu.com/adminuploads/1/2022/09/26/6330e9bcc3955.jpg"
"##
}
