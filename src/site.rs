//! One Hexo site root, wired up from its admin config.
//!
//! [`Site`] resolves every configured path against the root and hands out the
//! component stores. It holds no state of its own apart from the stats cache,
//! so opening the same root twice yields two independent but equivalent views.

use crate::builder::{BuildOrchestrator, ProcessRunner, SystemRunner};
use crate::config::{self, AdminConfig, ConfigError};
use crate::media::MediaStore;
use crate::playlist::{self, PlaylistError, PlaylistSettings, Track};
use crate::posts::{PostError, PostStore};
use crate::site_config::ConfigStore;
use crate::stats::{AggregateStats, StatsAggregator};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Site<R = SystemRunner> {
    root: PathBuf,
    config: AdminConfig,
    posts: PostStore,
    config_store: ConfigStore,
    media: MediaStore,
    stats: StatsAggregator,
    builder: BuildOrchestrator<R>,
}

impl Site {
    /// Open the site at `root`, reading `admin.toml` if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = config::load_config(&root)?;
        debug!(root = %root.display(), ?config, "Opened site");
        Ok(Self::with_runner(root, config, SystemRunner))
    }
}

impl<R: ProcessRunner> Site<R> {
    /// Assemble a site from an already-loaded config and a process runner.
    pub fn with_runner(root: impl Into<PathBuf>, config: AdminConfig, runner: R) -> Self {
        let root = root.into();
        let posts = PostStore::new(
            root.join(&config.posts.dir),
            config.posts.extension.clone(),
            config.posts.on_malformed,
        );
        let config_store = ConfigStore::new(
            root.join(&config.site.config),
            root.join(&config.site.theme_config),
        );
        let media = MediaStore::new(root.join(&config.media.dir), config.media.url_prefix.clone());
        let stats = StatsAggregator::new(config.stats.cache);
        let builder = BuildOrchestrator::new(runner, root.clone(), config.build.command.clone());
        Self {
            root,
            config,
            posts,
            config_store,
            media,
            stats,
            builder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn posts(&self) -> &PostStore {
        &self.posts
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn builder(&self) -> &BuildOrchestrator<R> {
        &self.builder
    }

    /// Dashboard counts over every post.
    pub fn stats(&self) -> Result<AggregateStats, PostError> {
        self.stats.compute(&self.posts)
    }

    /// Playlist paths resolved against the site root.
    pub fn playlist_settings(&self) -> PlaylistSettings {
        let playlist = &self.config.playlist;
        PlaylistSettings {
            music_dir: self.root.join(&playlist.music_dir),
            output: self.root.join(&playlist.output),
            url_prefix: playlist.url_prefix.clone(),
            default_cover: playlist.default_cover.clone(),
        }
    }

    /// Rebuild the music playlist document.
    pub fn generate_playlist(&self) -> Result<Vec<Track>, PlaylistError> {
        playlist::generate(&self.playlist_settings())
    }
}
