//! Dashboard statistics.
//!
//! Counts posts and the distinct tags and categories used across them. Each
//! request rescans and reparses the whole posts directory; nothing is
//! maintained incrementally. When `[stats] cache = true`, the last result is
//! reused until the posts directory token changes (see [`crate::cache`]).

use crate::cache::{TokenCache, directory_token};
use crate::posts::{EntrySummary, PostError, PostStore};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Aggregate counts over all posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub posts: usize,
    pub tags: usize,
    pub categories: usize,
}

/// Fold post summaries into aggregate counts.
///
/// Tags and categories are already normalized by the listing, so a post
/// tagged `x` and another tagged `[x, y]` contribute `{x, y}`.
pub fn aggregate(entries: &[EntrySummary]) -> AggregateStats {
    let mut tags = BTreeSet::new();
    let mut categories = BTreeSet::new();
    for entry in entries {
        tags.extend(entry.tags.iter().map(String::as_str));
        categories.extend(entry.categories.iter().map(String::as_str));
    }
    AggregateStats {
        posts: entries.len(),
        tags: tags.len(),
        categories: categories.len(),
    }
}

#[derive(Debug, Default)]
pub struct StatsAggregator {
    cache: Option<TokenCache<AggregateStats>>,
}

impl StatsAggregator {
    pub fn new(cache_enabled: bool) -> Self {
        Self {
            cache: cache_enabled.then(TokenCache::new),
        }
    }

    /// Compute stats for every post in `posts`.
    pub fn compute(&self, posts: &PostStore) -> Result<AggregateStats, PostError> {
        let Some(cache) = &self.cache else {
            return Ok(aggregate(&posts.list()?));
        };

        let token = directory_token(posts.dir(), posts.extension())?;
        if let Some(stats) = cache.get(&token) {
            debug!(?stats, "Stats served from cache");
            return Ok(stats);
        }

        let stats = aggregate(&posts.list()?);
        cache.put(token, stats);
        Ok(stats)
    }
}
