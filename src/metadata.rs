//! Metadata field resolution.
//!
//! Post headers are open-ended YAML written by hand, by Hexo, and by this
//! tool, so the same logical field shows up in several shapes. This module
//! turns those shapes into the values the rest of the crate works with.
//!
//! ## Resolution priority
//!
//! Each derived field is resolved independently. The first non-empty value wins:
//!
//! - **Title**: `title` field → filename stem
//! - **Cover**: `cover` field → `top_img` field → None
//!
//! ## Term fields
//!
//! `tags` and `categories` may be absent, a bare scalar (`tags: rust`), or a
//! sequence (`tags: [rust, yaml]`). [`normalize_terms`] folds all three into a
//! list of strings so counting and display never care which form was written.
//!
//! ## Sidecar files
//!
//! Playlist tracks pick up covers and lyrics from sibling files sharing the
//! track's stem. [`find_sidecar`] resolves them against a directory listing in
//! a fixed extension priority order.

use serde_yaml::{Mapping, Value};
use std::collections::HashSet;

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title: resolve(&[header_title, filename_stem])
/// cover: resolve(&[cover, top_img])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Render a scalar YAML value as text. Collections and nulls have no label.
pub fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_label(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Look up a header field and render it as text.
pub fn field_text(metadata: &Mapping, key: &str) -> Option<String> {
    metadata.get(key).and_then(scalar_label)
}

/// Normalize a scalar-or-list field into its terms, in document order.
///
/// Nulls, empty strings, and nested collections contribute nothing.
pub fn normalize_terms(value: Option<&Value>) -> Vec<String> {
    let label = |v: &Value| scalar_label(v).filter(|s| !s.trim().is_empty());
    match value {
        None => Vec::new(),
        Some(Value::Sequence(items)) => items.iter().filter_map(label).collect(),
        Some(other) => label(other).into_iter().collect(),
    }
}

/// Find the first sibling of `stem` with one of `extensions`, in priority order.
///
/// `listing` holds the file names present in the directory. Returns the
/// matching file name, e.g. `"Song - Artist.jpg"`.
pub fn find_sidecar(listing: &HashSet<String>, stem: &str, extensions: &[&str]) -> Option<String> {
    extensions
        .iter()
        .map(|ext| format!("{stem}.{ext}"))
        .find(|candidate| listing.contains(candidate))
}
