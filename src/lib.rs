//! # Hexo Admin
//!
//! A file-backed administration backend for a Hexo blog. The site's own files
//! are the database: posts are markdown files with a YAML header block, site
//! settings are the Hexo `_config.yml` documents, and uploads are plain files
//! in a media directory. Builds are delegated to the `hexo` CLI.
//!
//! ```text
//! blog/
//! ├── _config.yml                 ← ConfigStore (site)
//! ├── themes/anzhiyu/_config.yml  ← ConfigStore (theme)
//! └── source/
//!     ├── _posts/*.md             ← PostStore, StatsAggregator
//!     ├── image/                  ← MediaStore
//!     └── music/*.mp3             → json/music.json (playlist)
//! ```
//!
//! Every operation is synchronous and stateless between calls: each request
//! reads the files it needs and writes whole files back. The only in-memory
//! state is the optional stats cache.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Split a post into YAML header and body, and join them back |
//! | [`posts`] | Post repository keyed by filename: list, get, replace, create |
//! | [`site_config`] | Whole-document read and replace of the site and theme configs |
//! | [`media`] | Flat upload directory with public URL derivation |
//! | [`stats`] | Post, tag, and category counts over every post |
//! | [`cache`] | Directory-token cache backing the optional stats cache |
//! | [`builder`] | Allow-listed `hexo` operations through a process runner |
//! | [`playlist`] | Music playlist JSON derived from `Title - Artist.mp3` filenames |
//! | [`naming`] | Track filename parser and bare-filename key checks |
//! | [`metadata`] | Header field normalization, fallbacks, sidecar lookup |
//! | [`config`] | `admin.toml` loading, validation, and merging over stock defaults |
//! | [`site`] | Wires every component to one site root |
//! | [`error`] | Structured `{kind, message, details}` failures for callers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Filenames Are Keys
//!
//! A post's filename is its identity for its whole life. There is no rename:
//! creating a post derives the key from the title once, and later title edits
//! only change the header. Keys must be bare filenames, so a request can never
//! reach outside the posts directory.
//!
//! ## Unknown Header Fields Survive
//!
//! Themes and plugins add their own header fields (`top_img`, `abbrlink`,
//! `sticky`). The header is decoded into an order-preserving mapping, not a
//! struct, so saving a post writes back every field it was read with.
//!
//! ## The Build Tool Is Injected
//!
//! [`builder::BuildOrchestrator`] spawns through the [`builder::ProcessRunner`]
//! trait. Only `clean`, `generate`, `deploy`, and `server` reach the runner;
//! anything else is rejected before a process exists.

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod media;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod playlist;
pub mod posts;
pub mod site;
pub mod site_config;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_helpers;
