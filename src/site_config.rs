//! Site and theme configuration documents.
//!
//! Hexo keeps site settings in `_config.yml` and theme settings in the theme's
//! own `_config.yml`. Both are read and replaced as whole documents: the store
//! never edits individual fields, and writes are not validated. A broken
//! document is accepted and only fails the next time it is read.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config file {path} is not valid YAML: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Unknown config target {0:?}; expected \"site\" or \"theme\"")]
    UnknownTarget(String),
}

/// Which configuration document an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigTarget {
    Site,
    Theme,
}

impl FromStr for ConfigTarget {
    type Err = ConfigStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site" => Ok(Self::Site),
            "theme" => Ok(Self::Theme),
            other => Err(ConfigStoreError::UnknownTarget(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site => f.write_str("site"),
            Self::Theme => f.write_str("theme"),
        }
    }
}

/// One configuration document, decoded for display and kept verbatim for editing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDocument {
    pub parsed: Value,
    pub raw: String,
}

impl ConfigDocument {
    fn empty() -> Self {
        Self {
            parsed: Value::Mapping(Mapping::new()),
            raw: String::new(),
        }
    }
}

/// Both configuration documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteConfigs {
    pub site: ConfigDocument,
    pub theme: ConfigDocument,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    site_path: PathBuf,
    theme_path: PathBuf,
}

impl ConfigStore {
    pub fn new(site_path: impl Into<PathBuf>, theme_path: impl Into<PathBuf>) -> Self {
        Self {
            site_path: site_path.into(),
            theme_path: theme_path.into(),
        }
    }

    pub fn path(&self, target: ConfigTarget) -> &Path {
        match target {
            ConfigTarget::Site => &self.site_path,
            ConfigTarget::Theme => &self.theme_path,
        }
    }

    /// Read both documents.
    ///
    /// The site document must exist. A missing theme document reads as an
    /// empty mapping with empty raw text.
    pub fn read(&self) -> Result<SiteConfigs, ConfigStoreError> {
        let site = match read_optional(&self.site_path)? {
            Some(raw) => decode(&self.site_path, raw)?,
            None => return Err(ConfigStoreError::NotFound(self.site_path.clone())),
        };
        let theme = match read_optional(&self.theme_path)? {
            Some(raw) => decode(&self.theme_path, raw)?,
            None => ConfigDocument::empty(),
        };
        Ok(SiteConfigs { site, theme })
    }

    /// Replace a document's entire contents with `raw`.
    pub fn write(&self, target: ConfigTarget, raw: &str) -> Result<(), ConfigStoreError> {
        let path = self.path(target);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, raw)?;
        info!(target = %target, path = %path.display(), bytes = raw.len(), "Saved config");
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigStoreError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn decode(path: &Path, raw: String) -> Result<ConfigDocument, ConfigStoreError> {
    if raw.trim().is_empty() {
        return Ok(ConfigDocument {
            parsed: Value::Mapping(Mapping::new()),
            raw,
        });
    }
    let parsed = serde_yaml::from_str(&raw).map_err(|source| ConfigStoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ConfigDocument { parsed, raw })
}
