//! Structured failures for callers outside the library.
//!
//! Each module reports errors through its own `thiserror` enum. A transport
//! layer (the CLI, or an HTTP wrapper) needs one shape instead: a stable
//! [`ErrorKind`], a human message, and for failed builds the tool's captured
//! output. [`Failure`] is that shape, and every module error converts into it.
//!
//! | Module error | Kinds |
//! |--------------|-------|
//! | [`PostError`] | `not_found`, `already_exists`, `invalid_key`, `malformed_header`, `io` |
//! | [`ConfigStoreError`] | `not_found`, `malformed_document`, `invalid_operation`, `io` |
//! | [`MediaError`] | `invalid_key`, `io` |
//! | [`BuildError`] | `invalid_operation`, `external_process` |
//! | [`PlaylistError`] | `not_found`, `io` |
//! | [`ConfigError`] | `malformed_document`, `io` |

use crate::builder::BuildError;
use crate::config::ConfigError;
use crate::media::MediaError;
use crate::playlist::PlaylistError;
use crate::posts::PostError;
use crate::site_config::ConfigStoreError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidKey,
    MalformedHeader,
    MalformedDocument,
    InvalidOperation,
    Io,
    ExternalProcess,
}

/// Captured output of a failed external process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDiagnostics {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ProcessDiagnostics>,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

impl From<PostError> for Failure {
    fn from(err: PostError) -> Self {
        let kind = match &err {
            PostError::NotFound(_) | PostError::MissingDirectory(_) => ErrorKind::NotFound,
            PostError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            PostError::InvalidKey { .. } => ErrorKind::InvalidKey,
            PostError::Malformed { .. } => ErrorKind::MalformedHeader,
            PostError::Io(_) => ErrorKind::Io,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<ConfigStoreError> for Failure {
    fn from(err: ConfigStoreError) -> Self {
        let kind = match &err {
            ConfigStoreError::NotFound(_) => ErrorKind::NotFound,
            ConfigStoreError::Malformed { .. } => ErrorKind::MalformedDocument,
            ConfigStoreError::UnknownTarget(_) => ErrorKind::InvalidOperation,
            ConfigStoreError::Io(_) => ErrorKind::Io,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<MediaError> for Failure {
    fn from(err: MediaError) -> Self {
        let kind = match &err {
            MediaError::InvalidName { .. } => ErrorKind::InvalidKey,
            MediaError::Io(_) => ErrorKind::Io,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<BuildError> for Failure {
    fn from(err: BuildError) -> Self {
        let message = err.to_string();
        match err {
            BuildError::InvalidOperation(_) => Failure::new(ErrorKind::InvalidOperation, message),
            BuildError::ExternalProcess {
                exit_code,
                stdout,
                stderr,
                ..
            } => Failure {
                kind: ErrorKind::ExternalProcess,
                message,
                details: Some(ProcessDiagnostics {
                    exit_code,
                    stdout,
                    stderr,
                }),
            },
        }
    }
}

impl From<PlaylistError> for Failure {
    fn from(err: PlaylistError) -> Self {
        let kind = match &err {
            PlaylistError::MissingMusicDir(_) => ErrorKind::NotFound,
            PlaylistError::Io(_) | PlaylistError::Json(_) => ErrorKind::Io,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<ConfigError> for Failure {
    fn from(err: ConfigError) -> Self {
        let kind = match &err {
            ConfigError::Toml(_) | ConfigError::Validation(_) => ErrorKind::MalformedDocument,
            ConfigError::Io(_) => ErrorKind::Io,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::new(ErrorKind::Io, err.to_string())
    }
}

impl From<crate::frontmatter::FrontMatterError> for Failure {
    fn from(err: crate::frontmatter::FrontMatterError) -> Self {
        Failure::new(ErrorKind::MalformedHeader, err.to_string())
    }
}
