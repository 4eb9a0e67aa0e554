use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigErrorKind {
    EmptyPath,
    NotFound,
    Unreadable,
    ParseFailure,
}

impl ConfigErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::EmptyPath => "no command file configured",
            Self::NotFound => "command file not found",
            Self::Unreadable => "command file unreadable",
            Self::ParseFailure => "command file malformed",
        }
    }
}

/// Failure to produce a command tree from a configuration document.
///
/// Never fatal: callers fall back to an empty tree and surface the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}{}", .kind.label(), .path.display(), detail_suffix(.detail))]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub path: PathBuf,
    pub detail: Option<String>,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, path: impl AsRef<Path>) -> Self {
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn empty_path() -> Self {
        Self::new(ConfigErrorKind::EmptyPath, "")
    }

    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::new(ConfigErrorKind::NotFound, path)
    }

    pub fn unreadable(path: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Unreadable, path).with_detail(detail)
    }

    pub fn parse_failure(path: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::ParseFailure, path).with_detail(detail)
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

/// Shape violation found while parsing a raw configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("json: {0}")]
    Json(String),
    #[error("document has no root element")]
    MissingRoot,
}
