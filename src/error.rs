use std::path::PathBuf;
use thiserror::Error;

/// Construction-time validation failures for parsed entities
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid class name: {0:?}")]
    InvalidClassName(String),

    #[error("Line numbers are 1-based, got {0}")]
    InvalidLineNumber(usize),

    #[error("Import path must be same-directory (./name.css): {0:?}")]
    InvalidImportPath(String),

    #[error("Path is not absolute: {0}")]
    NotAbsolute(PathBuf),
}

/// Failures reading a CSS file from disk
#[derive(Debug, Error)]
pub enum CssParseError {
    #[error("CSS file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read CSS file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CssParseError>;
