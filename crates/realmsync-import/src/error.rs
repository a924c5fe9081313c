//! Error types for the import pipeline
//!
//! Every variant is fatal to the current run and carries the path it
//! originated from so callers can render a readable report.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Result type alias using the import pipeline's error type
pub type Result<T> = std::result::Result<T, ImportError>;

/// Import pipeline errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// A configured pattern resolved to nothing, or no extractor claimed a resource
    #[error("Cannot resolve import path '{path}': {message}")]
    ResourceResolution { path: String, message: String },

    /// Two resources resolve to the same file
    #[error("Duplicate import source {path} (first seen as {first}, again as {second})")]
    DuplicateSource {
        path: Utf8PathBuf,
        first: String,
        second: String,
    },

    /// Undefined or cyclic variable during interpolation
    #[error("Variable substitution failed in {path}: {message}")]
    Interpolation { path: Utf8PathBuf, message: String },

    /// Unknown extension or invalid document content
    #[error("Failed to parse {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },

    /// Reading a discovered file failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An exclude or path glob is malformed
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configuration problem surfaced while wiring the pipeline
    #[error(transparent)]
    Config(#[from] realmsync_core::Error),
}

impl ImportError {
    /// Create a resource resolution error
    pub fn resource_resolution(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResourceResolution {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate source error
    pub fn duplicate_source(
        path: impl Into<Utf8PathBuf>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateSource {
            path: path.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an interpolation error
    pub fn interpolation(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Interpolation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
