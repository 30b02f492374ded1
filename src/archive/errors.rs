//! Error types for archive index construction and lookup

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Error types for archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Filesystem access failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Site manifest exists but could not be parsed
    #[error("Invalid site manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two site directories produced the same site identifier
    #[error("Duplicate archive found for site '{site}': {first} and {second}")]
    DuplicateSite {
        site: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Version label is not configured for the site
    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    /// Version label is not a `YYYY-MM-DD` date
    #[error("Invalid version label '{0}': expected YYYY-MM-DD")]
    InvalidVersionLabel(String),

    /// Version override produced settings that no longer deserialize
    #[error("Invalid merged settings for version '{version}': {source}")]
    Settings {
        version: String,
        #[source]
        source: serde_json::Error,
    },

    /// Directory walk failed for a reason other than permissions
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

impl ArchiveError {
    /// Errors that must abort startup rather than skip a single site
    #[must_use]
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            ArchiveError::DuplicateSite { .. }
                | ArchiveError::Manifest { .. }
                | ArchiveError::Io { .. }
                | ArchiveError::Walk { .. }
        )
    }
}
