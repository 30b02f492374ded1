//! Error types for the replay facade

use std::path::PathBuf;
use thiserror::Error;

use crate::archive::ArchiveError;

/// Result type alias for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Reasons a replay request cannot be answered with content
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    /// Version exists in the manifest but is not a `YYYY-MM-DD` label
    #[error("Invalid version label: {0}")]
    InvalidVersion(String),

    /// No live capture of the path at the version's date
    #[error("Not found: {site}/{path}")]
    NotFound { site: String, path: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ReplayError {
    /// HTTP status an outer server should answer with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownSite(_) | Self::UnknownVersion(_) | Self::NotFound { .. } => 404,
            Self::InvalidVersion(_) => 400,
            Self::Io { .. } | Self::Archive(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ReplayError::UnknownSite("x".into()).status_code(), 404);
        assert_eq!(ReplayError::UnknownVersion("2001-01-01".into()).status_code(), 404);
        assert_eq!(
            ReplayError::NotFound {
                site: "x".into(),
                path: "a.html".into()
            }
            .status_code(),
            404
        );
        assert_eq!(ReplayError::InvalidVersion("latest".into()).status_code(), 400);
        let io = ReplayError::Io {
            path: PathBuf::from("/a"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(io.status_code(), 500);
    }
}
