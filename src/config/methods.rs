//! Construction helpers for `ReplayConfig`

use anyhow::Result;
use std::path::PathBuf;

use super::types::ReplayConfig;
use crate::archive::{ArchiveRegistry, ArchiveResult};
use crate::content_processor::DecodeOptions;
use crate::link_rewriter::OutputMode;
use crate::replay::ReplayOptions;
use crate::utils::{ARCHIVE_DIR_ENV, DEFAULT_ARCHIVE_DIR};

/// Archive roots named by an `ARCHIVE_DIR`-style value.
///
/// Uses the platform path-list separator; empty parts are dropped.
pub fn archive_dirs_from(value: Option<&std::ffi::OsStr>) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = value
        .map(|v| {
            std::env::split_paths(v)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();
    if dirs.is_empty() {
        vec![PathBuf::from(DEFAULT_ARCHIVE_DIR)]
    } else {
        dirs
    }
}

impl ReplayConfig {
    /// Configuration from the process environment.
    ///
    /// Reads the archive roots from `ARCHIVE_DIR`, defaulting to `./archives`.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var_os(ARCHIVE_DIR_ENV);
        let mut dirs = archive_dirs_from(value.as_deref()).into_iter();
        let first = dirs.next().unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_DIR));
        let builder = dirs.fold(Self::builder().archive_dir(first), |b, dir| {
            b.archive_dir(dir)
        });
        builder.build()
    }

    /// Same configuration with a different output mode.
    #[must_use]
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Decoding options for the document pipeline.
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            fallback_encoding: self.fallback_encoding.clone(),
            sniff_bytes: self.charset_sniff_bytes,
        }
    }

    /// Per-request rewrite options.
    #[must_use]
    pub fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            decode: self.decode_options(),
            output_mode: self.output_mode,
        }
    }

    /// Build the archive registry over every configured root.
    pub fn load_registry(&self) -> ArchiveResult<ArchiveRegistry> {
        ArchiveRegistry::build(self.archive_dirs.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn builder_requires_archive_dir_and_keeps_defaults() {
        let config = ReplayConfig::builder()
            .output_mode(OutputMode::Absolute)
            .archive_dir("/srv/a")
            .archive_dir("/srv/b")
            .build()
            .expect("valid config");
        assert_eq!(
            config.archive_dirs(),
            &[PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
        assert_eq!(config.output_mode(), OutputMode::Absolute);
        assert_eq!(config.fallback_encoding(), "utf-8");
        assert_eq!(config.charset_sniff_bytes(), 1024);
    }

    #[test]
    fn unknown_fallback_encoding_is_rejected() {
        let result = ReplayConfig::builder()
            .archive_dir("/srv/a")
            .fallback_encoding("no-such-encoding")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn archive_dirs_default_and_split() {
        assert_eq!(archive_dirs_from(None), vec![PathBuf::from("archives")]);
        let joined = std::env::join_paths(["/a", "/b"]).expect("joinable");
        assert_eq!(
            archive_dirs_from(Some(joined.as_os_str())),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert_eq!(
            archive_dirs_from(Some(OsStr::new(""))),
            vec![PathBuf::from("archives")]
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ReplayConfig =
            serde_json::from_str(r#"{"archive_dirs": ["/srv/a"]}"#).expect("parses");
        assert_eq!(config.output_mode(), OutputMode::Relative);
        assert_eq!(config.decode_options(), DecodeOptions::default());
    }
}
