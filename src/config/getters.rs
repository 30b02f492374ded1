//! Getter methods for `ReplayConfig`

use std::path::PathBuf;

use super::types::ReplayConfig;
use crate::link_rewriter::OutputMode;

impl ReplayConfig {
    #[must_use]
    pub fn archive_dirs(&self) -> &[PathBuf] {
        &self.archive_dirs
    }

    #[must_use]
    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    #[must_use]
    pub fn fallback_encoding(&self) -> &str {
        &self.fallback_encoding
    }

    #[must_use]
    pub fn charset_sniff_bytes(&self) -> usize {
        self.charset_sniff_bytes
    }
}
