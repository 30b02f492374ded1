//! Core configuration types for archive replay
//!
//! This module contains the `ReplayConfig` struct describing where archives
//! live and how replayed documents are decoded and rewritten.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::link_rewriter::OutputMode;

/// Process-wide replay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Archive roots, each holding one directory per site.
    ///
    /// **INVARIANT:** Never empty (enforced by the builder).
    pub(crate) archive_dirs: Vec<PathBuf>,

    /// How site-local URLs are written into served documents
    #[serde(default)]
    pub(crate) output_mode: OutputMode,

    /// Encoding label used when neither the document nor its version names one
    ///
    /// Default: `utf-8`
    #[serde(default = "default_fallback_encoding")]
    pub(crate) fallback_encoding: String,

    /// Leading bytes of a document searched for a charset declaration
    ///
    /// Default: 1024
    #[serde(default = "default_charset_sniff_bytes")]
    pub(crate) charset_sniff_bytes: usize,
}

fn default_fallback_encoding() -> String {
    crate::utils::DEFAULT_ENCODING.to_string()
}

fn default_charset_sniff_bytes() -> usize {
    crate::utils::CHARSET_SNIFF_BYTES
}
