//! Type-safe builder for `ReplayConfig` using the typestate pattern
//!
//! `build()` only exists once at least one archive directory has been given.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::ReplayConfig;
use crate::content_processor::encoding_for_label;
use crate::link_rewriter::OutputMode;
use crate::utils::{CHARSET_SNIFF_BYTES, DEFAULT_ENCODING};

// Type states for the builder
pub struct WithArchiveDir;

pub struct ReplayConfigBuilder<State = ()> {
    pub(crate) archive_dirs: Vec<PathBuf>,
    pub(crate) output_mode: OutputMode,
    pub(crate) fallback_encoding: String,
    pub(crate) charset_sniff_bytes: usize,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ReplayConfigBuilder<()> {
    fn default() -> Self {
        Self {
            archive_dirs: Vec::new(),
            output_mode: OutputMode::default(),
            fallback_encoding: DEFAULT_ENCODING.to_string(),
            charset_sniff_bytes: CHARSET_SNIFF_BYTES,
            _phantom: PhantomData,
        }
    }
}

impl ReplayConfig {
    /// Create a builder for configuring a `ReplayConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ReplayConfigBuilder<()> {
        ReplayConfigBuilder::default()
    }
}

impl<State> ReplayConfigBuilder<State> {
    /// Add an archive root; may be called repeatedly.
    pub fn archive_dir(self, dir: impl Into<PathBuf>) -> ReplayConfigBuilder<WithArchiveDir> {
        let mut archive_dirs = self.archive_dirs;
        archive_dirs.push(dir.into());
        ReplayConfigBuilder {
            archive_dirs,
            output_mode: self.output_mode,
            fallback_encoding: self.fallback_encoding,
            charset_sniff_bytes: self.charset_sniff_bytes,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    #[must_use]
    pub fn fallback_encoding(mut self, label: impl Into<String>) -> Self {
        self.fallback_encoding = label.into();
        self
    }

    /// Set how many leading bytes are searched for a `<meta>` charset
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_archive_replay::config::ReplayConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ReplayConfig::builder()
    ///     .archive_dir("./archives")
    ///     .charset_sniff_bytes(4096)
    ///     .build()?;
    /// assert_eq!(config.charset_sniff_bytes(), 4096);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn charset_sniff_bytes(mut self, bytes: usize) -> Self {
        self.charset_sniff_bytes = bytes;
        self
    }
}

// Build method only available when an archive root is set
impl ReplayConfigBuilder<WithArchiveDir> {
    pub fn build(self) -> Result<ReplayConfig> {
        if encoding_for_label(&self.fallback_encoding).is_none() {
            return Err(anyhow!(
                "Unknown fallback encoding '{}'",
                self.fallback_encoding
            ));
        }
        Ok(ReplayConfig {
            archive_dirs: self.archive_dirs,
            output_mode: self.output_mode,
            fallback_encoding: self.fallback_encoding,
            charset_sniff_bytes: self.charset_sniff_bytes,
        })
    }
}
