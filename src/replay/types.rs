//! Request and response values of the replay facade

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::content_processor::DecodeOptions;
use crate::link_rewriter::OutputMode;

/// Debug switches carried by a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFlags {
    /// Serve the capture bytes unmodified.
    pub raw: bool,
    /// Serve decode, tokenize and serialize output without rewriting.
    pub tokenize: bool,
}

impl ArchiveFlags {
    /// Parse a comma-separated flag list such as `raw,tokenize`.
    ///
    /// Unknown names are ignored.
    pub fn parse(list: &str) -> Self {
        let mut flags = Self::default();
        for flag in list.split(',').map(str::trim) {
            match flag {
                "raw" => flags.raw = true,
                "tokenize" => flags.tokenize = true,
                _ => {}
            }
        }
        flags
    }
}

/// One request for archived content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    pub site: String,
    /// Version label, `YYYY-MM-DD`.
    pub version: String,
    /// Site-relative path; empty or ending in `/` selects the default page.
    pub path: String,
    pub flags: ArchiveFlags,
    /// Site-relative path of the page that loaded a script, when known.
    pub referer: Option<String>,
}

impl ReplayRequest {
    pub fn new(
        site: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            version: version.into(),
            path: path.into(),
            flags: ArchiveFlags::default(),
            referer: None,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ArchiveFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// Payload of a replay response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayBody {
    /// Capture bytes, unmodified.
    Bytes(Vec<u8>),
    /// Rewritten or decoded UTF-8 text.
    Text(String),
    /// Capture to be streamed from disk as-is.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResponse {
    /// `None` leaves the content type to the server's own detection.
    pub content_type: Option<String>,
    pub body: ReplayBody,
}

impl ReplayResponse {
    pub(crate) fn new(content_type: Option<&str>, body: ReplayBody) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            body,
        }
    }

    /// Body as text, if it is text.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ReplayBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Rewrite settings shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOptions {
    pub decode: DecodeOptions,
    /// Output mode for HTML documents and their inline scripts. Served `.js`
    /// files always use absolute URLs.
    pub output_mode: OutputMode,
}
