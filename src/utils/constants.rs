//! Shared constants for archive replay
//!
//! File-layout names and rewrite defaults used across the index, the
//! document pipeline and the replay facade.

/// Per-site manifest holding title, global settings and version records.
pub const SITE_MANIFEST_FILE: &str = ".versiondata.json";

/// Sidecar directory living next to captures.
///
/// Hidden, so the tree walk never indexes it; sidecars are looked up by name.
pub const ARCHIVAL_DATA_DIR: &str = ".archivalData";

/// Suffix marking a tombstone capture (`name.YYYYMMDD.ext.meta`).
pub const TOMBSTONE_SUFFIX: &str = ".meta";

/// Tag value that excludes a capture from the index entirely.
pub const INVALID_TAG: &str = "invalid";

/// Tag value that hides a tombstone from directory listings.
pub const REMOVED_TAG: &str = "removed";

/// Number of leading bytes inspected for a `<meta charset>` declaration.
pub const CHARSET_SNIFF_BYTES: usize = 1024;

/// Encoding used when neither the document nor the version declares one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Environment variable holding the archive root(s).
pub const ARCHIVE_DIR_ENV: &str = "ARCHIVE_DIR";

/// Archive root used when `ARCHIVE_DIR` is unset.
pub const DEFAULT_ARCHIVE_DIR: &str = "archives";

/// Canonical charset declaration inserted by locale normalization.
pub const CANONICAL_CHARSET_META: &str = "<meta charset=\"utf-8\">\r\n";

/// Extensions that mark a script string literal as a local resource.
pub const LOCAL_SCRIPT_RESOURCE_EXTENSIONS: &[&str] =
    &["js", "css", "png", "jpg", "gif", "mid", "wav"];

/// Extensions routed through the document rewrite pipeline.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm", "asp", "aspx", "idc"];

/// Server-side page extensions that may carry a `.headers.json` sidecar.
pub const SERVER_PAGE_EXTENSIONS: &[&str] = &["asp", "aspx", "idc"];

/// Time of day appended to a version label to build its as-of instant.
pub const VERSION_END_OF_DAY: &str = "23:59:59";
