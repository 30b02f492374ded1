//! Replay facade for an HTTP layer
//!
//! Maps a `(site, version, path)` request onto the archive: resolves the
//! capture in effect at the version's date and decides how it is served
//! (rewritten document, rewritten script, decoded text, raw bytes, or a file
//! passthrough). No HTTP types are involved; [`ReplayError::status_code`]
//! gives the status an outer server should use.

pub mod errors;
pub mod handler;
pub mod types;

pub use errors::{ReplayError, ReplayResult};
pub use handler::{capture_path, list_directory, replay, requested_path, root_path};
pub use types::{ArchiveFlags, ReplayBody, ReplayOptions, ReplayRequest, ReplayResponse};
