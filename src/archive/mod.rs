//! Versioned archive index.
//!
//! Each site directory holds a manifest plus dated capture files. The index
//! maps every logical path to its capture history, newest first, and answers
//! which capture (if any) was in effect at a given moment.

pub mod errors;
pub mod filename;
pub mod history;
pub mod index;
pub mod listing;
pub mod registry;
pub mod settings;

pub use errors::{ArchiveError, ArchiveResult};
pub use filename::{CaptureName, parse_capture_filename};
pub use history::{ArchiveEntry, ArchiveHistory, AuxiliaryMetadata};
pub use index::build_site_history;
pub use listing::{ListingEntry, directory_listing, format_file_size, format_utc};
pub use registry::{
    ArchiveRegistry, SiteArchive, as_of_for_version, build_archive_index, resolve_capture,
};
pub use settings::{SiteManifest, UrlRewrites, VersionEntry, VersionSettings, merge_settings};
