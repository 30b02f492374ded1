pub mod archive;
pub mod config;
pub mod content_processor;
pub mod html_tokenizer;
pub mod link_rewriter;
pub mod replay;
pub mod script_rewriter;
pub mod utils;

pub use archive::{
    ArchiveEntry, ArchiveError, ArchiveHistory, ArchiveRegistry, SiteArchive, VersionSettings,
    build_archive_index, resolve_capture,
};
pub use config::ReplayConfig;
pub use content_processor::render_document;
pub use html_tokenizer::{Token, serialize, tokenize};
pub use link_rewriter::{Classification, OutputMode, resolve_url};
pub use replay::{ReplayError, ReplayRequest, ReplayResponse, replay};
pub use script_rewriter::rewrite_script;
