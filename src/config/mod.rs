//! Configuration module for archive replay
//!
//! This module provides the `ReplayConfig` struct and its type-safe builder
//! for configuring where archives live and how documents are rewritten.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{ReplayConfigBuilder, WithArchiveDir};
pub use methods::archive_dirs_from;
pub use types::ReplayConfig;
