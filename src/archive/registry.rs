//! Site registry: every archived site, built once at startup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;

use super::errors::{ArchiveError, ArchiveResult};
use super::history::ArchiveHistory;
use super::index::build_site_history;
use super::settings::{SiteManifest, VersionEntry, VersionSettings, merge_settings};
use crate::utils::{SITE_MANIFEST_FILE, VERSION_END_OF_DAY};

/// One archived website with its manifest and capture history.
#[derive(Debug, Clone)]
pub struct SiteArchive {
    /// Directory name under the archive root.
    pub id: String,
    pub title: String,
    pub original_url: String,
    pub index_style: Option<String>,
    pub settings: VersionSettings,
    pub versions: IndexMap<String, VersionEntry>,
    pub history: ArchiveHistory,
    pub file_root: PathBuf,
}

impl SiteArchive {
    /// Load a site from its directory.
    ///
    /// Returns `Ok(None)` when the directory has no manifest.
    pub fn load(site_root: &Path) -> ArchiveResult<Option<Self>> {
        let manifest_path = site_root.join(SITE_MANIFEST_FILE);
        let raw = match fs::read_to_string(&manifest_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No version data found for site: {}", site_root.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(ArchiveError::Io {
                    path: manifest_path,
                    source,
                });
            }
        };
        let manifest: SiteManifest =
            serde_json::from_str(&raw).map_err(|source| ArchiveError::Manifest {
                path: manifest_path.clone(),
                source,
            })?;

        let id = site_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let history = build_site_history(site_root)?;

        Ok(Some(Self {
            id,
            title: manifest.title,
            original_url: manifest.original_url,
            index_style: manifest.index_style,
            settings: manifest.settings,
            versions: manifest.versions,
            history,
            file_root: site_root.to_path_buf(),
        }))
    }

    /// Effective settings and path aliases for one version label.
    pub fn version_settings(
        &self,
        version: &str,
    ) -> ArchiveResult<(VersionSettings, IndexMap<String, String>)> {
        let entry = self
            .versions
            .get(version)
            .ok_or_else(|| ArchiveError::UnknownVersion(version.to_string()))?;
        merge_settings(version, &self.settings, entry)
    }

    /// Site-relative physical path in effect for `logical_path` at `as_of`.
    pub fn resolve_capture(&self, logical_path: &str, as_of: DateTime<Utc>) -> Option<&str> {
        self.history.resolve(logical_path, as_of)
    }

    /// Absolute filesystem location of a resolved capture.
    pub fn capture_file_path(&self, physical_path: &str) -> PathBuf {
        self.file_root.join(physical_path)
    }
}

/// Free-function form of [`SiteArchive::resolve_capture`].
pub fn resolve_capture<'a>(
    site: &'a SiteArchive,
    logical_path: &str,
    as_of: DateTime<Utc>,
) -> Option<&'a str> {
    site.resolve_capture(logical_path, as_of)
}

/// Moment a version label stands for: the end of that day, UTC.
pub fn as_of_for_version(label: &str) -> ArchiveResult<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .map_err(|_| ArchiveError::InvalidVersionLabel(label.to_string()))?;
    let end_of_day = NaiveTime::parse_from_str(VERSION_END_OF_DAY, "%H:%M:%S")
        .map_err(|_| ArchiveError::InvalidVersionLabel(label.to_string()))?;
    Ok(day.and_time(end_of_day).and_utc())
}

/// Immutable set of sites, keyed by site id.
#[derive(Debug, Clone, Default)]
pub struct ArchiveRegistry {
    sites: IndexMap<String, SiteArchive>,
}

impl ArchiveRegistry {
    /// Load every site directory under each of `roots`.
    ///
    /// Sites without a manifest are skipped with a warning; a site id seen
    /// twice aborts the build.
    pub fn build<P: AsRef<Path>>(roots: &[P]) -> ArchiveResult<Self> {
        let mut registry = Self::default();
        for root in roots {
            let root = root.as_ref();
            for site_root in site_directories(root)? {
                if let Some(site) = SiteArchive::load(&site_root)? {
                    registry.register(site)?;
                }
            }
        }
        log::info!("Archive registry ready with {} sites", registry.len());
        Ok(registry)
    }

    /// Add one site, rejecting duplicate ids.
    pub fn register(&mut self, site: SiteArchive) -> ArchiveResult<()> {
        if let Some(existing) = self.sites.get(&site.id) {
            return Err(ArchiveError::DuplicateSite {
                site: site.id.clone(),
                first: existing.file_root.clone(),
                second: site.file_root,
            });
        }
        log::debug!(
            "Registered site '{}' ({} paths)",
            site.id,
            site.history.len()
        );
        self.sites.insert(site.id.clone(), site);
        Ok(())
    }

    pub fn site(&self, id: &str) -> Option<&SiteArchive> {
        self.sites.get(id)
    }

    /// `(title, id)` pairs sorted by title.
    pub fn sites(&self) -> Vec<(&str, &str)> {
        let mut sites: Vec<(&str, &str)> = self
            .sites
            .values()
            .map(|site| (site.title.as_str(), site.id.as_str()))
            .collect();
        sites.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));
        sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Build a registry from a single archive root.
pub fn build_archive_index(sites_root: &Path) -> ArchiveResult<ArchiveRegistry> {
    ArchiveRegistry::build(&[sites_root])
}

/// Immediate subdirectories of `root`, sorted by name.
fn site_directories(root: &Path) -> ArchiveResult<Vec<PathBuf>> {
    let read_dir = fs::read_dir(root).map_err(|source| ArchiveError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let mut dirs = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| ArchiveError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
