//! Capture discovery: walk one site's tree into an [`ArchiveHistory`].

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use jwalk::{Parallelism, WalkDir};
use serde_json::Value;

use super::errors::{ArchiveError, ArchiveResult};
use super::filename::parse_capture_filename;
use super::history::{ArchiveEntry, ArchiveHistory, AuxiliaryMetadata};
use crate::utils::{ARCHIVAL_DATA_DIR, INVALID_TAG, logical_key};

/// Walk `site_root` and index every capture file beneath it.
///
/// Hidden files and directories are skipped; sidecars under
/// `.archivalData/` are read explicitly for each capture. Filenames that
/// match neither capture pattern are ignored.
pub fn build_site_history(site_root: &Path) -> ArchiveResult<ArchiveHistory> {
    let mut history = ArchiveHistory::new();
    let mut ignored = 0usize;

    let walker = WalkDir::new(site_root)
        .parallelism(Parallelism::Serial)
        .skip_hidden(true)
        .follow_links(false)
        .sort(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e)
                if e.io_error().is_some_and(|io| {
                    io.kind() == std::io::ErrorKind::PermissionDenied
                }) =>
            {
                log::debug!("Skipping unreadable entry under {}: {e}", site_root.display());
                continue;
            }
            Err(e) => {
                return Err(ArchiveError::Walk {
                    path: site_root.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(relative) = relative_slash_path(site_root, &path) else {
            log::debug!("Skipping non UTF-8 path {}", path.display());
            ignored += 1;
            continue;
        };
        let (relative_dir, filename) = match relative.rsplit_once('/') {
            Some((dir, file)) => (dir.to_string(), file.to_string()),
            None => (String::new(), relative.clone()),
        };

        let Some(parsed) = parse_capture_filename(&filename) else {
            log::debug!("Ignoring unrecognized capture filename {relative}");
            ignored += 1;
            continue;
        };
        if !parsed.tombstone && parsed.tag.as_deref() == Some(INVALID_TAG) {
            log::debug!("Skipping capture tagged invalid: {relative}");
            continue;
        }

        let metadata = fs::metadata(&path).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        let modify_time = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::UNIX_EPOCH);

        let capture_dir = path.parent().unwrap_or(site_root);
        let auxiliary_metadata = if parsed.tombstone {
            None
        } else {
            load_auxiliary_metadata(capture_dir, &filename, &parsed.name, &parsed.ext)
        };

        let key = logical_key(&relative_dir, &parsed.name, &parsed.ext);
        history.insert(
            key,
            ArchiveEntry {
                physical_path: (!parsed.tombstone).then(|| relative.clone()),
                capture_date: parsed.capture_date(),
                tag: parsed.tag,
                extension: parsed.ext,
                original_name: parsed.name,
                modify_time,
                file_size: metadata.len(),
                auxiliary_metadata,
            },
        );
    }

    history.finalize();
    log::debug!(
        "Indexed {} logical paths under {} ({} files ignored)",
        history.len(),
        site_root.display(),
        ignored
    );
    Ok(history)
}

/// `path` relative to `root`, joined with `/`.
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

/// Read sidecar metadata for one capture.
///
/// `<filename>.json` wins; otherwise a `<name>.<ext>.archivaldata.csv`
/// capture log yields a description pointing at it. Absence is not an error.
fn load_auxiliary_metadata(
    capture_dir: &Path,
    filename: &str,
    original_name: &str,
    ext: &str,
) -> Option<AuxiliaryMetadata> {
    let sidecar_dir = capture_dir.join(ARCHIVAL_DATA_DIR);

    let json_path = sidecar_dir.join(format!("{filename}.json"));
    if let Ok(raw) = fs::read_to_string(&json_path) {
        return match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(object)) => Some(AuxiliaryMetadata::from_object(object)),
            Ok(_) => {
                log::warn!("Ignoring sidecar {}: not a JSON object", json_path.display());
                None
            }
            Err(e) => {
                log::warn!("Ignoring invalid sidecar {}: {e}", json_path.display());
                None
            }
        };
    }

    let csv_name = format!("{original_name}.{ext}.archivaldata.csv");
    if sidecar_dir.join(&csv_name).is_file() {
        return Some(AuxiliaryMetadata {
            capture_data_path: Some(format!("{ARCHIVAL_DATA_DIR}/{csv_name}")),
            ..Default::default()
        });
    }

    None
}
