//! Directory listing data for a site as it stood at one date.
//!
//! Produces the rows an index page renders; markup is left to the caller.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::history::{ArchiveEntry, ArchiveHistory};
use crate::utils::REMOVED_TAG;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    pub name: String,
    pub href: String,
    pub icon: String,
    pub icon_type: String,
    pub size: String,
    pub last_modified: String,
    pub first_date: String,
    pub last_date: String,
    pub description: String,
    pub status: String,
}

impl ListingEntry {
    fn parent() -> Self {
        Self {
            name: "Parent Directory".to_string(),
            href: "../_files".to_string(),
            icon: "back.gif".to_string(),
            icon_type: "PARENTDIR".to_string(),
            size: "-".to_string(),
            last_modified: String::new(),
            first_date: String::new(),
            last_date: String::new(),
            description: String::new(),
            status: String::new(),
        }
    }

    fn directory(name: &str) -> Self {
        Self {
            name: format!("{name}/"),
            href: format!("{name}/_files"),
            icon: "dir.gif".to_string(),
            icon_type: "DIR".to_string(),
            size: "-".to_string(),
            last_modified: String::new(),
            first_date: String::new(),
            last_date: String::new(),
            description: String::new(),
            status: String::new(),
        }
    }

    fn file(entry: &ArchiveEntry, next_date: Option<DateTime<Utc>>) -> Self {
        let name = entry.display_name();
        let meta = entry.auxiliary_metadata.as_ref();
        let description = meta
            .and_then(|m| m.description.as_deref())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let capture_data = meta
            .and_then(|m| m.capture_data_path.as_deref())
            .filter(|p| !p.is_empty())
            .map(|p| format!("See <a href=\"{p}\">capture data</a>."));

        Self {
            href: name.clone(),
            icon: icon_for(&entry.extension).to_string(),
            icon_type: icon_type_for(&entry.extension).to_string(),
            size: format_file_size(entry.file_size),
            last_modified: format_utc(entry.modify_time),
            first_date: if entry.capture_date == DateTime::UNIX_EPOCH {
                "-".to_string()
            } else {
                format_utc(entry.capture_date)
            },
            last_date: next_date.map(format_utc).unwrap_or_else(|| "-".to_string()),
            description: [description, capture_data]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
            status: entry
                .tag
                .as_deref()
                .map(capitalize)
                .unwrap_or_else(|| "Original".to_string()),
            name,
        }
    }
}

/// Icon category for a file extension.
pub fn icon_type_for(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" | "asp" | "aspx" | "php" | "idc" | "txt" | "css" | "js" | "json" | "xml" => {
            "TXT"
        }
        "jpg" | "jpeg" | "png" | "gif" | "svg" => "IMG",
        "mp3" | "wav" | "mid" | "midi" => "SND",
        "avi" => "VID",
        "pdf" => "PDF",
        "doc" => "DOC",
        _ => "BIN",
    }
}

pub fn icon_for(ext: &str) -> &'static str {
    match icon_type_for(ext) {
        "TXT" => "text.gif",
        "IMG" => "image2.gif",
        "SND" => "sound2.gif",
        "VID" => "video.gif",
        "PDF" => "pdf.gif",
        "DOC" => "doc.gif",
        _ => "binary.gif",
    }
}

/// `123`, `1.2K`, `3.4M`, `5.6G`.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    match size {
        s if s < KB => s.to_string(),
        s if s < MB => format!("{:.1}K", s as f64 / KB as f64),
        s if s < GB => format!("{:.1}M", s as f64 / MB as f64),
        s => format!("{:.1}G", s as f64 / GB as f64),
    }
}

/// `YYYY-MM-DD HH:MM` in UTC.
pub fn format_utc(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Listing rows for `request_dir` at `as_of`, or `None` when nothing is there.
///
/// Rows are ordered parent link, subdirectories, then files, each group by name.
pub fn directory_listing(
    history: &ArchiveHistory,
    request_dir: &str,
    as_of: DateTime<Utc>,
) -> Option<Vec<ListingEntry>> {
    let prefix = normalize_dir(request_dir);

    let mut files = Vec::new();
    let mut dirs = BTreeSet::new();

    for (path, entries) in history.iter() {
        let Some(rest) = path.strip_prefix(prefix.as_str()) else {
            continue;
        };
        let Some((index, entry)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.capture_date <= as_of)
        else {
            continue;
        };

        match rest.split_once('/') {
            None => {
                if entry.is_tombstone() && entry.tag.as_deref() == Some(REMOVED_TAG) {
                    continue;
                }
                let next_date = index.checked_sub(1).map(|i| entries[i].capture_date);
                files.push(ListingEntry::file(entry, next_date));
            }
            Some((dir, _)) => {
                if !entry.is_tombstone() && entry.tag.as_deref() != Some(REMOVED_TAG) {
                    dirs.insert(dir.to_string());
                }
            }
        }
    }

    if files.is_empty() && dirs.is_empty() {
        return None;
    }

    files.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut rows = Vec::with_capacity(files.len() + dirs.len() + 1);
    if !prefix.is_empty() {
        rows.push(ListingEntry::parent());
    }
    rows.extend(dirs.iter().map(|d| ListingEntry::directory(d)));
    rows.extend(files);
    Some(rows)
}

/// `""` for the site root, otherwise `dir/sub/` with no leading slash.
fn normalize_dir(request_dir: &str) -> String {
    let trimmed = request_dir.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}
