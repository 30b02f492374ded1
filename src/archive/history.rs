//! Archive entries and the per-path capture history.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured metadata loaded from a `.archivalData` sidecar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to a capture log, relative to the capture's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_data_path: Option<String>,
    /// Any further keys in the sidecar, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuxiliaryMetadata {
    /// Take a sidecar object as-is. A known key holding the wrong JSON type
    /// is dropped on its own; every other key survives in `extra`.
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        Self {
            description: take_string(&mut object, "description"),
            capture_data_path: take_string(&mut object, "captureDataPath"),
            extra: object,
        }
    }
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.remove(key)? {
        Value::String(value) => Some(value),
        Value::Null => None,
        other => {
            log::warn!("Dropping sidecar field '{key}': expected a string, found {other}");
            None
        }
    }
}

/// One historical record of a logical path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    /// Site-relative path of the capture file; `None` marks a tombstone.
    pub physical_path: Option<String>,
    pub capture_date: DateTime<Utc>,
    pub tag: Option<String>,
    pub extension: String,
    pub original_name: String,
    pub modify_time: DateTime<Utc>,
    pub file_size: u64,
    pub auxiliary_metadata: Option<AuxiliaryMetadata>,
}

impl ArchiveEntry {
    #[inline]
    pub fn is_tombstone(&self) -> bool {
        self.physical_path.is_none()
    }

    /// `originalName.ext`, as the file was named on the live site.
    pub fn display_name(&self) -> String {
        if self.extension.is_empty() {
            self.original_name.clone()
        } else {
            format!("{}.{}", self.original_name, self.extension)
        }
    }
}

/// Logical path to capture entries, newest first.
#[derive(Debug, Clone, Default)]
pub struct ArchiveHistory {
    entries: IndexMap<String, Vec<ArchiveEntry>>,
}

impl ArchiveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; call [`ArchiveHistory::finalize`] once all are in.
    pub fn insert(&mut self, logical_path: String, entry: ArchiveEntry) {
        self.entries.entry(logical_path).or_default().push(entry);
    }

    /// Sort every history by capture date, newest first.
    ///
    /// The sort is stable, so entries sharing a date keep walk order.
    pub fn finalize(&mut self) {
        for (path, list) in self.entries.iter_mut() {
            list.sort_by(|a, b| b.capture_date.cmp(&a.capture_date));
            for pair in list.windows(2) {
                if pair[0].capture_date == pair[1].capture_date && pair[0].tag == pair[1].tag {
                    log::warn!(
                        "Ambiguous captures for '{}' on {}: {:?} and {:?}",
                        path,
                        pair[0].capture_date,
                        pair[0].physical_path,
                        pair[1].physical_path
                    );
                }
            }
        }
    }

    pub fn get(&self, logical_path: &str) -> Option<&[ArchiveEntry]> {
        self.entries.get(logical_path).map(Vec::as_slice)
    }

    /// Position and entry of the newest capture dated at or before `as_of`.
    pub fn nearest(
        &self,
        logical_path: &str,
        as_of: DateTime<Utc>,
    ) -> Option<(usize, &ArchiveEntry)> {
        self.get(logical_path)?
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.capture_date <= as_of)
    }

    /// Physical path in effect at `as_of`.
    ///
    /// Only the nearest-past entry is consulted: when it is a tombstone the
    /// resource is gone, even if older captures exist.
    pub fn resolve(&self, logical_path: &str, as_of: DateTime<Utc>) -> Option<&str> {
        self.nearest(logical_path, as_of)
            .and_then(|(_, entry)| entry.physical_path.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ArchiveEntry])> {
        self.entries
            .iter()
            .map(|(path, list)| (path.as_str(), list.as_slice()))
    }

    /// Number of logical paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
