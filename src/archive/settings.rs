//! Site manifest model and per-version settings merge.
//!
//! The manifest is the `.versiondata.json` file at a site's root. Version
//! entries carry a deep-partial override merged over the global settings:
//! object-valued keys merge recursively, everything else replaces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ArchiveError, ArchiveResult};

/// Settings in effect when serving one version of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSettings {
    /// Page served for an empty path or a trailing `/`.
    pub default_page: String,
    /// Document encoding used when no charset is declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Value written to `<html lang>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub url_rewrites: UrlRewrites,
}

/// How URLs found in archived documents are relocated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRewrites {
    /// Origin of the live site, e.g. `http://www.example.com`.
    #[serde(default)]
    pub base_origin: String,
    /// Path prefix under which the site was published, e.g. `/archive/`.
    #[serde(default)]
    pub base_pathname: String,
    /// Prefix remaps; the longest case-insensitive match wins.
    #[serde(default, rename = "paths")]
    pub path_remaps: IndexMap<String, String>,
}

/// One named snapshot configuration of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Deep-partial override of the global settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    /// Logical path aliases specific to this version.
    #[serde(default)]
    pub paths: IndexMap<String, String>,
}

/// Contents of a site's manifest file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteManifest {
    pub title: String,
    #[serde(default)]
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_style: Option<String>,
    pub settings: VersionSettings,
    #[serde(default)]
    pub versions: IndexMap<String, VersionEntry>,
}

/// Recursively merge `overlay` into `base`.
///
/// Object values merge key by key; scalars, arrays and `null` replace.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) if value.is_object() => deep_merge(existing, value),
                    _ => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Merge a version entry over the site's global settings.
///
/// Returns the effective settings and the version's path aliases.
pub fn merge_settings(
    version: &str,
    global: &VersionSettings,
    entry: &VersionEntry,
) -> ArchiveResult<(VersionSettings, IndexMap<String, String>)> {
    let settings = match &entry.settings {
        None => global.clone(),
        Some(overlay) => {
            let mut merged = serde_json::to_value(global).map_err(|source| {
                ArchiveError::Settings {
                    version: version.to_string(),
                    source,
                }
            })?;
            deep_merge(&mut merged, overlay);
            serde_json::from_value(merged).map_err(|source| ArchiveError::Settings {
                version: version.to_string(),
                source,
            })?
        }
    };
    Ok((settings, entry.paths.clone()))
}
