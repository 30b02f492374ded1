//! Request-level decisions for serving archived content.

use std::path::{Path, PathBuf};

use log::{debug, trace};

use super::errors::{ReplayError, ReplayResult};
use super::types::{ReplayBody, ReplayOptions, ReplayRequest, ReplayResponse};
use crate::archive::{
    ArchiveError, ArchiveRegistry, ListingEntry, SiteArchive, VersionSettings, as_of_for_version,
    directory_listing,
};
use crate::content_processor::{decode_with_label, render_document_with, tokenize_document};
use crate::link_rewriter::{OutputMode, RewriteContext};
use crate::script_rewriter::rewrite_script;
use crate::utils::{HTML_EXTENSIONS, SERVER_PAGE_EXTENSIONS};

const HTML_UTF8: &str = "text/html; charset=utf-8";
const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const JAVASCRIPT_UTF8: &str = "application/javascript; charset=utf-8";

/// Extensions served as `text/html` in raw mode.
const RAW_HTML_EXTENSIONS: &[&str] = &["html", "htm", "asp", "aspx"];

/// Logical path a request addresses, with the default page filled in.
pub fn requested_path(path: &str, default_page: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        default_page.to_string()
    } else if path.ends_with('/') {
        format!("{path}{default_page}")
    } else {
        path.to_string()
    }
}

/// Archive root path under which a site version is served.
pub fn root_path(site: &str, version: &str) -> String {
    format!("/{site}/{version}/")
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

async fn read_capture(path: &Path) -> ReplayResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `content-type` from a `<path>.headers.json` sidecar; absent on any failure.
async fn sidecar_content_type(path: &Path) -> Option<String> {
    let bytes = tokio::fs::read(path).await.ok()?;
    let headers: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).ok()?;
    headers
        .get("content-type")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Site and effective settings for a request's site and version.
fn site_and_settings<'r>(
    registry: &'r ArchiveRegistry,
    site_id: &str,
    version: &str,
) -> ReplayResult<(&'r SiteArchive, VersionSettings)> {
    let site = registry
        .site(site_id)
        .ok_or_else(|| ReplayError::UnknownSite(site_id.to_string()))?;
    let (settings, _aliases) = site.version_settings(version).map_err(|e| match e {
        ArchiveError::UnknownVersion(v) => ReplayError::UnknownVersion(v),
        other => ReplayError::Archive(other),
    })?;
    Ok((site, settings))
}

fn version_date(version: &str) -> ReplayResult<chrono::DateTime<chrono::Utc>> {
    as_of_for_version(version).map_err(|_| ReplayError::InvalidVersion(version.to_string()))
}

/// Answer one replay request.
pub async fn replay(
    registry: &ArchiveRegistry,
    request: &ReplayRequest,
    options: &ReplayOptions,
) -> ReplayResult<ReplayResponse> {
    let (site, settings) = site_and_settings(registry, &request.site, &request.version)?;
    let as_of = version_date(&request.version)?;
    let path = requested_path(&request.path, &settings.default_page);

    let physical = site
        .resolve_capture(&path, as_of)
        .ok_or_else(|| ReplayError::NotFound {
            site: site.id.clone(),
            path: path.clone(),
        })?;
    let file_path = site.capture_file_path(physical);
    let ext = lowercase_extension(&file_path);
    let root = root_path(&site.id, &request.version);
    debug!(
        "Replaying {}/{} as {} ({})",
        site.id,
        path,
        physical,
        request.version
    );

    if request.flags.raw {
        let bytes = read_capture(&file_path).await?;
        let content_type = RAW_HTML_EXTENSIONS
            .contains(&ext.as_str())
            .then_some("text/html");
        return Ok(ReplayResponse::new(content_type, ReplayBody::Bytes(bytes)));
    }

    if request.flags.tokenize {
        let bytes = read_capture(&file_path).await?;
        let text = tokenize_document(&bytes, &settings, &options.decode);
        return Ok(ReplayResponse::new(Some(HTML_UTF8), ReplayBody::Text(text)));
    }

    if HTML_EXTENSIONS.contains(&ext.as_str()) {
        let bytes = read_capture(&file_path).await?;
        if SERVER_PAGE_EXTENSIONS.contains(&ext.as_str()) {
            let sidecar = site.file_root.join(format!("{path}.headers.json"));
            if let Some(content_type) = sidecar_content_type(&sidecar).await {
                trace!("{} served as {content_type} per sidecar", path);
                return Ok(ReplayResponse {
                    content_type: Some(content_type),
                    body: ReplayBody::Bytes(bytes),
                });
            }
        }
        // Tag attributes and inline scripts share one mode.
        let ctx = RewriteContext::new(&path, &settings, &root, options.output_mode);
        let html = render_document_with(&bytes, &ctx, &options.decode);
        return Ok(ReplayResponse::new(Some(HTML_UTF8), ReplayBody::Text(html)));
    }

    if ext == "txt" {
        if let Some(encoding) = settings.encoding.as_deref() {
            let bytes = read_capture(&file_path).await?;
            let text = decode_with_label(&bytes, encoding);
            return Ok(ReplayResponse::new(Some(TEXT_UTF8), ReplayBody::Text(text)));
        }
    }

    if ext == "js" {
        let bytes = read_capture(&file_path).await?;
        let encoding = settings
            .encoding
            .as_deref()
            .unwrap_or(&options.decode.fallback_encoding);
        let code = decode_with_label(&bytes, encoding);
        let origin = request
            .referer
            .as_deref()
            .map(|r| r.trim_start_matches('/'))
            .filter(|r| !r.is_empty())
            .unwrap_or(&settings.default_page);
        let js = rewrite_script(&code, origin, &settings, &root, OutputMode::Absolute);
        return Ok(ReplayResponse::new(Some(JAVASCRIPT_UTF8), ReplayBody::Text(js)));
    }

    Ok(ReplayResponse::new(None, ReplayBody::File(file_path)))
}

/// Directory listing of `dir` for one site version.
pub fn list_directory(
    registry: &ArchiveRegistry,
    site_id: &str,
    version: &str,
    dir: &str,
) -> ReplayResult<Vec<ListingEntry>> {
    let (site, _) = site_and_settings(registry, site_id, version)?;
    let as_of = version_date(version)?;
    directory_listing(&site.history, dir, as_of).ok_or_else(|| ReplayError::NotFound {
        site: site.id.clone(),
        path: dir.to_string(),
    })
}

/// Physical file a request would be served from, without reading it.
pub fn capture_path(registry: &ArchiveRegistry, request: &ReplayRequest) -> ReplayResult<PathBuf> {
    let (site, settings) = site_and_settings(registry, &request.site, &request.version)?;
    let as_of = version_date(&request.version)?;
    let path = requested_path(&request.path, &settings.default_page);
    site.resolve_capture(&path, as_of)
        .map(|physical| site.capture_file_path(physical))
        .ok_or(ReplayError::NotFound {
            site: site.id.clone(),
            path,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_path_fills_default_page() {
        assert_eq!(requested_path("", "index.html"), "index.html");
        assert_eq!(requested_path("/", "index.html"), "index.html");
        assert_eq!(requested_path("docs/", "default.htm"), "docs/default.htm");
        assert_eq!(requested_path("docs/a.html", "index.html"), "docs/a.html");
    }

    #[test]
    fn root_path_wraps_site_and_version() {
        assert_eq!(root_path("example", "2001-06-01"), "/example/2001-06-01/");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(lowercase_extension(Path::new("a/B.HTM")), "htm");
        assert_eq!(lowercase_extension(Path::new("README")), "");
    }
}
