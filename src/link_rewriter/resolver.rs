//! Relocation of a single URL found in an archived document.
//!
//! URLs are first made site-root relative, then remapped, then either
//! rooted at the archive path of the current version or expressed relative
//! to the page being served.

use serde::{Deserialize, Serialize};

use crate::archive::VersionSettings;
use crate::utils::{
    is_http_url, path_segments, slice_from, starts_with_ignore_ascii_case,
    strip_prefix_ignore_ascii_case,
};

const PARENT_DIR: &str = "../";

/// How rewritten site-local URLs are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Relative to the directory of the page being served.
    #[default]
    Relative,
    /// Prefixed with the archive root path of the site and version.
    Absolute,
}

/// Whether a URL addresses an archived resource or a hyperlink target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Same-site resource such as an image or stylesheet.
    Local,
    /// Navigation target that may leave the site.
    External,
}

/// Everything URL resolution needs besides the URL itself.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    /// Site-relative path of the document being served, e.g. `docs/index.html`.
    pub requested_path: &'a str,
    pub settings: &'a VersionSettings,
    /// Archive root of the site and version, e.g. `/example/2001-06-01/`.
    pub root_path: &'a str,
    pub mode: OutputMode,
}

impl<'a> RewriteContext<'a> {
    pub fn new(
        requested_path: &'a str,
        settings: &'a VersionSettings,
        root_path: &'a str,
        mode: OutputMode,
    ) -> Self {
        Self {
            requested_path,
            settings,
            root_path,
            mode,
        }
    }

    /// Same context with a different output mode.
    pub fn with_mode(self, mode: OutputMode) -> Self {
        Self { mode, ..self }
    }

    pub fn resolve(&self, url: &str, classification: Classification) -> String {
        resolve_url(
            url,
            self.requested_path,
            self.settings,
            self.root_path,
            self.mode,
            classification,
        )
    }
}

/// Number of `../` found at 3-byte aligned offsets anywhere in `url`.
fn parent_dir_count(url: &str) -> usize {
    url.as_bytes()
        .chunks(PARENT_DIR.len())
        .filter(|chunk| *chunk == PARENT_DIR.as_bytes())
        .count()
}

/// Host of `base_origin` without scheme or `www.`.
fn bare_host(base_origin: &str) -> &str {
    let host = base_origin.strip_prefix("http://").unwrap_or(base_origin);
    let host = host.strip_prefix("https://").unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host)
}

/// Resolve one URL for output in a page served at `requested_path`.
///
/// Pure: no I/O, and the same inputs always produce the same output.
///
/// # Examples
/// ```
/// # use kodegen_tools_archive_replay::archive::{UrlRewrites, VersionSettings};
/// # use kodegen_tools_archive_replay::link_rewriter::{resolve_url, Classification, OutputMode};
/// let settings = VersionSettings {
///     default_page: "index.html".into(),
///     encoding: None,
///     language: None,
///     url_rewrites: UrlRewrites {
///         base_origin: "http://www.example.com".into(),
///         base_pathname: "/archive/".into(),
///         path_remaps: Default::default(),
///     },
/// };
/// let url = resolve_url(
///     "../images/logo.gif",
///     "docs/api/page.html",
///     &settings,
///     "/example/2001-01-01/",
///     OutputMode::Relative,
///     Classification::Local,
/// );
/// assert_eq!(url, "../images/logo.gif");
/// ```
pub fn resolve_url(
    url: &str,
    requested_path: &str,
    settings: &VersionSettings,
    root_path: &str,
    mode: OutputMode,
    classification: Classification,
) -> String {
    let rewrites = &settings.url_rewrites;
    let mut url = url
        .strip_prefix(rewrites.base_origin.as_str())
        .unwrap_or(url)
        .to_string();

    let request_segments = path_segments(requested_path);
    let request_depth = request_segments.len().saturating_sub(1);
    let request_dirs: Vec<String> = request_segments[..request_depth]
        .iter()
        .map(|s| s.to_ascii_lowercase())
        .collect();

    if url.starts_with(PARENT_DIR) {
        let up = parent_dir_count(&url);
        let rest = slice_from(&url, PARENT_DIR.len() * up).to_string();
        url = if up == request_depth {
            rest
        } else if up < request_depth {
            format!("{}/{rest}", request_segments[..request_depth - up].join("/"))
        } else {
            // Escapes the addressable root: rebase under the published pathname.
            let outside = up - request_depth;
            let base: Vec<&str> = rewrites.base_pathname.split('/').collect();
            let keep = base.len().saturating_sub(outside + 1);
            format!("{}/{rest}", base[..keep].join("/"))
        };
    } else if let Some(rest) = strip_prefix_ignore_ascii_case(&url, &rewrites.base_pathname) {
        url = rest.to_string();
    } else if !is_http_url(&url) && !url.starts_with('/') && request_depth > 0 {
        url = format!("{}/{url}", request_segments[..request_depth].join("/"));
    }

    if let Some((from, to)) = longest_remap(&url, settings) {
        url = format!("{to}{}", slice_from(&url, from.len()));
    }

    if is_http_url(&url) {
        return url;
    }

    if url.starts_with('/') && classification == Classification::External {
        if !url.starts_with(root_path) {
            url = format!("{}{url}", rewrites.base_origin);
        }
        return url;
    }

    if url.starts_with('/') {
        url = format!("www.{}{url}", bare_host(&rewrites.base_origin));
    }

    match mode {
        OutputMode::Absolute => format!("{root_path}{url}"),
        OutputMode::Relative => relative_to_request(&url, &request_dirs, settings),
    }
}

/// Longest case-insensitive remap prefix of `url`; the first entry wins ties.
fn longest_remap<'s>(url: &str, settings: &'s VersionSettings) -> Option<(&'s str, &'s str)> {
    let mut best: Option<(&str, &str)> = None;
    for (from, to) in &settings.url_rewrites.path_remaps {
        let longer = best.is_none_or(|(b, _)| from.len() > b.len());
        if !from.is_empty() && longer && starts_with_ignore_ascii_case(url, from) {
            best = Some((from.as_str(), to.as_str()));
        }
    }
    best
}

/// Strip the directories shared with the request and climb out of the rest.
fn relative_to_request(url: &str, request_dirs: &[String], settings: &VersionSettings) -> String {
    let url_segments: Vec<String> = path_segments(url)
        .iter()
        .map(|s| s.to_ascii_lowercase())
        .collect();

    let mut shared = 0;
    let mut shared_len = 0;
    for (req, seg) in request_dirs.iter().zip(url_segments.iter()) {
        if req != seg {
            break;
        }
        shared += 1;
        shared_len += 1 + req.len();
    }

    let mut out = PARENT_DIR.repeat(request_dirs.len() - shared);
    out.push_str(slice_from(url, shared_len));
    if out.is_empty() {
        return settings.default_page.clone();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::UrlRewrites;
    use indexmap::IndexMap;

    const ROOT: &str = "/example/2001-06-01/";

    fn settings(base_pathname: &str, remaps: &[(&str, &str)]) -> VersionSettings {
        VersionSettings {
            default_page: "index.html".to_string(),
            encoding: None,
            language: None,
            url_rewrites: UrlRewrites {
                base_origin: "http://www.example.com".to_string(),
                base_pathname: base_pathname.to_string(),
                path_remaps: remaps
                    .iter()
                    .map(|(f, t)| (f.to_string(), t.to_string()))
                    .collect::<IndexMap<_, _>>(),
            },
        }
    }

    fn relative(url: &str, requested: &str, s: &VersionSettings, class: Classification) -> String {
        resolve_url(url, requested, s, ROOT, OutputMode::Relative, class)
    }

    #[test]
    fn parent_segments_within_site() {
        let s = settings("/archive/", &[]);
        assert_eq!(
            relative("../images/logo.gif", "docs/api/page.html", &s, Classification::Local),
            "../images/logo.gif"
        );
        assert_eq!(
            relative("../../top.html", "docs/api/page.html", &s, Classification::Local),
            "../../top.html"
        );
    }

    #[test]
    fn same_directory_file_stays_bare() {
        let s = settings("/archive/", &[]);
        assert_eq!(relative("logo.gif", "docs/page.html", &s, Classification::Local), "logo.gif");
        assert_eq!(relative("logo.gif", "page.html", &s, Classification::Local), "logo.gif");
    }

    #[test]
    fn parent_segments_escaping_root_rebase_under_pathname() {
        let s = settings("/archive/", &[]);
        // One level too many: `/archive/` loses its last directory.
        let out = resolve_url(
            "../../shared/a.gif",
            "docs/page.html",
            &s,
            ROOT,
            OutputMode::Absolute,
            Classification::Local,
        );
        assert_eq!(out, "/example/2001-06-01/www.example.com/shared/a.gif");
    }

    #[test]
    fn base_origin_and_pathname_are_stripped() {
        let s = settings("/archive/", &[]);
        assert_eq!(
            relative(
                "http://www.example.com/Archive/news/x.html",
                "news/index.html",
                &s,
                Classification::External,
            ),
            "x.html"
        );
    }

    #[test]
    fn remap_applies_before_relocation() {
        let s = settings("/archive/", &[("/old/", "/new/"), ("/old/deeper/", "/deep/")]);
        let out = resolve_url(
            "/old/page.html",
            "index.html",
            &s,
            ROOT,
            OutputMode::Absolute,
            Classification::Local,
        );
        assert_eq!(out, "/example/2001-06-01/www.example.com/new/page.html");
        let out = resolve_url(
            "/OLD/deeper/p.html",
            "index.html",
            &s,
            ROOT,
            OutputMode::Absolute,
            Classification::Local,
        );
        assert_eq!(out, "/example/2001-06-01/www.example.com/deep/p.html");
    }

    #[test]
    fn external_site_rooted_url_gets_origin_back() {
        let s = settings("/archive/", &[]);
        assert_eq!(
            relative("/cgi-bin/search", "index.html", &s, Classification::External),
            "http://www.example.com/cgi-bin/search"
        );
        assert_eq!(
            relative("https://other.org/x", "a/b.html", &s, Classification::External),
            "https://other.org/x"
        );
    }

    #[test]
    fn already_rooted_external_url_is_not_prefixed_twice() {
        let s = settings("/archive/", &[]);
        let once = "/example/2001-06-01/news/index.html";
        assert_eq!(relative(once, "index.html", &s, Classification::External), once);
    }

    #[test]
    fn empty_relative_result_becomes_default_page() {
        let s = settings("/archive/", &[]);
        assert_eq!(relative("/archive/", "index.html", &s, Classification::Local), "index.html");
    }

    #[test]
    fn absolute_mode_prefixes_root_path() {
        let s = settings("/archive/", &[]);
        let out = resolve_url(
            "img/a.gif",
            "docs/page.html",
            &s,
            ROOT,
            OutputMode::Absolute,
            Classification::Local,
        );
        assert_eq!(out, "/example/2001-06-01/docs/img/a.gif");
    }

    #[test]
    fn counts_parent_segments_at_aligned_offsets() {
        assert_eq!(parent_dir_count("../../a"), 2);
        assert_eq!(parent_dir_count("../a/../b"), 1);
        assert_eq!(parent_dir_count("a/b"), 0);
    }
}
