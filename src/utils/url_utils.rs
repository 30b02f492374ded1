//! Path and URL helpers shared by the index and the rewriters.

/// Split a site-relative path into its non-empty `/`-separated segments.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Lowercased file extension of a URL's path, ignoring query and fragment.
///
/// Returns `None` when the last path segment has no dot.
///
/// # Examples
/// ```
/// # use kodegen_tools_archive_replay::utils::extension_of;
/// assert_eq!(extension_of("/img/Logo.GIF?v=2"), Some("gif".to_string()));
/// assert_eq!(extension_of("http://example.com/dir/"), None);
/// ```
pub fn extension_of(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Build the logical history key `relativeDir/name.ext` (no leading slash).
pub fn logical_key(relative_dir: &str, name: &str, ext: &str) -> String {
    let file = if ext.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{ext}")
    };
    if relative_dir.is_empty() {
        file
    } else {
        format!("{relative_dir}/{file}")
    }
}

/// True for `http://` and `https://` URLs.
#[inline]
pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_skip_empty_parts() {
        assert_eq!(path_segments("/docs//api/page.html"), vec!["docs", "api", "page.html"]);
        assert!(path_segments("").is_empty());
    }

    #[test]
    fn logical_key_joins_dir_and_name() {
        assert_eq!(logical_key("", "index", "html"), "index.html");
        assert_eq!(logical_key("a/b", "logo", "gif"), "a/b/logo.gif");
    }
}
