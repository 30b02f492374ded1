//! Test utilities and fixtures for the archive replay test suite

use anyhow::Result;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use kodegen_tools_archive_replay::archive::{ArchiveError, ArchiveRegistry};
use serde_json::{Value, json};
use std::path::PathBuf;

/// An on-disk archive root holding any number of site directories.
pub struct ArchiveFixture {
    temp: TempDir,
}

#[allow(dead_code)]
impl ArchiveFixture {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        temp.child("archives").create_dir_all()?;
        Ok(Self { temp })
    }

    /// Root passed to the registry.
    pub fn root(&self) -> PathBuf {
        self.temp.child("archives").path().to_path_buf()
    }

    /// Create a site directory with the given manifest.
    pub fn site(&self, id: &str, manifest: &Value) -> Result<()> {
        self.temp
            .child(format!("archives/{id}/.versiondata.json"))
            .write_str(&serde_json::to_string_pretty(manifest)?)?;
        Ok(())
    }

    /// Write a file at a site-relative path.
    pub fn file(&self, site: &str, relative: &str, contents: &[u8]) -> Result<()> {
        self.temp
            .child(format!("archives/{site}/{relative}"))
            .write_binary(contents)?;
        Ok(())
    }

    /// Create a directory under the archive root without a manifest.
    pub fn bare_dir(&self, name: &str) -> Result<()> {
        self.temp.child(format!("archives/{name}")).create_dir_all()?;
        Ok(())
    }

    pub fn registry(&self) -> std::result::Result<ArchiveRegistry, ArchiveError> {
        ArchiveRegistry::build(&[self.root()])
    }
}

/// Manifest for a site published at `http://www.example.com/`.
#[allow(dead_code)]
pub fn example_manifest(title: &str) -> Value {
    json!({
        "title": title,
        "originalUrl": "http://www.example.com/",
        "settings": {
            "defaultPage": "index.html",
            "encoding": "windows-1252",
            "urlRewrites": {
                "baseOrigin": "http://www.example.com",
                "basePathname": "/",
                "paths": { "old/": "new/" }
            }
        },
        "versions": {
            "2000-06-01": {},
            "2001-06-01": { "settings": { "language": "en" } },
            "latest": {}
        }
    })
}

/// Standard two-capture site used by most integration tests.
#[allow(dead_code)]
pub fn example_archive() -> Result<ArchiveFixture> {
    let fixture = ArchiveFixture::new()?;
    fixture.site("example", &example_manifest("Example Corp"))?;
    fixture.file(
        "example",
        "index.20000101.html",
        b"<html><body><a href=\"/news/\">News 2000</a></body></html>",
    )?;
    fixture.file(
        "example",
        "index.20010601.html",
        b"<html><head><meta charset=\"iso-8859-1\">\n<script src=\"/lib/menu.js\"></script></head><body><img src=\"/old/logo.gif\">caf\xE9</body></html>",
    )?;
    fixture.file("example", "news/index.20000101.html", b"<p>news</p>")?;
    fixture.file("example", "news/story.20000301.html", b"<p>story</p>")?;
    fixture.file("example", "news/story.20000501.html.meta", b"")?;
    fixture.file("example", "lib/menu.20000101.js", b"var home = '/index.html'; var img = '/img/a.gif';")?;
    fixture.file("example", "img/a.20000101.gif", b"GIF89a")?;
    fixture.file("example", "notes.20000101.txt", b"caf\xE9")?;
    fixture.file("example", "data.20000101.asp", b"\x89PNG")?;
    fixture.file("example", "data.asp.headers.json", br#"{"content-type": "image/png"}"#)?;
    fixture.file("example", "page.20000101.asp", b"<a href=\"/news/\">n</a>")?;
    Ok(fixture)
}
