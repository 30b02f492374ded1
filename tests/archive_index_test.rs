//! Archive index construction and capture resolution

use chrono::{TimeZone, Utc};
use kodegen_tools_archive_replay::archive::{ArchiveError, ArchiveRegistry, as_of_for_version};
use serde_json::json;

mod common;

use common::{ArchiveFixture, example_manifest};

#[test]
fn test_registry_loads_sites_sorted_by_title() {
    let fixture = ArchiveFixture::new().unwrap();
    fixture.site("zeta", &example_manifest("Acme Widgets")).unwrap();
    fixture.site("alpha", &example_manifest("Zoo Online")).unwrap();
    fixture.bare_dir("scratch").unwrap();

    let registry = fixture.registry().unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.site("scratch").is_none());
    assert_eq!(
        registry.sites(),
        vec![("Acme Widgets", "zeta"), ("Zoo Online", "alpha")]
    );
}

#[test]
fn test_duplicate_site_across_roots_is_fatal() {
    let first = ArchiveFixture::new().unwrap();
    let second = ArchiveFixture::new().unwrap();
    first.site("example", &example_manifest("One")).unwrap();
    second.site("example", &example_manifest("Two")).unwrap();

    let err = ArchiveRegistry::build(&[first.root(), second.root()]).unwrap_err();
    assert!(matches!(err, ArchiveError::DuplicateSite { ref site, .. } if site == "example"));
    assert!(err.is_fatal_at_startup());
}

#[test]
fn test_malformed_manifest_is_fatal() {
    let fixture = ArchiveFixture::new().unwrap();
    fixture.file("broken", ".versiondata.json", b"{ not json").unwrap();

    let err = fixture.registry().unwrap_err();
    assert!(matches!(err, ArchiveError::Manifest { .. }));
}

#[test]
fn test_missing_root_is_an_io_error() {
    let fixture = ArchiveFixture::new().unwrap();
    let missing = fixture.root().join("does-not-exist");

    let err = ArchiveRegistry::build(&[missing]).unwrap_err();
    assert!(matches!(err, ArchiveError::Io { .. }));
}

#[test]
fn test_history_is_newest_first_per_logical_path() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();
    let site = registry.site("example").unwrap();

    let index = site.history.get("index.html").unwrap();
    let dates: Vec<_> = index.iter().map(|e| e.capture_date).collect();
    assert_eq!(
        dates,
        vec![
            Utc.with_ymd_and_hms(2001, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
        ]
    );

    let story = site.history.get("news/story.html").unwrap();
    assert!(story[0].is_tombstone());
    assert_eq!(story[1].physical_path.as_deref(), Some("news/story.20000301.html"));
}

#[test]
fn test_resolution_follows_the_as_of_date() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();
    let site = registry.site("example").unwrap();

    let at = |label: &str| as_of_for_version(label).unwrap();

    assert_eq!(site.resolve_capture("index.html", at("1999-12-31")), None);
    assert_eq!(
        site.resolve_capture("index.html", at("2000-01-01")),
        Some("index.20000101.html")
    );
    assert_eq!(
        site.resolve_capture("index.html", at("2001-05-31")),
        Some("index.20000101.html")
    );
    // Version dates cover the whole day.
    assert_eq!(
        site.resolve_capture("index.html", at("2001-06-01")),
        Some("index.20010601.html")
    );
    assert_eq!(site.resolve_capture("news/story.html", at("2000-05-01")), None);
    assert_eq!(site.resolve_capture("never/existed.html", at("2001-06-01")), None);
}

#[test]
fn test_undated_captures_apply_to_every_version() {
    let fixture = ArchiveFixture::new().unwrap();
    fixture.site("plain", &example_manifest("Plain")).unwrap();
    fixture.file("plain", "about.html", b"about").unwrap();
    fixture.file("plain", ".hidden/secret.20000101.html", b"x").unwrap();
    fixture.file("plain", "README", b"no extension").unwrap();

    let registry = fixture.registry().unwrap();
    let site = registry.site("plain").unwrap();

    assert_eq!(
        site.resolve_capture("about.html", as_of_for_version("1990-01-01").unwrap()),
        Some("about.html")
    );
    assert!(site.history.get(".hidden/secret.html").is_none());
    assert!(site.history.get("README").is_none());
}

#[test]
fn test_invalid_tag_is_skipped_and_sidecars_attach() {
    let fixture = ArchiveFixture::new().unwrap();
    fixture.site("meta", &example_manifest("Meta")).unwrap();
    fixture.file("meta", "logo.20000101.gif", b"GIF89a").unwrap();
    fixture.file("meta", "logo.20000201.invalid.gif", b"junk").unwrap();
    fixture
        .file(
            "meta",
            ".archivalData/logo.20000101.gif.json",
            br#"{"description": "Recovered from a mirror", "source": "mirror"}"#,
        )
        .unwrap();

    let registry = fixture.registry().unwrap();
    let history = registry.site("meta").unwrap().history.get("logo.gif").unwrap();

    assert_eq!(history.len(), 1);
    let meta = history[0].auxiliary_metadata.as_ref().unwrap();
    assert_eq!(meta.description.as_deref(), Some("Recovered from a mirror"));
    assert_eq!(meta.extra.get("source"), Some(&json!("mirror")));
}

#[test]
fn test_version_settings_merge_overrides() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();
    let site = registry.site("example").unwrap();

    let (base, _) = site.version_settings("2000-06-01").unwrap();
    assert_eq!(base.language, None);
    assert_eq!(base.encoding.as_deref(), Some("windows-1252"));

    let (later, _) = site.version_settings("2001-06-01").unwrap();
    assert_eq!(later.language.as_deref(), Some("en"));
    assert_eq!(later.default_page, "index.html");
    assert_eq!(later.url_rewrites.base_origin, "http://www.example.com");

    let err = site.version_settings("1999-01-01").unwrap_err();
    assert!(matches!(err, ArchiveError::UnknownVersion(_)));
}

#[test]
fn test_version_labels_must_be_dates() {
    assert!(as_of_for_version("2001-06-01").is_ok());
    assert!(matches!(
        as_of_for_version("latest"),
        Err(ArchiveError::InvalidVersionLabel(_))
    ));
    assert!(as_of_for_version("2001-13-01").is_err());
}
