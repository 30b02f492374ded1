//! End-to-end tests for the replay facade over an on-disk archive

use kodegen_tools_archive_replay::OutputMode;
use kodegen_tools_archive_replay::replay::{
    ArchiveFlags, ReplayBody, ReplayError, ReplayOptions, ReplayRequest, list_directory, replay,
};

mod common;

fn options() -> ReplayOptions {
    ReplayOptions::default()
}

/// A request against the example site on 2000-06-01.
fn june_2000(path: &str) -> ReplayRequest {
    ReplayRequest::new("example", "2000-06-01", path)
}

#[tokio::test]
async fn test_html_is_rewritten_for_the_version_date() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let response = replay(&registry, &ReplayRequest::new("example", "2001-06-01", ""), &options())
        .await
        .unwrap();

    assert_eq!(response.content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(
        response.text().unwrap(),
        "<html lang=\"en\"><head><meta charset=\"utf-8\">\r\n\
         <script src=\"lib/menu.js\"></script></head>\
         <body><img src=\"new/logo.gif\">café</body></html>"
    );
}

#[tokio::test]
async fn test_older_version_serves_older_capture() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let response = replay(&registry, &june_2000("/"), &options())
        .await
        .unwrap();

    assert_eq!(
        response.text().unwrap(),
        "<html><body><a href=\"news/\">News 2000</a></body></html>"
    );
}

#[tokio::test]
async fn test_tombstone_hides_removed_page() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let before = ReplayRequest::new("example", "2000-04-01", "news/story.html");
    let after = ReplayRequest::new("example", "2000-06-01", "news/story.html");

    // 2000-04-01 is not a configured version, so resolve through the registry directly.
    let site = registry.site("example").unwrap();
    let as_of = kodegen_tools_archive_replay::archive::as_of_for_version("2000-04-01").unwrap();
    assert_eq!(
        site.resolve_capture(&before.path, as_of),
        Some("news/story.20000301.html")
    );

    let err = replay(&registry, &after, &options()).await.unwrap_err();
    assert!(matches!(err, ReplayError::NotFound { .. }));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_unknown_site_and_version_errors() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let err = replay(&registry, &ReplayRequest::new("nope", "2000-06-01", ""), &options())
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::UnknownSite(_)));

    let err = replay(&registry, &ReplayRequest::new("example", "1999-01-01", ""), &options())
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::UnknownVersion(_)));
    assert_eq!(err.status_code(), 404);

    let err = replay(&registry, &ReplayRequest::new("example", "latest", ""), &options())
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::InvalidVersion(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_raw_and_tokenize_flags() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let raw = ReplayRequest::new("example", "2001-06-01", "index.html")
        .with_flags(ArchiveFlags::parse("raw"));
    let response = replay(&registry, &raw, &options()).await.unwrap();
    assert_eq!(response.content_type.as_deref(), Some("text/html"));
    match response.body {
        ReplayBody::Bytes(bytes) => assert!(bytes.ends_with(b"caf\xE9</body></html>")),
        other => panic!("expected raw bytes, got {other:?}"),
    }

    let tokenized = ReplayRequest::new("example", "2001-06-01", "index.html")
        .with_flags(ArchiveFlags::parse("tokenize"));
    let response = replay(&registry, &tokenized, &options()).await.unwrap();
    let text = response.text().unwrap();
    assert!(text.contains("<meta charset=\"iso-8859-1\">"));
    assert!(text.contains("<img src=\"/old/logo.gif\">café"));
}

#[tokio::test]
async fn test_server_page_sidecar_short_circuits() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let response = replay(&registry, &june_2000("data.asp"), &options())
        .await
        .unwrap();
    assert_eq!(response.content_type.as_deref(), Some("image/png"));
    assert_eq!(response.body, ReplayBody::Bytes(b"\x89PNG".to_vec()));

    let response = replay(&registry, &june_2000("page.asp"), &options())
        .await
        .unwrap();
    assert_eq!(response.text(), Some("<a href=\"news/\">n</a>"));
}

#[tokio::test]
async fn test_tags_and_inline_scripts_share_output_mode() {
    let fixture = common::example_archive().unwrap();
    fixture
        .file(
            "example",
            "promo.20000101.html",
            b"<img src=\"/img/a.gif\"><script>var u = '/img/a.gif';</script>",
        )
        .unwrap();
    let registry = fixture.registry().unwrap();

    let response = replay(&registry, &june_2000("promo.html"), &options())
        .await
        .unwrap();
    assert_eq!(
        response.text(),
        Some("<img src=\"img/a.gif\"><script>var u = 'img/a.gif';</script>")
    );

    let absolute = ReplayOptions {
        output_mode: OutputMode::Absolute,
        ..options()
    };
    let response = replay(&registry, &june_2000("promo.html"), &absolute)
        .await
        .unwrap();
    assert_eq!(
        response.text(),
        Some(
            "<img src=\"/example/2000-06-01/img/a.gif\">\
             <script>var u = '/example/2000-06-01/img/a.gif';</script>"
        )
    );
}

#[tokio::test]
async fn test_text_scripts_and_passthrough() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let response = replay(&registry, &june_2000("notes.txt"), &options())
        .await
        .unwrap();
    assert_eq!(response.content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(response.text(), Some("café"));

    let response = replay(&registry, &june_2000("lib/menu.js"), &options())
        .await
        .unwrap();
    assert_eq!(
        response.content_type.as_deref(),
        Some("application/javascript; charset=utf-8")
    );
    assert_eq!(
        response.text(),
        Some(
            "var home = '/example/2000-06-01/index.html'; \
             var img = '/example/2000-06-01/img/a.gif';"
        )
    );

    let response = replay(&registry, &june_2000("img/a.gif"), &options())
        .await
        .unwrap();
    assert_eq!(response.content_type, None);
    match response.body {
        ReplayBody::File(path) => assert!(path.ends_with("img/a.20000101.gif")),
        other => panic!("expected passthrough, got {other:?}"),
    }
}

#[tokio::test]
async fn test_directory_listing_rows() {
    let fixture = common::example_archive().unwrap();
    let registry = fixture.registry().unwrap();

    let rows = list_directory(&registry, "example", "2000-06-01", "").unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(&names[..3], &["img/", "lib/", "news/"]);
    assert!(names.contains(&"index.html"));
    assert!(names.contains(&"notes.txt"));

    let rows = list_directory(&registry, "example", "2000-06-01", "news/").unwrap();
    assert_eq!(rows[0].name, "Parent Directory");
    let index = rows.iter().find(|r| r.name == "index.html").unwrap();
    assert_eq!(index.first_date, "2000-01-01 00:00");
    assert_eq!(index.status, "Original");

    let err = list_directory(&registry, "example", "2000-06-01", "missing").unwrap_err();
    assert_eq!(err.status_code(), 404);
}
