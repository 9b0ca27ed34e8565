//! Unit tests for pack fetching, parsing and caching.
#![expect(clippy::expect_used, reason = "tests panic on broken fixtures")]

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn transport() -> Arc<MemoryTransport> {
    Arc::new(MemoryTransport::new())
}

fn fetcher(transport: &Arc<MemoryTransport>, options: FetchOptions) -> PackFetcher {
    let shared: Arc<dyn PackTransport> = transport.clone();
    PackFetcher::with_options(shared, options)
}

#[rstest]
#[tokio::test]
async fn caches_successful_loads(transport: Arc<MemoryTransport>) {
    transport.insert("mem://a.json", r#"{"routing": {"x": 1}}"#);
    let fetcher = fetcher(&transport, FetchOptions::default());

    let first = fetcher.load("mem://a.json").await.expect("first load");
    let second = fetcher.load("mem://a.json").await.expect("cached load");

    assert_eq!(*first, json!({"routing": {"x": 1}}));
    assert!(Arc::ptr_eq(&first, &second), "second load should hit the cache");
    assert_eq!(transport.request_count(), 1);
}

#[rstest]
#[tokio::test]
async fn invalidation_forces_refetch(transport: Arc<MemoryTransport>) {
    transport.insert("mem://a.json", "{}");
    let fetcher = fetcher(&transport, FetchOptions::default());
    fetcher.load("mem://a.json").await.expect("load");

    assert!(fetcher.invalidate("mem://a.json"));
    assert!(!fetcher.invalidate("mem://a.json"));
    fetcher.load("mem://a.json").await.expect("reload");
    fetcher.clear();
    assert!(fetcher.cached("mem://a.json").is_none());
    assert_eq!(transport.request_count(), 2);
}

#[rstest]
#[tokio::test]
async fn oversized_bodies_are_rejected_before_parsing(transport: Arc<MemoryTransport>) {
    // Invalid JSON proves the parser never runs.
    transport.insert("mem://big.json", vec![b'x'; 64]);
    let fetcher = fetcher(
        &transport,
        FetchOptions {
            max_bytes: 16,
            ..FetchOptions::default()
        },
    );
    let err = fetcher.load("mem://big.json").await.expect_err("too large");
    assert!(matches!(&*err, PackError::TooLarge { size: 64, limit: 16, .. }));
    assert!(fetcher.cached("mem://big.json").is_none());
}

#[rstest]
#[tokio::test]
async fn slow_transports_time_out(transport: Arc<MemoryTransport>) {
    transport.insert_delayed("mem://slow.json", "{}", Duration::from_secs(5));
    let fetcher = fetcher(
        &transport,
        FetchOptions {
            timeout: Duration::from_millis(20),
            ..FetchOptions::default()
        },
    );
    let err = fetcher.load("mem://slow.json").await.expect_err("timeout");
    assert!(matches!(&*err, PackError::Timeout { .. }));
}

#[rstest]
#[tokio::test]
async fn failures_are_not_cached(transport: Arc<MemoryTransport>) {
    transport.insert_failure("mem://flaky.json", "503");
    let fetcher = fetcher(&transport, FetchOptions::default());
    assert!(fetcher.load("mem://flaky.json").await.is_err());

    transport.insert("mem://flaky.json", "{}");
    assert!(fetcher.load("mem://flaky.json").await.is_ok());
}

#[rstest]
#[tokio::test]
async fn load_all_settles_every_url(transport: Arc<MemoryTransport>) {
    transport.insert_delayed("mem://a.json", "{}", Duration::from_millis(30));
    transport.insert("mem://b.json", "[1]");
    let fetcher = fetcher(&transport, FetchOptions::default());
    let urls = vec![
        "mem://a.json".to_owned(),
        "mem://b.json".to_owned(),
        "mem://c.json".to_owned(),
    ];

    let outcomes = fetcher.load_all(&urls).await;

    let summary: Vec<(&str, bool)> = outcomes
        .iter()
        .map(|(url, outcome)| (url.as_str(), outcome.is_ok()))
        .collect();
    assert_eq!(
        summary,
        [("mem://a.json", true), ("mem://b.json", false), ("mem://c.json", false)]
    );
}

#[rstest]
#[case("mem://p.json", r#"{"anchors": {"a": [1, 2]}}"#)]
#[cfg_attr(feature = "yaml", case("mem://p.yaml", "anchors:\n  a: [1, 2]\n"))]
#[cfg_attr(feature = "toml", case("mem://p.toml", "[anchors]\na = [1, 2]\n"))]
fn parses_by_extension(#[case] url: &str, #[case] body: &str) {
    let value = parse_pack_by_format(url, body.as_bytes()).expect("parse pack");
    assert_eq!(value, json!({"anchors": {"a": [1, 2]}}));
}

#[rstest]
#[case("mem://bad.json", "{not json")]
#[case("mem://list.json", "[1, 2]")]
#[case("mem://bytes.json", "\u{fffd}")]
fn rejects_malformed_bodies(#[case] url: &str, #[case] body: &str) {
    assert!(parse_pack_by_format(url, body.as_bytes()).is_err());
}

#[rstest]
fn file_transport_resolves_relative_paths() {
    let transport = FileTransport::with_root("/packs");
    assert_eq!(transport.resolve("file://lcars.yaml"), "/packs/lcars.yaml");
    assert_eq!(transport.resolve("/abs/core.json"), "/abs/core.json");
    assert_eq!(FileTransport::new().resolve("file:///tmp/a.json"), "/tmp/a.json");
}

#[rstest]
#[tokio::test]
async fn file_transport_reads_from_disk() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("pack.json");
    std::fs::write(&path, r#"{"routing": {"bus": "main"}}"#).expect("write pack");
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("tempdir path is UTF-8");
    let fetcher = PackFetcher::new(Arc::new(FileTransport::with_root(root)));

    let pack = fetcher.load("pack.json").await.expect("load from disk");
    assert_eq!(pack["routing"]["bus"], json!("main"));
    assert!(fetcher.load("missing.json").await.is_err());
}

#[rstest]
#[tokio::test]
async fn file_transport_rejects_oversized_files_by_length() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("big.json"), vec![b'x'; 64]).expect("write pack");
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("tempdir path is UTF-8");
    let transport = FileTransport::with_root(root);

    let err = transport.fetch("big.json", 16).await.expect_err("too large");
    assert!(matches!(&*err, PackError::TooLarge { size: 64, limit: 16, .. }));
    let body = transport.fetch("big.json", 64).await.expect("within limit");
    assert_eq!(body.len(), 64);
}
