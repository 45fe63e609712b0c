//! Integration tests for the HTTP manifest provider.

mod common;

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use clipforged::provider::HttpManifestProvider;
use clipforged_core::config::DownloadConfig;
use clipforged_core::{Error, StreamKind};
use clipforged_pipeline::{CancellationToken, ManifestProvider, ProgressSender};
use common::{MockStream, MockVideo};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn resolves_id_and_lists_absolute_stream_urls() {
    let video = MockVideo::start(
        "abc123",
        "Example",
        vec![
            MockStream::new("video", "mp4", 1080, b"VIDEO"),
            MockStream::new("audio", "m4a", 128_000, b"AUDIO"),
        ],
    )
    .await;
    let provider = video.provider();

    let handle = provider.resolve("abc123").await.unwrap();
    assert_eq!(handle.id, "abc123");
    assert_eq!(handle.title.as_deref(), Some("Example"));
    assert_eq!(handle.manifest_url, video.manifest_url());

    let streams = provider.list_streams(&handle).await.unwrap();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].kind, StreamKind::Video);
    assert_eq!(streams[1].quality, 128_000);
    for stream in &streams {
        assert!(stream.url.starts_with(&video.server.uri()));
        assert!(stream.url.contains("/streams/"));
    }
}

#[tokio::test]
async fn listing_streams_reuses_the_resolved_manifest() {
    let video = MockVideo::start(
        "once",
        "Once",
        vec![MockStream::new("muxed", "mp4", 720, b"MUXED")],
    )
    .await;
    let provider = video.provider();

    let handle = provider.resolve("once").await.unwrap();
    let streams = provider.list_streams(&handle).await.unwrap();
    assert_eq!(streams.len(), 1);

    let manifest_hits = video
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/manifests/once.json")
        .count();
    assert_eq!(manifest_hits, 1);
}

#[tokio::test]
async fn foreign_handle_fetches_its_manifest() {
    let video = MockVideo::start(
        "elsewhere",
        "Elsewhere",
        vec![MockStream::new("video", "mp4", 1080, b"VIDEO")],
    )
    .await;
    let handle = video.provider().resolve("elsewhere").await.unwrap();

    // A second provider has not resolved this handle itself.
    let streams = video.provider().list_streams(&handle).await.unwrap();
    assert_eq!(streams.len(), 1);
    assert!(streams[0].url.starts_with(&video.server.uri()));
}

#[tokio::test]
async fn download_writes_body_and_reports_progress() {
    let body = vec![7u8; 64 * 1024];
    let video = MockVideo::start(
        "dl",
        "Download",
        vec![MockStream::new("muxed", "mp4", 720, &body)],
    )
    .await;
    let provider = video.provider();
    let handle = provider.resolve("dl").await.unwrap();
    let streams = provider.list_streams(&handle).await.unwrap();

    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();
    let sender = ProgressSender::new(move |pct, step| {
        sink.lock().unwrap().push((pct, step.to_string()));
    });

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("muxed.mp4");
    provider
        .download(
            &streams[0],
            &dest,
            sender.step("download muxed"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), body);
    let reports = reports.lock().unwrap();
    assert!(!reports.is_empty());
    assert!(reports.iter().all(|(_, step)| step == "download muxed"));
    assert_eq!(reports.last().unwrap().0, 100.0);
}

#[tokio::test]
async fn non_success_stream_is_a_download_failure() {
    let video = MockVideo::start(
        "gone",
        "Gone",
        vec![MockStream::new("video", "mp4", 1080, b"").with_status(403)],
    )
    .await;
    let provider = video.provider();
    let handle = provider.resolve("gone").await.unwrap();
    let streams = provider.list_streams(&handle).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let err = provider
        .download(
            &streams[0],
            &dir.path().join("video.mp4"),
            ProgressSender::noop().step("download video"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_matches!(err, Error::Download { ref stream, ref message } if stream == "video" && message.contains("403"));
}

#[tokio::test]
async fn cancelled_token_stops_download() {
    let video = MockVideo::start(
        "stop",
        "Stop",
        vec![MockStream::new("audio", "m4a", 128_000, b"AUDIO")],
    )
    .await;
    let provider = video.provider();
    let handle = provider.resolve("stop").await.unwrap();
    let streams = provider.list_streams(&handle).await.unwrap();

    let token = CancellationToken::new();
    token.cancel();

    let dir = tempfile::tempdir().unwrap();
    let err = provider
        .download(
            &streams[0],
            &dir.path().join("audio.m4a"),
            ProgressSender::noop().step("download audio"),
            &token,
        )
        .await
        .unwrap_err();
    assert_matches!(err, Error::Cancelled);
}

#[tokio::test]
async fn missing_manifest_is_a_manifest_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifests/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = HttpManifestProvider::new(&DownloadConfig {
        base_url: Some(format!("{}/manifests", server.uri())),
        ..DownloadConfig::default()
    })
    .unwrap();

    assert_matches!(provider.resolve("missing").await, Err(Error::Manifest(ref m)) if m.contains("404"));
}

#[tokio::test]
async fn malformed_manifest_is_a_manifest_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifests/broken.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"streams\": 5}"))
        .mount(&server)
        .await;

    let provider = HttpManifestProvider::new(&DownloadConfig {
        base_url: Some(format!("{}/manifests", server.uri())),
        ..DownloadConfig::default()
    })
    .unwrap();

    assert_matches!(provider.resolve("broken").await, Err(Error::Manifest(_)));
}
