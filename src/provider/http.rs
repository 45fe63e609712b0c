//! JSON-manifest provider over HTTP.
//!
//! A source is either an absolute manifest URL or an identifier resolved
//! against `download.base_url` as `<base_url>/<id>.json`. The manifest
//! document looks like:
//!
//! ```json
//! {
//!   "id": "abc123",
//!   "title": "Example",
//!   "streams": [
//!     { "kind": "video", "container": "mp4", "quality": 1080, "url": "v/1080.mp4" },
//!     { "kind": "audio", "container": "m4a", "quality": 128000, "url": "a/128.m4a" }
//!   ]
//! }
//! ```
//!
//! Stream URLs may be relative to the manifest URL. The streams of every
//! resolved manifest are kept, so `list_streams` answers from the same
//! document `resolve` read.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipforged_core::config::DownloadConfig;
use clipforged_core::{Error, Result, StreamCandidate, VideoHandle};
use clipforged_pipeline::{CancellationToken, ManifestProvider, StepProgress};
use dashmap::DashMap;
use futures::StreamExt;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

/// Manifest document served for one video.
#[derive(Debug, Deserialize)]
struct ManifestDocument {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    streams: Vec<StreamCandidate>,
}

/// Fetches manifests and stream bytes with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpManifestProvider {
    client: Client,
    base_url: Option<String>,
    /// Absolute stream lists keyed by manifest URL.
    resolved: Arc<DashMap<String, Vec<StreamCandidate>>>,
}

impl HttpManifestProvider {
    /// Build a provider from the `[download]` configuration section.
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            resolved: Arc::new(DashMap::new()),
        })
    }

    /// The manifest URL a source refers to.
    pub fn manifest_url(&self, source: &str) -> Result<Url> {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            return Url::parse(source)
                .map_err(|e| Error::Manifest(format!("invalid source URL {source}: {e}")));
        }

        if source.is_empty() || source.contains('/') {
            return Err(Error::Manifest(format!(
                "{source:?} is neither a URL nor a video id"
            )));
        }

        let base = self.base_url.as_deref().ok_or_else(|| {
            Error::Manifest(format!(
                "cannot resolve id {source:?}: download.base_url is not configured"
            ))
        })?;
        let joined = format!("{}/{source}.json", base.trim_end_matches('/'));
        Url::parse(&joined).map_err(|e| Error::Manifest(format!("invalid manifest URL {joined}: {e}")))
    }

    async fn fetch_manifest(&self, url: &Url) -> Result<ManifestDocument> {
        tracing::debug!("fetching manifest {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Manifest(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Manifest(format!("{url}: HTTP {status}")));
        }

        response
            .json::<ManifestDocument>()
            .await
            .map_err(|e| Error::Manifest(format!("{url}: malformed manifest: {e}")))
    }
}

#[async_trait]
impl ManifestProvider for HttpManifestProvider {
    async fn resolve(&self, source: &str) -> Result<VideoHandle> {
        let url = self.manifest_url(source)?;
        let manifest = self.fetch_manifest(&url).await?;
        let streams = absolute_streams(&url, manifest.streams)?;

        let manifest_url = url.to_string();
        self.resolved.insert(manifest_url.clone(), streams);
        Ok(VideoHandle {
            id: manifest.id,
            title: manifest.title,
            manifest_url,
        })
    }

    async fn list_streams(&self, video: &VideoHandle) -> Result<Vec<StreamCandidate>> {
        if let Some(streams) = self.resolved.get(&video.manifest_url) {
            return Ok(streams.clone());
        }

        // A handle built elsewhere; read its manifest now.
        let url = Url::parse(&video.manifest_url)
            .map_err(|e| Error::Manifest(format!("invalid manifest URL: {e}")))?;
        let manifest = self.fetch_manifest(&url).await?;
        let streams = absolute_streams(&url, manifest.streams)?;
        self.resolved.insert(video.manifest_url.clone(), streams.clone());
        Ok(streams)
    }

    async fn download(
        &self,
        stream: &StreamCandidate,
        dest: &Path,
        progress: StepProgress<'_>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let label = stream.kind.to_string();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            sent = self.client.get(&stream.url).send() => {
                sent.map_err(|e| Error::download(&label, e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(
                &label,
                format!("HTTP {status} from {}", stream.url),
            ));
        }

        let total = response.content_length();
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::file(dest, e))?;
        let mut body = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                next = body.next() => next,
            };
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| Error::download(&label, e.to_string()))?;

            file.write_all(&chunk)
                .await
                .map_err(|e| Error::file(dest, e))?;
            written += chunk.len() as u64;
            progress.report_bytes(written, total);
        }

        file.flush().await.map_err(|e| Error::file(dest, e))?;
        tracing::debug!("{}: {written} bytes to {}", progress.name(), dest.display());
        Ok(())
    }
}

/// Resolve every stream URL against the manifest it came from.
fn absolute_streams(base: &Url, streams: Vec<StreamCandidate>) -> Result<Vec<StreamCandidate>> {
    streams
        .into_iter()
        .map(|mut stream| {
            let absolute = base
                .join(&stream.url)
                .map_err(|e| Error::Manifest(format!("bad stream URL {:?}: {e}", stream.url)))?;
            stream.url = absolute.to_string();
            Ok(stream)
        })
        .collect()
}
