//! The [`ManifestProvider`] trait: the transport boundary of the pipeline.
//!
//! A provider resolves a source into a [`VideoHandle`], lists its streams,
//! and fetches stream bytes to disk. The pipeline never retries a provider
//! call; any error ends the run.

use std::path::Path;

use async_trait::async_trait;
use clipforged_core::{Result, StreamCandidate, VideoHandle};
use tokio_util::sync::CancellationToken;

use crate::context::StepProgress;

/// Source of manifests and stream bytes for a remote service.
#[async_trait]
pub trait ManifestProvider: Send + Sync {
    /// Resolve a URL or identifier into a video handle.
    async fn resolve(&self, source: &str) -> Result<VideoHandle>;

    /// List every stream the service offers for `video`, in provider order.
    async fn list_streams(&self, video: &VideoHandle) -> Result<Vec<StreamCandidate>>;

    /// Write the bytes of `stream` to `dest`.
    ///
    /// Implementations report progress through `progress` and must check
    /// `cancel` between chunks, returning
    /// [`Error::Cancelled`](clipforged_core::Error::Cancelled) once it fires.
    /// A partially written `dest` may be left behind; the caller removes it.
    async fn download(
        &self,
        stream: &StreamCandidate,
        dest: &Path,
        progress: StepProgress<'_>,
        cancel: &CancellationToken,
    ) -> Result<()>;
}
