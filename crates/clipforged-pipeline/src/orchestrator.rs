//! Orchestrator: probe, select, download, merge, trim, clean up.
//!
//! Steps run strictly in order on one task. Downloads are sequential (muxed
//! alone, or video then audio). Every intermediate file lives in a
//! run-scoped [`Workspace`] that is removed on success, failure and
//! cancellation alike.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clipforged_av::actions::{self, MergePlan};
use clipforged_av::tools::{self, ToolConfig};
use clipforged_av::Workspace;
use clipforged_core::{
    Error, Result, SelectionResult, StreamCandidate, TrimWindow, VideoHandle,
};
use tokio_util::sync::CancellationToken;

use crate::context::ProgressSender;
use crate::provider::ManifestProvider;
use crate::selector::StreamSelector;
use crate::trim::TrimPlanner;

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// URL or identifier understood by the provider.
    pub source: String,
    /// Destination file; owned by the caller after success.
    pub output: PathBuf,
    /// Raw start time (`MM:SS` or `HH:MM:SS`).
    pub start: Option<String>,
    /// Raw end time (`MM:SS` or `HH:MM:SS`).
    pub end: Option<String>,
}

impl FetchRequest {
    pub fn new(source: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            start: None,
            end: None,
        }
    }

    /// Builder: request a trim window.
    pub fn with_window(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// What happened to the trim step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimStatus {
    /// No usable window was given.
    NotRequested,
    /// The output was cut to this window.
    Applied(TrimWindow),
    /// Trimming failed; the untrimmed output was kept.
    Failed(String),
}

/// Terminal result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The final output file.
    pub output: PathBuf,
    pub video: VideoHandle,
    pub selection: SelectionResult,
    pub trim: TrimStatus,
}

impl PipelineOutcome {
    /// A warning to show the user, if the run succeeded with one.
    pub fn warning(&self) -> Option<String> {
        match &self.trim {
            TrimStatus::Failed(reason) => Some(format!(
                "trimming failed, keeping the untrimmed file: {reason}"
            )),
            TrimStatus::NotRequested | TrimStatus::Applied(_) => None,
        }
    }
}

/// Sequences one fetch from probe to final file.
pub struct Orchestrator {
    provider: Arc<dyn ManifestProvider>,
    tool: ToolConfig,
    selector: StreamSelector,
    planner: TrimPlanner,
    cancellation: CancellationToken,
    progress: Arc<ProgressSender>,
}

impl Orchestrator {
    /// Create an orchestrator with a fresh cancellation token and no
    /// progress reporting.
    pub fn new(provider: Arc<dyn ManifestProvider>, tool: ToolConfig) -> Self {
        Self {
            provider,
            tool,
            selector: StreamSelector::new(),
            planner: TrimPlanner::new(),
            cancellation: CancellationToken::new(),
            progress: Arc::new(ProgressSender::noop()),
        }
    }

    /// Builder: attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builder: attach a progress sender.
    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    /// The token observed by every download step.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Run the whole pipeline for `request`.
    ///
    /// # Errors
    ///
    /// Fails with the first fatal error: [`Error::ToolUnavailable`],
    /// [`Error::InvalidTrimWindow`], [`Error::Manifest`],
    /// [`Error::NoSuitableStream`], [`Error::Download`],
    /// [`Error::Cancelled`] or [`Error::MergeFailure`]. A failed trim is not
    /// an error; see [`PipelineOutcome::warning`].
    pub async fn run(&self, request: &FetchRequest) -> Result<PipelineOutcome> {
        tools::require_available(&self.tool).await?;

        let window = self
            .planner
            .plan(request.start.as_deref(), request.end.as_deref())?;

        let video = self.provider.resolve(&request.source).await?;
        tracing::info!(
            "resolved {} ({})",
            video.id,
            video.title.as_deref().unwrap_or("untitled")
        );

        let candidates = self.provider.list_streams(&video).await?;
        tracing::debug!("{} stream candidates", candidates.len());
        let selection = self.selector.select(&candidates)?;

        let workspace = Workspace::new(&request.output)?;

        if let Err(e) = self.assemble(&workspace, &selection).await {
            if e.is_cancelled() {
                tracing::warn!("cancelled; removing intermediate files");
            }
            workspace.close();
            return Err(e);
        }

        let trim = match window {
            Some(window) => self.trim(&workspace, window).await,
            None => TrimStatus::NotRequested,
        };

        workspace.close();
        self.progress.send(100.0, "done");

        Ok(PipelineOutcome {
            output: request.output.clone(),
            video,
            selection,
            trim,
        })
    }

    /// Download the selection and leave the playable file at the output path.
    async fn assemble(&self, workspace: &Workspace, selection: &SelectionResult) -> Result<()> {
        match selection {
            SelectionResult::Muxed(stream) => {
                let staged = workspace.temp_file(&format!("muxed.{}", stream.extension()));
                if let Err(e) = self.download("download muxed", stream, &staged).await {
                    workspace.remove(&staged);
                    return Err(e);
                }
                workspace.promote(&staged)?;
            }
            SelectionResult::Split { video, audio } => {
                let video_path = workspace.temp_file(&format!("video.{}", video.extension()));
                let audio_path = workspace.temp_file(&format!("audio.{}", audio.extension()));

                let downloaded = match self.download("download video", video, &video_path).await {
                    Ok(()) => self.download("download audio", audio, &audio_path).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = downloaded {
                    workspace.remove(&video_path);
                    workspace.remove(&audio_path);
                    return Err(e);
                }

                let merged_path = workspace.temp_file(&merged_name(workspace.output()));
                let plan = MergePlan::decide(audio, &video_path, &audio_path, &merged_path);

                self.progress.send(0.0, "merge");
                let merged = actions::merge(&self.tool, &plan).await;

                workspace.remove(&video_path);
                workspace.remove(&audio_path);

                if let Err(e) = merged {
                    workspace.remove(&merged_path);
                    return Err(e);
                }
                workspace.promote(&merged_path)?;
                self.progress.send(100.0, "merge");
            }
        }
        Ok(())
    }

    /// Fetch one stream, honouring the cancellation token before and after.
    async fn download(&self, step: &str, stream: &StreamCandidate, dest: &Path) -> Result<()> {
        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tracing::info!("{step}: {stream}");
        self.provider
            .download(stream, dest, self.progress.step(step), &self.cancellation)
            .await
            .map_err(|e| {
                if self.cancellation.is_cancelled() {
                    Error::Cancelled
                } else {
                    e
                }
            })?;

        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    async fn trim(&self, workspace: &Workspace, window: TrimWindow) -> TrimStatus {
        self.progress.send(0.0, "trim");
        match actions::trim(&self.tool, workspace, workspace.output(), &window).await {
            Ok(_) => {
                self.progress.send(100.0, "trim");
                TrimStatus::Applied(window)
            }
            Err(e) => {
                tracing::warn!("{e}; keeping untrimmed {}", workspace.output().display());
                TrimStatus::Failed(e.to_string())
            }
        }
    }
}

/// `merged.<ext>` so ffmpeg picks the output's muxer.
fn merged_name(output: &Path) -> String {
    match output.extension() {
        Some(ext) => format!("merged.{}", ext.to_string_lossy()),
        None => "merged.mp4".to_string(),
    }
}
