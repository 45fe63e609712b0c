//! Merge separate video and audio streams into one file.
//!
//! Video is always stream-copied. Audio is copied when its container is
//! mp4-compatible, otherwise it is transcoded to AAC with A/V sync
//! correction. The decision depends only on the audio container.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clipforged_core::{Error, Result, StreamCandidate, MP4_AUDIO_CONTAINERS};

use crate::tools::ToolConfig;

/// Codec used when audio must be re-encoded.
pub const TRANSCODE_AUDIO_CODEC: &str = "aac";
/// Fixed bitrate used when audio must be re-encoded.
pub const TRANSCODE_AUDIO_BITRATE: &str = "192k";

/// How a selected video/audio pair is combined. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    video_path: PathBuf,
    audio_path: PathBuf,
    output_path: PathBuf,
    audio_transcode: bool,
}

impl MergePlan {
    /// Decide copy vs. transcode for `audio` and build the plan.
    pub fn decide(
        audio: &StreamCandidate,
        video_path: impl Into<PathBuf>,
        audio_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            video_path: video_path.into(),
            audio_path: audio_path.into(),
            output_path: output_path.into(),
            audio_transcode: needs_audio_transcode(audio),
        }
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn audio_transcode(&self) -> bool {
        self.audio_transcode
    }

    /// The ffmpeg argument vector for this plan.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            self.video_path.clone().into(),
            "-i".into(),
            self.audio_path.clone().into(),
            "-c:v".into(),
            "copy".into(),
        ];

        if self.audio_transcode {
            args.extend(
                [
                    "-c:a",
                    TRANSCODE_AUDIO_CODEC,
                    "-b:a",
                    TRANSCODE_AUDIO_BITRATE,
                    "-async",
                    "1",
                    "-vsync",
                    "1",
                ]
                .map(OsString::from),
            );
        } else {
            args.extend(["-c:a", "copy"].map(OsString::from));
        }

        args.push("-y".into());
        args.push(self.output_path.clone().into());
        args
    }
}

/// Audio outside `{mp4, m4a}` cannot be copied into the mp4 output.
pub fn needs_audio_transcode(audio: &StreamCandidate) -> bool {
    !audio.has_container_in(MP4_AUDIO_CONTAINERS)
}

/// Run the merge described by `plan`.
///
/// # Errors
///
/// Returns [`Error::MergeFailure`] if ffmpeg exits non-zero, or
/// [`Error::Tool`] if it cannot be run at all.
pub async fn merge(tool: &ToolConfig, plan: &MergePlan) -> Result<()> {
    tracing::info!(
        "merging {} + {} -> {} ({})",
        plan.video_path.display(),
        plan.audio_path.display(),
        plan.output_path.display(),
        if plan.audio_transcode {
            "transcoding audio"
        } else {
            "stream copy"
        }
    );

    let output = tool.command().args(plan.args()).execute().await?;

    if !output.success() {
        let tail = output.stderr_tail(5);
        tracing::error!("{} merge failed: {tail}", tool.name);
        return Err(Error::MergeFailure(format!(
            "{} exited with {}: {tail}",
            tool.name, output.status
        )));
    }

    tracing::info!("merge complete: {}", plan.output_path.display());
    Ok(())
}
