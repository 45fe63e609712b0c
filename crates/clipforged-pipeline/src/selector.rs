//! Deterministic stream selection.
//!
//! Selection is an explicit, ordered chain of filter-then-best steps:
//!
//! 1. best muxed mp4 stream, if any exists;
//! 2. otherwise the best mp4 video stream, and
//! 3. the best mp4/m4a audio stream, falling back to the best audio stream
//!    in any container.
//!
//! "Best" is the highest `quality`; ties go to whichever candidate the
//! provider listed first.

use clipforged_core::{
    Error, Result, SelectionResult, StreamCandidate, StreamKind, MP4_AUDIO_CONTAINERS,
};

/// Container required for muxed and video streams.
const MP4: &str = "mp4";

/// Picks a muxed stream or a (video, audio) pair from a candidate list.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamSelector;

impl StreamSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select from the full candidate list of a resolved video.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuitableStream`] if there is no muxed mp4 stream
    /// and either the video or the audio half is missing.
    pub fn select(&self, candidates: &[StreamCandidate]) -> Result<SelectionResult> {
        let muxed = best(candidates, |c| {
            c.kind == StreamKind::Muxed && c.has_container(MP4)
        });
        if let Some(muxed) = muxed {
            tracing::debug!("selected muxed stream: {muxed}");
            return Ok(SelectionResult::Muxed(muxed.clone()));
        }

        let video = best(candidates, |c| c.kind == StreamKind::Video && c.has_container(MP4));

        let audio = best(candidates, |c| {
            c.kind == StreamKind::Audio && c.has_container_in(MP4_AUDIO_CONTAINERS)
        })
        .or_else(|| best(candidates, |c| c.kind == StreamKind::Audio));

        match (video, audio) {
            (Some(video), Some(audio)) => {
                tracing::debug!("selected video stream: {video}");
                tracing::debug!("selected audio stream: {audio}");
                Ok(SelectionResult::Split {
                    video: video.clone(),
                    audio: audio.clone(),
                })
            }
            (None, Some(_)) => Err(Error::NoSuitableStream(format!(
                "no muxed or video mp4 stream among {} candidates",
                candidates.len()
            ))),
            (Some(_), None) => Err(Error::NoSuitableStream(format!(
                "no muxed mp4 or audio stream among {} candidates",
                candidates.len()
            ))),
            (None, None) => Err(Error::NoSuitableStream(format!(
                "no usable stream among {} candidates",
                candidates.len()
            ))),
        }
    }
}

/// Highest-quality candidate matching `keep`; the first one wins a tie.
fn best<F>(candidates: &[StreamCandidate], keep: F) -> Option<&StreamCandidate>
where
    F: Fn(&StreamCandidate) -> bool,
{
    let mut chosen: Option<&StreamCandidate> = None;
    for candidate in candidates.iter().filter(|c| keep(*c)) {
        match chosen {
            Some(current) if candidate.quality <= current.quality => {}
            _ => chosen = Some(candidate),
        }
    }
    chosen
}
