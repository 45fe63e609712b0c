//! Media-domain types shared by the provider, selector and merge steps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Containers whose audio can be stream-copied into an mp4 output.
pub const MP4_AUDIO_CONTAINERS: &[&str] = &["mp4", "m4a"];

/// What a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Video and audio in one stream.
    Muxed,
    /// Video only.
    Video,
    /// Audio only.
    Audio,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamKind::Muxed => "muxed",
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
        };
        f.write_str(s)
    }
}

/// A downloadable stream advertised by the manifest provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub kind: StreamKind,
    /// Container name as advertised, e.g. `mp4`, `m4a`, `webm`.
    pub container: String,
    /// Height in pixels for muxed/video streams, bitrate for audio streams.
    pub quality: u64,
    /// Locator the provider uses to fetch the stream bytes.
    pub url: String,
}

impl StreamCandidate {
    pub fn new(
        kind: StreamKind,
        container: impl Into<String>,
        quality: u64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            container: container.into(),
            quality,
            url: url.into(),
        }
    }

    /// Case-insensitive container comparison.
    pub fn has_container(&self, name: &str) -> bool {
        self.container.eq_ignore_ascii_case(name)
    }

    /// Whether this stream's container is one of `names`.
    pub fn has_container_in(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has_container(n))
    }

    /// File extension to use when writing this stream to disk.
    pub fn extension(&self) -> String {
        self.container.to_ascii_lowercase()
    }
}

impl fmt::Display for StreamCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.kind {
            StreamKind::Audio => "bps",
            StreamKind::Muxed | StreamKind::Video => "p",
        };
        write!(f, "{} {} {}{}", self.kind, self.container, self.quality, unit)
    }
}

/// Outcome of stream selection: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResult {
    /// A single stream that already carries video and audio.
    Muxed(StreamCandidate),
    /// Separate video and audio streams that must be merged.
    Split {
        video: StreamCandidate,
        audio: StreamCandidate,
    },
}

impl SelectionResult {
    /// Whether a merge step is needed.
    pub fn needs_merge(&self) -> bool {
        matches!(self, SelectionResult::Split { .. })
    }
}

/// A resolved remote video, as returned by the provider's `resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoHandle {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Where the provider fetches the stream list from.
    pub manifest_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_matching_ignores_case() {
        let c = StreamCandidate::new(StreamKind::Audio, "M4A", 128_000, "http://x/a");
        assert!(c.has_container("m4a"));
        assert!(c.has_container_in(MP4_AUDIO_CONTAINERS));
        assert_eq!(c.extension(), "m4a");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&StreamKind::Muxed).unwrap();
        assert_eq!(json, "\"muxed\"");
        let back: StreamKind = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(back, StreamKind::Audio);
    }

    #[test]
    fn candidate_display() {
        let v = StreamCandidate::new(StreamKind::Video, "mp4", 1080, "u");
        assert_eq!(v.to_string(), "video mp4 1080p");
        let a = StreamCandidate::new(StreamKind::Audio, "webm", 160_000, "u");
        assert_eq!(a.to_string(), "audio webm 160000bps");
    }

    #[test]
    fn split_needs_merge() {
        let v = StreamCandidate::new(StreamKind::Video, "mp4", 720, "v");
        let a = StreamCandidate::new(StreamKind::Audio, "m4a", 128_000, "a");
        assert!(SelectionResult::Split {
            video: v.clone(),
            audio: a
        }
        .needs_merge());
        assert!(!SelectionResult::Muxed(v).needs_merge());
    }
}
