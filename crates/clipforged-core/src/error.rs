//! Unified error type for clipforged.
//!
//! Every pipeline step reports failure through [`Error`]. Each variant is a
//! distinct kind so the orchestrator can choose between cleanup, abort and
//! continue, and the CLI can derive an exit code via [`Error::exit_code`].

use std::path::PathBuf;

/// Unified error type covering all failure modes in clipforged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external tool failed its availability probe.
    #[error("Tool unavailable [{tool}]: {message}")]
    ToolUnavailable {
        /// Name or path of the tool that was probed.
        tool: String,
        /// Why the probe failed.
        message: String,
    },

    /// No usable stream (or stream pair) was found among the candidates.
    #[error("No suitable stream: {0}")]
    NoSuitableStream(String),

    /// A raw time string does not match `MM:SS` or `HH:MM:SS`.
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    /// Both trim bounds are valid but `start` is not before `end`.
    #[error("Invalid trim window: start {start} is not before end {end}")]
    InvalidTrimWindow {
        /// Normalized start timestamp.
        start: String,
        /// Normalized end timestamp.
        end: String,
    },

    /// Resolving the source or listing its streams failed.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// The transport failed while fetching stream bytes.
    #[error("Download failed [{stream}]: {message}")]
    Download {
        /// Which stream was being fetched (e.g. "video", "audio").
        stream: String,
        /// Human-readable error description.
        message: String,
    },

    /// The cooperative cancellation signal was observed.
    #[error("Cancelled")]
    Cancelled,

    /// The merge invocation exited unsuccessfully.
    #[error("Merge failed: {0}")]
    MergeFailure(String),

    /// The trim invocation failed or produced no file.
    #[error("Trim failed: {0}")]
    TrimFailure(String),

    /// An external tool could not be spawned or waited on.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A filesystem operation on a pipeline path failed.
    #[error("File error [{}]: {source}", path.display())]
    File {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Configuration could not be parsed or is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error to the process exit code reported by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidTimeFormat(_) | Error::InvalidTrimWindow { .. } => 2,
            Error::ToolUnavailable { .. } => 3,
            Error::NoSuitableStream(_) => 4,
            Error::Manifest(_) | Error::Download { .. } => 5,
            Error::MergeFailure(_) => 6,
            Error::Cancelled => 130,
            Error::TrimFailure(_)
            | Error::Tool { .. }
            | Error::File { .. }
            | Error::Io { .. }
            | Error::Config(_) => 1,
        }
    }

    /// Whether this error is the cancellation signal rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Convenience constructor for [`Error::ToolUnavailable`].
    pub fn tool_unavailable(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolUnavailable {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Download`].
    pub fn download(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Download {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::File`].
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_unavailable_display() {
        let err = Error::tool_unavailable("ffmpeg", "exit status 127");
        assert_eq!(err.to_string(), "Tool unavailable [ffmpeg]: exit status 127");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_trim_window_display() {
        let err = Error::InvalidTrimWindow {
            start: "00:01:00".into(),
            end: "00:00:30".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid trim window: start 00:01:00 is not before end 00:00:30"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_time_format_display() {
        let err = Error::InvalidTimeFormat("abc".into());
        assert_eq!(err.to_string(), "Invalid time format: \"abc\"");
    }

    #[test]
    fn download_display() {
        let err = Error::download("audio", "HTTP 404");
        assert_eq!(err.to_string(), "Download failed [audio]: HTTP 404");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn cancelled_is_distinct() {
        assert!(Error::Cancelled.is_cancelled());
        assert_eq!(Error::Cancelled.exit_code(), 130);
        assert!(!Error::MergeFailure("exit 1".into()).is_cancelled());
    }

    #[test]
    fn merge_and_trim_codes() {
        assert_eq!(Error::MergeFailure("x".into()).exit_code(), 6);
        assert_eq!(Error::TrimFailure("x".into()).exit_code(), 1);
    }

    #[test]
    fn file_display_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::file("/tmp/out.mp4", io);
        assert!(err.to_string().contains("/tmp/out.mp4"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
