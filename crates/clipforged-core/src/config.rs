//! Application configuration types.
//!
//! The top-level [`Config`] carries the tool, download and output sections.
//! Every section defaults sensibly so an empty document is valid; file
//! loading lives in the binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub download: DownloadConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref path) = self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    path.display()
                ));
            }
        }

        if self.tools.timeout_secs == Some(0) {
            warnings.push("tools.timeout_secs is 0; every tool run will time out".into());
        }

        if let Some(ref base) = self.download.base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                warnings.push(format!("download.base_url '{base}' is not an http(s) URL"));
            }
        }

        if self.output.container.is_empty() {
            warnings.push("output.container is empty; using mp4".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// External tool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Explicit ffmpeg location; `PATH` is searched when unset or missing.
    pub ffmpeg_path: Option<PathBuf>,
    /// Kill a merge or trim that runs longer than this. Unlimited when unset.
    pub timeout_secs: Option<u64>,
}

/// Transport settings for the HTTP manifest provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Base URL that bare identifiers are resolved against.
    pub base_url: Option<String>,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: concat!("clipforged/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension every output path is normalized to.
    pub container: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            container: "mp4".into(),
        }
    }
}
