//! External tool detection and the availability probe.
//!
//! The tool location is resolved once from configuration (explicit path,
//! else a `PATH` lookup) and then passed explicitly to everything that runs
//! it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clipforged_core::config::ToolsConfig;
use clipforged_core::{Error, Result};

use crate::command::ToolCommand;

/// Name of the merge/trim tool.
pub const FFMPEG: &str = "ffmpeg";

/// Argument that makes ffmpeg print its version and exit 0.
const VERSION_ARG: &str = "-version";

/// A resolved external tool.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "ffmpeg").
    pub name: String,
    /// Path to the executable. May be a bare name if discovery failed, in
    /// which case the availability probe reports the problem.
    pub path: PathBuf,
    /// Maximum execution time before the tool is killed.
    pub timeout: Option<Duration>,
}

impl ToolConfig {
    /// Resolve ffmpeg from configuration.
    ///
    /// If [`ToolsConfig::ffmpeg_path`] is set **and** exists it is used
    /// directly. Otherwise [`which::which`] searches `PATH`; when that fails
    /// too the bare name is kept so the probe can report it.
    pub fn ffmpeg(tools_config: &ToolsConfig) -> Self {
        let path = resolve(FFMPEG, tools_config.ffmpeg_path.as_deref());
        Self {
            name: FFMPEG.to_string(),
            path,
            timeout: tools_config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// A tool at an explicit path, bypassing discovery.
    pub fn at(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            timeout: None,
        }
    }

    /// Start a command for this tool with its timeout applied.
    pub fn command(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.path.clone());
        cmd.timeout(self.timeout);
        cmd
    }
}

fn resolve(name: &str, custom_path: Option<&Path>) -> PathBuf {
    if let Some(p) = custom_path {
        if p.exists() {
            return p.to_path_buf();
        }
        tracing::warn!(
            "Configured {name} path {} does not exist; searching PATH",
            p.display()
        );
    }
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}

/// Availability information for a tool, returned by [`check_available`].
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the version probe exited 0.
    pub available: bool,
    /// First line of the version output, if available.
    pub version: Option<String>,
    /// Path that was probed.
    pub path: PathBuf,
}

/// Run `<tool> -version` and report whether it exited successfully.
///
/// Never fails: a tool that cannot be spawned is simply unavailable.
pub async fn check_available(tool: &ToolConfig) -> ToolInfo {
    let result = ToolCommand::new(tool.path.clone())
        .arg(VERSION_ARG)
        .execute()
        .await;

    let version = match result {
        Ok(output) if output.success() => Some(
            output
                .stdout
                .lines()
                .next()
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        ),
        Ok(output) => {
            tracing::debug!("{} {VERSION_ARG} exited with {}", tool.name, output.status);
            None
        }
        Err(e) => {
            tracing::debug!("{} probe failed: {e}", tool.name);
            None
        }
    };

    ToolInfo {
        name: tool.name.clone(),
        available: version.is_some(),
        version: version.filter(|v| !v.is_empty()),
        path: tool.path.clone(),
    }
}

/// Probe the tool and fail with [`Error::ToolUnavailable`] unless it works.
pub async fn require_available(tool: &ToolConfig) -> Result<ToolInfo> {
    let info = check_available(tool).await;
    if !info.available {
        return Err(Error::tool_unavailable(
            &tool.name,
            format!(
                "{} {VERSION_ARG} did not exit successfully; is it installed and in PATH?",
                tool.path.display()
            ),
        ));
    }
    tracing::debug!(
        "{} available: {}",
        info.name,
        info.version.as_deref().unwrap_or("unknown version")
    );
    Ok(info)
}
