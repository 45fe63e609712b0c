//! Cut a file down to a time window with a stream copy.
//!
//! The cut is written to a workspace file and only moved over the target if
//! ffmpeg succeeded and the file exists. On any failure the target is left
//! exactly as it was.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clipforged_core::{Error, Result, TrimWindow};

use crate::tools::ToolConfig;
use crate::workspace::{replace_file, Workspace};

/// The ffmpeg argument vector for cutting `input` to `window` into `output`.
pub fn trim_args(window: &TrimWindow, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-ss".into(),
        window.start().as_str().into(),
        "-to".into(),
        window.end().as_str().into(),
        "-i".into(),
        input.into(),
    ];
    args.extend(["-c", "copy", "-avoid_negative_ts", "make_zero", "-y"].map(OsString::from));
    args.push(output.into());
    args
}

/// Trim `target` in place to `window`.
///
/// Returns the target path on success.
///
/// # Errors
///
/// Every failure is reported as [`Error::TrimFailure`]; the temporary cut is
/// removed and `target` is untouched.
pub async fn trim(
    tool: &ToolConfig,
    workspace: &Workspace,
    target: &Path,
    window: &TrimWindow,
) -> Result<PathBuf> {
    let staged = workspace.temp_file(&staged_name(target));

    tracing::info!("trimming {} to {window}", target.display());

    let result = run_trim(tool, target, &staged, window).await;
    if result.is_err() {
        workspace.remove(&staged);
    }
    result?;

    tracing::info!("trim complete: {}", target.display());
    Ok(target.to_path_buf())
}

async fn run_trim(tool: &ToolConfig, target: &Path, staged: &Path, window: &TrimWindow) -> Result<()> {
    let output = tool
        .command()
        .args(trim_args(window, target, staged))
        .execute()
        .await
        .map_err(|e| Error::TrimFailure(e.to_string()))?;

    if !output.success() {
        return Err(Error::TrimFailure(format!(
            "{} exited with {}: {}",
            tool.name,
            output.status,
            output.stderr_tail(5)
        )));
    }

    if !staged.exists() {
        return Err(Error::TrimFailure(format!(
            "{} reported success but wrote no file at {}",
            tool.name,
            staged.display()
        )));
    }

    replace_file(staged, target).map_err(|e| Error::TrimFailure(e.to_string()))
}

/// `trimmed.<ext>` so ffmpeg picks the same muxer as the target.
fn staged_name(target: &Path) -> String {
    match target.extension() {
        Some(ext) => format!("trimmed.{}", ext.to_string_lossy()),
        None => "trimmed.mp4".to_string(),
    }
}
