//! Run-scoped workspace for intermediate files.
//!
//! A [`Workspace`] owns a hidden temporary directory created next to the
//! output file, so moving a finished intermediate into place is a rename on
//! the same filesystem. Everything inside the directory is removed when the
//! workspace is closed or dropped, on every exit path.

use std::path::{Path, PathBuf};

use clipforged_core::{Error, Result};
use tempfile::TempDir;

/// Prefix of the per-run directory, e.g. `.clipforged-AbC123`.
const WORKSPACE_PREFIX: &str = ".clipforged-";

/// Workspace for one pipeline run.
///
/// # Example
///
/// ```no_run
/// use clipforged_av::Workspace;
///
/// let workspace = Workspace::new(std::path::Path::new("/videos/clip.mp4")).unwrap();
/// let video = workspace.temp_file("video.mp4");
/// // ... download into `video`, produce the output ...
/// workspace.remove(&video);
/// workspace.close();
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a workspace for producing `output`.
    ///
    /// The output's parent directory is created if needed and the temporary
    /// directory is placed inside it.
    pub fn new(output: &Path) -> Result<Self> {
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| Error::file(&parent, e))?;

        let temp_dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| Error::file(&parent, e))?;

        tracing::debug!("workspace created at {}", temp_dir.path().display());

        Ok(Self {
            temp_dir,
            output_path: output.to_path_buf(),
        })
    }

    /// The final output path owned by the caller after a successful run.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Path to the temporary directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a path for a named temporary file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Delete a file if it exists. Failures are logged, not returned.
    ///
    /// Returns `true` if a file was removed.
    pub fn remove(&self, path: &Path) -> bool {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::trace!("removed {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("Failed to remove {}: {e}", path.display());
                false
            }
        }
    }

    /// Move a finished file from the workspace onto the output path.
    pub fn promote(&self, src: &Path) -> Result<PathBuf> {
        replace_file(src, &self.output_path)?;
        Ok(self.output_path.clone())
    }

    /// Remove the temporary directory and everything left in it.
    pub fn close(self) {
        let path = self.temp_dir.path().to_path_buf();
        if let Err(e) = self.temp_dir.close() {
            tracing::warn!("Failed to remove workspace {}: {e}", path.display());
        }
    }
}

/// Replace `dest` with `src` using a single rename where possible.
///
/// On platforms that refuse to rename over an existing file, `dest` is
/// removed first. If `src` lives on another filesystem the file is copied
/// and `src` removed. `dest` is never left half-written by the rename path.
pub fn replace_file(src: &Path, dest: &Path) -> Result<()> {
    if !src.exists() {
        return Err(Error::file(
            src,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source file does not exist"),
        ));
    }

    let first = match std::fs::rename(src, dest) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if dest.exists() {
        std::fs::remove_file(dest).map_err(|e| Error::file(dest, e))?;
        if std::fs::rename(src, dest).is_ok() {
            return Ok(());
        }
    }

    tracing::debug!(
        "rename {} -> {} failed ({first}); copying instead",
        src.display(),
        dest.display()
    );
    std::fs::copy(src, dest).map_err(|e| Error::file(dest, e))?;
    let _ = std::fs::remove_file(src);
    Ok(())
}
