//! Builder for executing external tool commands.
//!
//! Both output pipes are drained concurrently with waiting for exit, so a
//! tool that writes heavily to either stream cannot stall on a full pipe.
//! A non-zero exit is reported through [`ToolOutput::success`], not as an
//! error.
//!
//! On Unix the child runs in its own process group, so a terminal Ctrl-C
//! reaches only this process and a running tool finishes its work.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use clipforged_core::{Error, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// `true` iff the process exited with code 0.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// The last `n` non-empty lines of stderr, for log and error messages.
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        lines[lines.len().saturating_sub(n)..].join("\n")
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use clipforged_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> clipforged_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-version")
///     .execute()
///     .await?;
/// if output.success() {
///     println!("{}", output.stdout);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(iter.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Set (or clear) the maximum execution time.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Short name of the program, used in logs and errors.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// The full command line, lossily rendered for logging.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::Tool`] if spawning the process fails.
    /// - Returns [`Error::Tool`] if waiting on the process or reading its
    ///   pipes fails.
    /// - Returns [`Error::Tool`] if a timeout is set and expires; the child
    ///   is killed.
    ///
    /// A non-zero exit status is **not** an error.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();
        tracing::debug!("exec: {}", self.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::tool(&program_name, format!("failed to spawn: {e}")))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let collected = {
            let run = async {
                tokio::join!(child.wait(), drain(stdout), drain(stderr))
            };
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, run).await.ok(),
                None => Some(run.await),
            }
        };

        let Some((status, stdout, stderr)) = collected else {
            let _ = child.kill().await;
            return Err(Error::tool(
                &program_name,
                format!("timed out after {:?}", self.timeout.unwrap_or_default()),
            ));
        };

        let io_err = |what: &str, e: std::io::Error| {
            Error::tool(&program_name, format!("I/O error {what}: {e}"))
        };
        let status = status.map_err(|e| io_err("waiting for process", e))?;
        let stdout = stdout.map_err(|e| io_err("reading stdout", e))?;
        let stderr = stderr.map_err(|e| io_err("reading stderr", e))?;

        let output = ToolOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        };

        if !output.success() {
            tracing::debug!(
                "{program_name} exited with {}: {}",
                output.status,
                output.stderr_tail(5)
            );
        }

        Ok(output)
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
