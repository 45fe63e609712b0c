//! Progress reporting shared by the orchestrator and download providers.

/// Sender for reporting progress from within pipeline steps.
///
/// Wraps a callback that receives a progress percentage (0.0 -- 100.0) and a
/// human-readable step description.
pub struct ProgressSender {
    callback: Box<dyn Fn(f32, &str) + Send + Sync>,
}

impl ProgressSender {
    /// Create a new sender from the given callback.
    pub fn new(callback: impl Fn(f32, &str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a no-op sender that discards all progress reports.
    pub fn noop() -> Self {
        Self {
            callback: Box::new(|_, _| {}),
        }
    }

    /// Report progress, clamped to `0.0..=100.0`.
    pub fn send(&self, progress: f32, step: &str) {
        (self.callback)(progress.clamp(0.0, 100.0), step);
    }

    /// A view of this sender that reports every update under `step`.
    pub fn step<'a>(&'a self, step: &'a str) -> StepProgress<'a> {
        StepProgress { sender: self, step }
    }
}

impl std::fmt::Debug for ProgressSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSender").finish_non_exhaustive()
    }
}

impl Default for ProgressSender {
    fn default() -> Self {
        Self::noop()
    }
}

/// Progress for a single named step, handed to downloads.
#[derive(Debug, Clone, Copy)]
pub struct StepProgress<'a> {
    sender: &'a ProgressSender,
    step: &'a str,
}

impl StepProgress<'_> {
    /// Report `progress` percent for this step.
    pub fn report(&self, progress: f32) {
        self.sender.send(progress, self.step);
    }

    /// Report `done` out of `total` bytes; ignored when the total is unknown.
    pub fn report_bytes(&self, done: u64, total: Option<u64>) {
        if let Some(total) = total.filter(|t| *t > 0) {
            self.report((done as f64 / total as f64 * 100.0) as f32);
        }
    }

    pub fn name(&self) -> &str {
        self.step
    }
}
