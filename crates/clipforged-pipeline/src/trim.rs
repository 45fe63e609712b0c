//! Turns raw start/end strings into a trim window.
//!
//! A malformed side is dropped with a warning and trimming is skipped; the
//! run goes on. A well-formed window whose start is not before its end is
//! an error that stops the run before any download.

use clipforged_core::{Result, Timestamp, TrimWindow};

/// Validates and normalizes a requested trim window.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimPlanner;

impl TrimPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Build the trim window, if one was requested.
    ///
    /// Returns `Ok(None)` when either side is absent, empty or malformed.
    ///
    /// # Errors
    ///
    /// Returns [`clipforged_core::Error::InvalidTrimWindow`] if both sides
    /// are valid and `start >= end`.
    pub fn plan(&self, start: Option<&str>, end: Option<&str>) -> Result<Option<TrimWindow>> {
        let start = normalize("start", start);
        let end = normalize("end", end);

        match (start, end) {
            (Some(start), Some(end)) => {
                let window = TrimWindow::new(start, end)?;
                tracing::debug!("trim window {window}");
                Ok(Some(window))
            }
            (Some(only), None) | (None, Some(only)) => {
                tracing::info!("only one trim bound ({only}) is usable; not trimming");
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }
}

fn normalize(side: &str, raw: Option<&str>) -> Option<Timestamp> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    match Timestamp::parse(raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::warn!("{e}; ignoring {side} time (expected MM:SS or HH:MM:SS)");
            None
        }
    }
}
