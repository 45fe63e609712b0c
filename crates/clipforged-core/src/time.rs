//! Timestamp normalization and trim windows.
//!
//! Accepted raw shapes are `M:SS` and `H:MM:SS`, where every component is one
//! or more ASCII digits. Both normalize to zero-padded `HH:MM:SS`, with
//! seconds and minutes above 59 carried into the next component.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{Error, Result};

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+):([0-9]+)(?::([0-9]+))?$").expect("timestamp pattern is valid")
});

/// A normalized `HH:MM:SS` timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    text: String,
    duration: Duration,
}

impl Timestamp {
    /// Parse and normalize a raw time string.
    ///
    /// `"5:30"` becomes `"00:05:30"`, `"1:2:3"` becomes `"01:02:03"` and
    /// `"100:00"` becomes `"01:40:00"`. Any other shape yields
    /// [`Error::InvalidTimeFormat`].
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || Error::InvalidTimeFormat(raw.to_string());

        let caps = TIMESTAMP_RE.captures(raw).ok_or_else(invalid)?;
        let number = |i: usize| -> Result<u64> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .unwrap_or(Ok(0))
        };

        let (hours, minutes, seconds) = if caps.get(3).is_some() {
            (number(1)?, number(2)?, number(3)?)
        } else {
            (0, number(1)?, number(2)?)
        };

        let total = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(seconds))
            .ok_or_else(invalid)?;

        Ok(Self {
            text: format!(
                "{:02}:{:02}:{:02}",
                total / 3600,
                total / 60 % 60,
                total % 60
            ),
            duration: Duration::from_secs(total),
        })
    }

    /// The normalized `HH:MM:SS` form passed to the external tool.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The timestamp as an offset from the start of the media.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The `[start, end)` range to keep from a media file. Always `start < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimWindow {
    start: Timestamp,
    end: Timestamp,
}

impl TrimWindow {
    /// Build a window, comparing bounds as durations rather than strings.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start.duration() >= end.duration() {
            return Err(Error::InvalidTrimWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &Timestamp {
        &self.start
    }

    pub fn end(&self) -> &Timestamp {
        &self.end
    }

    pub fn length(&self) -> Duration {
        self.end.duration() - self.start.duration()
    }
}

impl fmt::Display for TrimWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
