//! clipforged-core: shared error type, configuration, media data model and
//! timestamp handling.
//!
//! This crate is the foundational dependency for the other clipforged
//! crates. It performs no I/O of its own.

pub mod config;
pub mod error;
pub mod media;
pub mod time;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
pub use time::{Timestamp, TrimWindow};
