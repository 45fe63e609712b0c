//! Media processing actions.
//!
//! - Merging separate video and audio streams (copy or audio transcode)
//! - Trimming a file to a time window with atomic replacement

mod merge;
mod trim;

pub use merge::{
    merge, needs_audio_transcode, MergePlan, TRANSCODE_AUDIO_BITRATE, TRANSCODE_AUDIO_CODEC,
};
pub use trim::{trim, trim_args};
