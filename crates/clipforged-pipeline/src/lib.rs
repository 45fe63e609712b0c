//! # clipforged-pipeline
//!
//! Orchestration of a single fetch: selection, download, merge and trim.
//!
//! This crate provides:
//!
//! - **[`StreamSelector`]** -- deterministic muxed / (video, audio) choice.
//! - **[`TrimPlanner`]** -- parses and validates the requested time window.
//! - **[`ManifestProvider`]** trait -- the transport boundary (resolve, list,
//!   download).
//! - **[`Orchestrator`]** -- runs the steps in order against a provider,
//!   reports progress, honours cancellation and cleans up intermediates.

pub mod context;
pub mod orchestrator;
pub mod provider;
pub mod selector;
pub mod trim;

// Re-export key types at the crate root.
pub use context::{ProgressSender, StepProgress};
pub use orchestrator::{FetchRequest, Orchestrator, PipelineOutcome, TrimStatus};
pub use provider::ManifestProvider;
pub use selector::StreamSelector;
pub use trim::TrimPlanner;

pub use tokio_util::sync::CancellationToken;
