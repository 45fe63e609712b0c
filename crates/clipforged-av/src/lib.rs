//! # clipforged-av
//!
//! External tool handling for the clipforged pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolConfig`]) and the `-version` availability
//!   probe ([`tools::require_available`]).
//! - **Command execution** ([`ToolCommand`]) -- async builder that drains
//!   stdout and stderr concurrently and reports the exit status.
//! - **Workspace management** ([`Workspace`]) -- run-scoped temporary
//!   directory next to the output, with atomic replacement.
//! - **Action functions** ([`actions`]) -- merge and trim.

pub mod actions;
pub mod command;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo};
pub use workspace::Workspace;

pub use actions::{merge, trim, MergePlan};
