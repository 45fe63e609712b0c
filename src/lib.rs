//! clipforged - fetch a remote video as a single playable file
//!
//! This library crate exposes the binary's configuration loading and HTTP
//! provider for integration testing.

pub mod config;
pub mod provider;
