//! Concrete manifest providers.

pub mod http;

pub use http::HttpManifestProvider;
