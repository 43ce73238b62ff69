//! Streaming-source lookup against the AniLibria catalog.
//!
//! Given the title variants of a normalized catalog record, this crate
//! searches the independent AniLibria API for a matching release and builds
//! an episode → quality-URL map with absolute CDN URLs. Matching is by
//! normalized name comparison; a missing source is a normal outcome, not
//! an error.

pub mod api;
pub mod matcher;

pub use api::LibriaClient;
pub use matcher::{normalize_title, SourceMatch, SourceMatcher};
