//! Jikan API v4 access layer.
//!
//! The client performs raw HTTP and error classification; the typed
//! response schemas and their normalization into [`shared::NormalizedTitle`]
//! live in [`types`].

pub mod client;
pub mod types;

pub use client::CatalogClient;
