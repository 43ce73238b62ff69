//! Shared library for the anime-universe core.
//!
//! This crate provides common functionality used across all member crates:
//! - Configuration management
//! - Canonical data models (normalized titles, seasons, quality tiers)
//! - Localized display dictionaries
//! - Logging infrastructure
//! - Shared error types

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod translations;

// Re-export commonly used types
pub use config::Config;
pub use error::ApiError;
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
