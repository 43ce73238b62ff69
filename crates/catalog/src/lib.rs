//! Catalog library for fetching anime metadata from the Jikan API.
//!
//! Access to the upstream API is rate limited globally, so every call goes
//! through a single-lane request scheduler backed by a two-tier TTL cache.
//! The resolver on top exposes the domain operations (top titles, seasonal
//! listings, search, detail lookup, recommendations) and normalizes the
//! heterogeneous upstream records into one internal shape.

pub mod api;
pub mod cache;
pub mod resolver;
pub mod scheduler;

pub use api::CatalogClient;
pub use cache::{CacheStore, SweeperHandle};
pub use resolver::{current_seasons, seasons_at, MetadataResolver, SeasonWindow};
pub use scheduler::RequestScheduler;
