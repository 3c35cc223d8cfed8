//! Fabl Cache - namespaced, fail-soft caching for the Fabl video platform
//!
//! Deterministic cache keys, per-kind TTLs and a cache service that never
//! lets a transport failure reach its callers. Backed by Redis, or by an
//! in-process LRU map for local development.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheOptions, CacheService};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
