//! Cache Module
//!
//! Key building, the fail-soft cache service, and the transports behind it.

mod backend;
mod entry;
mod health;
pub mod keys;
mod lru;
mod memory;
mod options;
mod redis_backend;
mod service;
mod state;
mod stats;


// Re-export public types
pub use backend::CacheBackend;
pub(crate) use entry::MemoryEntry;
pub use health::{HealthReport, HealthStatus};
pub(crate) use lru::LruTracker;
pub use memory::{glob_match, MemoryBackend};
pub use options::{CacheOptions, TtlPolicy};
pub use redis_backend::RedisBackend;
pub use service::CacheService;
pub use state::{ConnectionEvent, ConnectionState};
pub use stats::{CacheStats, StatsRecorder};

// == Public Constants ==
/// Namespace prepended to every key this deployment writes.
pub const APP_NAMESPACE: &str = "fabl";

/// Prefix used when a caller does not name one.
pub const DEFAULT_PREFIX: &str = "general";

/// Maximum allowed local key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Longest TTL a write may request: ten years, in seconds.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
