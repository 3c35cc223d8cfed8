//! Transport abstraction behind the cache service.

use async_trait::async_trait;

use crate::error::Result;

/// A key-value transport with TTL support.
///
/// Keys arrive fully namespaced and values already serialized; the service
/// owns naming, encoding, statistics and failure policy. Implementations
/// report every failure as an error and never retry on their own.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &'static str;

    /// Establishes the connection. Called once by the service.
    async fn connect(&self) -> Result<()>;

    /// Releases the connection. Later commands fail with `Unavailable`.
    async fn disconnect(&self);

    /// Reads one value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes one value that expires after `ttl_secs`.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Removes one key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every key matching a `*` glob, returning how many went.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;

    /// Reads many values; the result has one slot per key, in order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Writes many values in one atomic batch.
    async fn mset(&self, entries: &[(String, String)], ttl_secs: u64) -> Result<()>;

    /// Round-trip liveness check.
    async fn ping(&self) -> Result<()>;
}
