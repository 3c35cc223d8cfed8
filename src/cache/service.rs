//! Cache Service
//!
//! Fail-soft front door to the cache transport. Adds key namespacing, TTL
//! defaults, JSON encoding, hit/miss/error statistics and the connection
//! state machine. No public operation returns a cache failure to the caller:
//! reads degrade to misses and writes to no-ops. The one exception is the
//! producer passed to [`CacheService::wrap`], whose errors propagate.

use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::keys;
use crate::cache::{
    CacheBackend, CacheOptions, CacheStats, ConnectionEvent, ConnectionState, HealthReport,
    StatsRecorder, TtlPolicy,
};
use crate::error::Result;

// == Cache Service ==
/// Process-wide cache handle. Build once at startup and share by `Arc`.
pub struct CacheService {
    backend: RwLock<Option<Arc<dyn CacheBackend>>>,
    state: Mutex<ConnectionState>,
    stats: StatsRecorder,
    namespace: String,
    ttl: TtlPolicy,
}

impl CacheService {
    // == Constructors ==
    /// Wraps `backend` without connecting; call [`CacheService::connect`] next.
    pub fn new(backend: Arc<dyn CacheBackend>, namespace: impl Into<String>, ttl: TtlPolicy) -> Self {
        Self {
            backend: RwLock::new(Some(backend)),
            state: Mutex::new(ConnectionState::Uninitialized),
            stats: StatsRecorder::new(),
            namespace: namespace.into(),
            ttl,
        }
    }

    /// A service with no transport: every read misses, every write is dropped.
    pub fn disabled(namespace: impl Into<String>, ttl: TtlPolicy) -> Self {
        Self {
            backend: RwLock::new(None),
            state: Mutex::new(ConnectionState::Disabled),
            stats: StatsRecorder::new(),
            namespace: namespace.into(),
            ttl,
        }
    }

    // == Lifecycle ==
    /// Connects the transport. On failure the transport is dropped and the
    /// service runs without a cache from then on.
    pub async fn connect(&self) {
        let Some(backend) = self.backend.read().clone() else {
            self.transition(ConnectionEvent::ConnectFailed);
            warn!("Cache has no transport, running without cache");
            return;
        };

        if !self.begin_connect() {
            return;
        }

        info!("Connecting {} cache transport", backend.name());
        match backend.connect().await {
            Ok(()) => {
                if self.transition(ConnectionEvent::Ready) != ConnectionState::Connected {
                    // closed while the connect was in flight
                    backend.disconnect().await;
                }
            }
            Err(e) => {
                warn!("Cache connection failed, running without cache: {}", e);
                self.backend.write().take();
                self.transition(ConnectionEvent::ConnectFailed);
            }
        }
    }

    /// Releases the transport. The service stays usable as a no-op cache.
    pub async fn disconnect(&self) {
        self.transition(ConnectionEvent::Close);
        let backend = self.backend.write().take();
        if let Some(backend) = backend {
            backend.disconnect().await;
            info!("Cache transport closed");
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    // == Key Namespacing ==
    /// `"{namespace}:{prefix}:{local_key}"`.
    pub fn generate_key(&self, prefix: &str, local_key: &str) -> String {
        keys::namespaced(&self.namespace, prefix, local_key)
    }

    // == Get ==
    /// Reads and decodes one value. `None` on miss, when the cache is
    /// unavailable, or when the stored value does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, opts: &CacheOptions) -> Option<T> {
        self.stats.record_operation();
        let Some(backend) = self.live_backend() else {
            self.stats.record_miss();
            return None;
        };

        let full_key = self.generate_key(opts.prefix_or_default(), key);
        let raw = self.settle("get", &full_key, backend.get(&full_key).await)?;

        match raw {
            Some(raw) => {
                let value = self.decode(&full_key, &raw)?;
                self.stats.record_hit();
                debug!("Cache hit for key '{}'", full_key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                debug!("Cache miss for key '{}'", full_key);
                None
            }
        }
    }

    // == Set ==
    /// Encodes and writes one value with the option TTL or the general TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, opts: &CacheOptions) {
        self.stats.record_operation();
        let Some(backend) = self.live_backend() else {
            return;
        };

        let full_key = self.generate_key(opts.prefix_or_default(), key);
        let Some(encoded) = self.encode(&full_key, value) else {
            return;
        };
        let ttl_secs = opts.ttl_secs_or(self.ttl.general);

        if self
            .settle("set", &full_key, backend.set(&full_key, &encoded, ttl_secs).await)
            .is_some()
        {
            debug!("Cached key '{}' with TTL {}s", full_key, ttl_secs);
        }
    }

    // == Delete ==
    pub async fn delete(&self, key: &str, opts: &CacheOptions) {
        self.stats.record_operation();
        let Some(backend) = self.live_backend() else {
            return;
        };

        let full_key = self.generate_key(opts.prefix_or_default(), key);
        self.settle("delete", &full_key, backend.delete(&full_key).await);
    }

    // == Flush ==
    /// Removes every entry under `prefix`, or every entry of this namespace.
    pub async fn flush(&self, prefix: Option<&str>) {
        self.stats.record_operation();
        let Some(backend) = self.live_backend() else {
            return;
        };

        let pattern = keys::namespace_pattern(&self.namespace, prefix);
        if let Some(count) = self.settle(
            "flush",
            &pattern,
            backend.delete_pattern(&pattern).await,
        ) {
            info!("Flushed {} cache entries matching '{}'", count, pattern);
        }
    }

    // == Wrap ==
    /// Read-through: returns the cached value, or runs `producer`, caches
    /// its result and returns it.
    ///
    /// Producer errors are returned unchanged and nothing is cached.
    /// Concurrent misses on the same key each run the producer.
    pub async fn wrap<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        opts: &CacheOptions,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key, opts).await {
            return Ok(cached);
        }

        let value = producer().await?;
        self.set(key, &value, opts).await;
        Ok(value)
    }

    // == Batch Get ==
    /// Reads many keys at once. The result has one slot per key, in order;
    /// a slot that fails to decode is `None` without affecting the others.
    pub async fn mget<T, K>(&self, keys: &[K], opts: &CacheOptions) -> Vec<Option<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        self.stats.record_operation();
        let misses = || keys.iter().map(|_| None).collect::<Vec<Option<T>>>();
        if keys.is_empty() {
            return Vec::new();
        }

        let Some(backend) = self.live_backend() else {
            for _ in keys {
                self.stats.record_miss();
            }
            return misses();
        };

        let prefix = opts.prefix_or_default();
        let full_keys: Vec<String> = keys
            .iter()
            .map(|key| self.generate_key(prefix, key.as_ref()))
            .collect();

        let Some(raws) = self.settle("mget", prefix, backend.mget(&full_keys).await) else {
            return misses();
        };

        full_keys
            .iter()
            .zip(raws.into_iter().chain(std::iter::repeat(None)))
            .map(|(full_key, raw)| match raw {
                Some(raw) => {
                    let value = self.decode(full_key, &raw);
                    if value.is_some() {
                        self.stats.record_hit();
                    }
                    value
                }
                None => {
                    self.stats.record_miss();
                    None
                }
            })
            .collect()
    }

    // == Batch Set ==
    /// Writes many entries in one atomic batch. Entries that fail to encode
    /// are skipped; the rest are still written.
    pub async fn mset<T, K>(&self, entries: &[(K, T)], opts: &CacheOptions)
    where
        T: Serialize,
        K: AsRef<str>,
    {
        self.stats.record_operation();
        let Some(backend) = self.live_backend() else {
            return;
        };

        let prefix = opts.prefix_or_default();
        let encoded: Vec<(String, String)> = entries
            .iter()
            .filter_map(|(key, value)| {
                let full_key = self.generate_key(prefix, key.as_ref());
                let raw = self.encode(&full_key, value)?;
                Some((full_key, raw))
            })
            .collect();

        if encoded.is_empty() {
            return;
        }

        let ttl_secs = opts.ttl_secs_or(self.ttl.general);
        if self
            .settle("mset", prefix, backend.mset(&encoded, ttl_secs).await)
            .is_some()
        {
            debug!("Cached {} keys under '{}' with TTL {}s", encoded.len(), prefix, ttl_secs);
        }
    }

    // == Health ==
    /// Pings the transport and reports status, latency and counters.
    pub async fn health(&self) -> HealthReport {
        let Some(backend) = self.live_backend() else {
            return HealthReport::disconnected(self.stats());
        };

        let started = Instant::now();
        match backend.ping().await {
            Ok(()) => {
                let latency = started.elapsed().as_millis() as u64;
                self.transition(ConnectionEvent::Ready);
                HealthReport::connected(latency, self.stats())
            }
            Err(e) => {
                self.transition(ConnectionEvent::Error);
                HealthReport::error(e.to_string(), self.stats())
            }
        }
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.is_connected(), self.ttl.general.as_secs())
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
        info!("Cache statistics reset");
    }

    // == Internals ==
    fn live_backend(&self) -> Option<Arc<dyn CacheBackend>> {
        if !self.state().accepts_commands() {
            return None;
        }
        self.backend.read().clone()
    }

    /// Moves `Uninitialized` to `Connecting`. Only the caller that wins
    /// this step goes on to dial the transport.
    fn begin_connect(&self) -> bool {
        let mut state = self.state.lock();
        if *state != ConnectionState::Uninitialized {
            return false;
        }
        let next = state.on(ConnectionEvent::Connect);
        *state = next;
        debug!("Cache state {:?} -> {:?}", ConnectionState::Uninitialized, next);
        true
    }

    fn transition(&self, event: ConnectionEvent) -> ConnectionState {
        let mut state = self.state.lock();
        let previous = *state;
        let next = previous.on(event);
        *state = next;
        drop(state);

        if next != previous {
            match next {
                ConnectionState::Degraded => warn!("Cache transport degraded"),
                ConnectionState::Disabled => warn!("Cache disabled"),
                ConnectionState::Connected if previous == ConnectionState::Degraded => {
                    info!("Cache transport recovered")
                }
                _ => debug!("Cache state {:?} -> {:?}", previous, next),
            }
        }
        next
    }

    /// Turns a transport result into an option, counting and logging failures.
    fn settle<T>(&self, op: &str, target: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.transition(ConnectionEvent::Ready);
                Some(value)
            }
            Err(e) => {
                self.stats.record_error();
                if e.is_transport() {
                    self.transition(ConnectionEvent::Error);
                }
                error!("Cache {} failed for '{}': {}", op, target, e);
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, full_key: &str, raw: &str) -> Option<T> {
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.stats.record_error();
                error!("Cache value for '{}' failed to decode: {}", full_key, e);
                None
            }
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, full_key: &str, value: &T) -> Option<String> {
        match serde_json::to_string(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                self.stats.record_error();
                error!("Cache value for '{}' failed to encode: {}", full_key, e);
                None
            }
        }
    }
}
