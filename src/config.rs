//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{TtlPolicy, APP_NAMESPACE};

/// Which transport backs the cache service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote Redis server
    Redis,
    /// In-process map, for local development
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" | "mem" => Ok(BackendKind::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache transport
    pub backend: BackendKind,
    /// Redis connection URL
    pub redis_url: String,
    /// Application namespace prepended to every key
    pub namespace: String,
    /// Deadline for establishing the transport connection
    pub connect_timeout: Duration,
    /// Deadline for a single transport round-trip
    pub command_timeout: Duration,
    /// Per-kind TTL defaults
    pub ttl: TtlPolicy,
    /// Capacity of the in-memory backend
    pub max_entries: usize,
    /// Expiry sweep interval for the in-memory backend, in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_NAMESPACE` - Key namespace (default: fabl)
    /// - `CACHE_CONNECT_TIMEOUT_MS` - Connect timeout (default: 5000)
    /// - `CACHE_COMMAND_TIMEOUT_MS` - Command timeout (default: 2000)
    /// - `CACHE_TTL_GENERAL`, `CACHE_TTL_LIST`, `CACHE_TTL_DETAIL`,
    ///   `CACHE_TTL_PROFILE`, `CACHE_TTL_SEARCH` - TTLs in seconds
    ///   (defaults: 300, 60, 300, 600, 120)
    /// - `MAX_ENTRIES` - In-memory capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - In-memory sweep interval in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ttl = TtlPolicy {
            general: secs_var("CACHE_TTL_GENERAL", defaults.ttl.general),
            list: secs_var("CACHE_TTL_LIST", defaults.ttl.list),
            detail: secs_var("CACHE_TTL_DETAIL", defaults.ttl.detail),
            profile: secs_var("CACHE_TTL_PROFILE", defaults.ttl.profile),
            search: secs_var("CACHE_TTL_SEARCH", defaults.ttl.search),
        };

        Self {
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
            backend: parsed_var("CACHE_BACKEND").unwrap_or(defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|ns| !ns.is_empty())
                .unwrap_or(defaults.namespace),
            connect_timeout: parsed_var("CACHE_CONNECT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            command_timeout: parsed_var("CACHE_COMMAND_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.command_timeout),
            ttl,
            max_entries: parsed_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parsed_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            backend: BackendKind::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            namespace: APP_NAMESPACE.to_string(),
            connect_timeout: Duration::from_millis(5000),
            command_timeout: Duration::from_millis(2000),
            ttl: TtlPolicy::default(),
            max_entries: 10_000,
            cleanup_interval: 30,
        }
    }
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

// Zero is not a valid TTL, so it falls back like any other bad value.
fn secs_var(name: &str, default: Duration) -> Duration {
    parsed_var::<u64>(name)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.backend, BackendKind::Redis);
        assert_eq!(config.namespace, "fabl");
        assert_eq!(config.ttl.general, Duration::from_secs(300));
        assert_eq!(config.ttl.list, Duration::from_secs(60));
        assert_eq!(config.ttl.profile, Duration::from_secs(600));
        assert_eq!(config.max_entries, 10_000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "SERVER_PORT",
            "CACHE_BACKEND",
            "REDIS_URL",
            "CACHE_NAMESPACE",
            "CACHE_CONNECT_TIMEOUT_MS",
            "CACHE_COMMAND_TIMEOUT_MS",
            "CACHE_TTL_SEARCH",
            "MAX_ENTRIES",
            "CLEANUP_INTERVAL",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.backend, BackendKind::Redis);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.command_timeout, Duration::from_millis(2000));
        assert_eq!(config.ttl.search, Duration::from_secs(120));
        assert_eq!(config.cleanup_interval, 30);
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("redis".parse::<BackendKind>(), Ok(BackendKind::Redis));
        assert_eq!(" Memory ".parse::<BackendKind>(), Ok(BackendKind::Memory));
        assert!("memcached".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_zero_ttl_falls_back() {
        env::set_var("CACHE_TTL_DETAIL", "0");
        assert_eq!(
            secs_var("CACHE_TTL_DETAIL", Duration::from_secs(300)),
            Duration::from_secs(300)
        );
        env::remove_var("CACHE_TTL_DETAIL");
    }
}
