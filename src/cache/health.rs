//! Health report returned by `CacheService::health`.

use serde::Serialize;

use crate::cache::CacheStats;

/// Outcome of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Connected,
    Disconnected,
    Error,
}

/// Result of a round-trip ping plus the current counters.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Ping round-trip in milliseconds, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
    /// Transport error message, when the ping failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CacheStats>,
    /// When the probe ran, RFC 3339
    pub timestamp: String,
}

impl HealthReport {
    pub fn connected(latency_ms: u64, stats: CacheStats) -> Self {
        Self::build(HealthStatus::Connected, Some(latency_ms), None, stats)
    }

    pub fn disconnected(stats: CacheStats) -> Self {
        Self::build(HealthStatus::Disconnected, None, None, stats)
    }

    pub fn error(message: impl Into<String>, stats: CacheStats) -> Self {
        Self::build(HealthStatus::Error, None, Some(message.into()), stats)
    }

    fn build(
        status: HealthStatus,
        latency: Option<u64>,
        error: Option<String>,
        stats: CacheStats,
    ) -> Self {
        Self {
            status,
            latency,
            error,
            stats: Some(stats),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
