//! Per-call cache options and TTL policy.

use std::time::Duration;

use super::{DEFAULT_PREFIX, MAX_TTL_SECS};

// == TTL Policy ==
/// Default TTLs for each kind of cached data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Anything without a more specific policy
    pub general: Duration,
    /// Paginated list queries
    pub list: Duration,
    /// Single-resource detail views
    pub detail: Duration,
    /// User profile data
    pub profile: Duration,
    /// Search result pages
    pub search: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            general: Duration::from_secs(300),
            list: Duration::from_secs(60),
            detail: Duration::from_secs(300),
            profile: Duration::from_secs(600),
            search: Duration::from_secs(120),
        }
    }
}

// == Cache Options ==
/// Options accepted by every keyed cache operation.
///
/// An unset prefix means [`DEFAULT_PREFIX`]; an unset TTL means the
/// service's general TTL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    prefix: Option<String>,
    ttl: Option<Duration>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the TTL. Writes clamp it into one second ..= [`MAX_TTL_SECS`].
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// TTL given in whole seconds.
    pub fn ttl_secs(self, secs: u64) -> Self {
        self.ttl(Duration::from_secs(secs))
    }

    /// Options for list queries under `policy`.
    pub fn list(policy: &TtlPolicy) -> Self {
        Self::new().ttl(policy.list)
    }

    /// Options for detail views under `policy`.
    pub fn detail(policy: &TtlPolicy) -> Self {
        Self::new().ttl(policy.detail)
    }

    /// Options for profile data under `policy`.
    pub fn profile(policy: &TtlPolicy) -> Self {
        Self::new().ttl(policy.profile)
    }

    /// Options for search results under `policy`.
    pub fn search(policy: &TtlPolicy) -> Self {
        Self::new().ttl(policy.search)
    }

    /// Effective prefix.
    pub fn prefix_or_default(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    /// Effective TTL in whole seconds, between one and [`MAX_TTL_SECS`].
    pub fn ttl_secs_or(&self, default: Duration) -> u64 {
        self.ttl.unwrap_or(default).as_secs().clamp(1, MAX_TTL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CacheOptions::new();
        assert_eq!(opts.prefix_or_default(), "general");
        assert_eq!(opts.ttl_secs_or(Duration::from_secs(300)), 300);
    }

    #[test]
    fn test_builder() {
        let opts = CacheOptions::new().prefix("videos").ttl_secs(45);
        assert_eq!(opts.prefix_or_default(), "videos");
        assert_eq!(opts.ttl_secs_or(Duration::from_secs(300)), 45);
    }

    #[test]
    fn test_huge_ttl_clamped() {
        let opts = CacheOptions::new().ttl_secs(u64::MAX);
        assert_eq!(opts.ttl_secs_or(Duration::from_secs(300)), MAX_TTL_SECS);
    }

    #[test]
    fn test_sub_second_ttl_clamped() {
        let opts = CacheOptions::new().ttl(Duration::from_millis(200));
        assert_eq!(opts.ttl_secs_or(Duration::from_secs(300)), 1);
    }

    #[test]
    fn test_policy_constructors() {
        let policy = TtlPolicy::default();
        let fallback = Duration::from_secs(1);
        assert_eq!(CacheOptions::list(&policy).ttl_secs_or(fallback), 60);
        assert_eq!(CacheOptions::detail(&policy).ttl_secs_or(fallback), 300);
        assert_eq!(CacheOptions::profile(&policy).ttl_secs_or(fallback), 600);
        assert_eq!(CacheOptions::search(&policy).ttl_secs_or(fallback), 120);
    }
}
