//! Cache Entry Module
//!
//! A value held by the in-memory backend, with its expiry deadline.

use std::time::Duration;

use tokio::time::Instant;

// == Memory Entry ==
/// A single stored value and when it stops being readable.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    /// Serialized payload
    pub value: String,
    /// First instant at which the entry is expired; `None` when the deadline
    /// lies beyond what the clock can represent.
    pub expires_at: Option<Instant>,
}

impl MemoryEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_not_expired_before_ttl() {
        let entry = MemoryEntry::new("v".to_string(), Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!entry.is_expired_at(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_deadline() {
        let entry = MemoryEntry::new("v".to_string(), Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(entry.is_expired_at(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_immediately_expired() {
        let entry = MemoryEntry::new("v".to_string(), Duration::ZERO);
        assert!(entry.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_unrepresentable_deadline_never_expires() {
        let entry = MemoryEntry::new("v".to_string(), Duration::MAX);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Instant::now()));
    }
}
