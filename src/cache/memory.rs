//! In-memory cache backend
//!
//! HashMap storage with LRU eviction and TTL expiration. Serves local
//! development without a Redis server and gives tests a transport whose
//! clock can be paused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::cache::{CacheBackend, LruTracker, MemoryEntry};
use crate::error::{CacheError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, MemoryEntry>,
    lru: LruTracker,
    evictions: u64,
}

impl MemoryState {
    fn insert(&mut self, key: &str, value: &str, ttl_secs: u64, max_entries: usize) {
        let is_overwrite = self.entries.contains_key(key);

        if !is_overwrite && self.entries.len() >= max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.evictions += 1;
            }
        }

        let entry = MemoryEntry::new(value.to_string(), Duration::from_secs(ttl_secs));
        self.entries.insert(key.to_string(), entry);
        self.lru.touch(key);
    }

    fn read(&mut self, key: &str, now: Instant) -> Option<String> {
        let expired = self.entries.get(key)?.is_expired_at(now);
        if expired {
            self.remove(key);
            return None;
        }
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}

// == Memory Backend ==
/// Bounded in-process transport.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    max_entries: usize,
    connected: AtomicBool,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates a backend holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            max_entries: max_entries.max(1),
            connected: AtomicBool::new(false),
        }
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries dropped to make room for new keys.
    pub fn evictions(&self) -> u64 {
        self.state.lock().evictions
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock();

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("memory backend is not connected".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        let mut state = self.state.lock();
        state.entries.clear();
        state.lru.clear();
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_connected()?;
        Ok(self.state.lock().read(key, Instant::now()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.ensure_connected()?;
        self.state
            .lock()
            .insert(key, value, ttl_secs, self.max_entries);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_connected()?;
        self.state.lock().remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        self.ensure_connected()?;
        let mut state = self.state.lock();

        let matching: Vec<String> = state
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();

        for key in &matching {
            state.remove(key);
        }
        Ok(matching.len() as u64)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        self.ensure_connected()?;
        let now = Instant::now();
        let mut state = self.state.lock();
        Ok(keys.iter().map(|key| state.read(key, now)).collect())
    }

    async fn mset(&self, entries: &[(String, String)], ttl_secs: u64) -> Result<()> {
        self.ensure_connected()?;
        let mut state = self.state.lock();
        for (key, value) in entries {
            state.insert(key, value, ttl_secs, self.max_entries);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_connected()
    }
}

// == Glob Matching ==
#[derive(Clone, Copy, PartialEq)]
enum Token {
    AnyRun,
    AnyByte,
    Byte(u8),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut bytes = pattern.bytes();
    while let Some(b) = bytes.next() {
        tokens.push(match b {
            b'*' => Token::AnyRun,
            b'?' => Token::AnyByte,
            // trailing lone backslash matches itself
            b'\\' => Token::Byte(bytes.next().unwrap_or(b'\\')),
            other => Token::Byte(other),
        });
    }
    tokens
}

/// Matches `key` against a Redis-style pattern: `*` is any run of bytes,
/// `?` is any single byte and `\` escapes the next byte. Character classes
/// are not supported; `[` and `]` match themselves.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p = tokenize(pattern);
    let k = key.as_bytes();
    let (mut pi, mut ki) = (0, 0);
    // position of the last '*' seen, and the key index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while ki < k.len() {
        match p.get(pi) {
            Some(Token::AnyRun) => {
                backtrack = Some((pi, ki));
                pi += 1;
                continue;
            }
            Some(Token::AnyByte) => {
                pi += 1;
                ki += 1;
                continue;
            }
            Some(Token::Byte(b)) if *b == k[ki] => {
                pi += 1;
                ki += 1;
                continue;
            }
            _ => {}
        }

        match backtrack {
            Some((star, matched)) => {
                pi = star + 1;
                ki = matched + 1;
                backtrack = Some((star, matched + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|token| *token == Token::AnyRun)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    async fn connected(max_entries: usize) -> MemoryBackend {
        let backend = MemoryBackend::new(max_entries);
        backend.connect().await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = connected(100).await;
        backend.set("key1", "\"value1\"", 300).await.unwrap();
        assert_eq!(backend.get("key1").await.unwrap().as_deref(), Some("\"value1\""));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_commands_fail_before_connect() {
        let backend = MemoryBackend::new(100);
        assert!(matches!(
            backend.get("key1").await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(backend.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_disconnect_drops_entries() {
        let backend = connected(100).await;
        backend.set("key1", "1", 300).await.unwrap();
        backend.disconnect().await;
        assert!(backend.get("key1").await.is_err());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let backend = connected(100).await;
        backend.set("key1", "1", 300).await.unwrap();
        backend.set("key1", "2", 300).await.unwrap();
        assert_eq!(backend.get("key1").await.unwrap().as_deref(), Some("2"));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiration() {
        let backend = connected(100).await;
        backend.set("key1", "1", 1).await.unwrap();
        assert!(backend.get("key1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(backend.get("key1").await.unwrap().is_none());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let backend = connected(3).await;
        backend.set("key1", "1", 300).await.unwrap();
        backend.set("key2", "2", 300).await.unwrap();
        backend.set("key3", "3", 300).await.unwrap();

        // key1 becomes most recently used, key2 is now oldest
        backend.get("key1").await.unwrap();
        backend.set("key4", "4", 300).await.unwrap();

        assert_eq!(backend.len(), 3);
        assert_eq!(backend.evictions(), 1);
        assert!(backend.get("key2").await.unwrap().is_none());
        assert!(backend.get("key1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let backend = connected(100).await;
        backend.set("fabl:videos:1", "1", 300).await.unwrap();
        backend.set("fabl:videos:2", "2", 300).await.unwrap();
        backend.set("fabl:users:1", "3", 300).await.unwrap();

        assert_eq!(backend.delete_pattern("fabl:videos:*").await.unwrap(), 2);
        assert_eq!(backend.len(), 1);
        assert_eq!(backend.delete_pattern("fabl:*").await.unwrap(), 1);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_mget_keeps_order() {
        let backend = connected(100).await;
        backend.set("b", "2", 300).await.unwrap();
        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let values = backend.mget(&keys).await.unwrap();
        assert_eq!(values, vec![None, Some("2".to_string()), None]);
    }

    #[tokio::test]
    async fn test_mset() {
        let backend = connected(100).await;
        let entries = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];
        backend.mset(&entries, 300).await.unwrap();
        assert_eq!(backend.len(), 2);
        assert_eq!(backend.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let backend = connected(100).await;
        backend.set("short", "1", 1).await.unwrap();
        backend.set("long", "2", 10).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(backend.cleanup_expired(), 1);
        assert_eq!(backend.len(), 1);
        assert!(backend.get("long").await.unwrap().is_some());
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("fabl:*", "fabl:general:abc"));
        assert!(glob_match("fabl:videos:*", "fabl:videos:list:{}"));
        assert!(!glob_match("fabl:videos:*", "fabl:users:1"));
        assert!(glob_match("*:detail:*", "fabl:detail:9"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("a*b", "acbd"));
    }

    #[test]
    fn test_glob_match_single_byte_and_escapes() {
        assert!(glob_match("vid?os:*", "videos:1"));
        assert!(!glob_match(r"vid\?os:*", "videos:1"));
        assert!(glob_match(r"vid\?os:*", "vid?os:1"));
        assert!(glob_match(r"fabl:\[x\]:*", "fabl:[x]:k"));
        assert!(glob_match(r"a\*", "a*"));
        assert!(!glob_match(r"a\*", "ab"));
    }
}
