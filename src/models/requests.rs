//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::cache::{CacheOptions, MAX_KEY_LENGTH, MAX_TTL_SECS};

/// Validates a caller-supplied local key.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_ttl(ttl: Option<u64>) -> Option<String> {
    match ttl {
        Some(0) => Some("TTL must be at least one second".to_string()),
        Some(ttl) if ttl > MAX_TTL_SECS => Some(format!(
            "TTL exceeds maximum of {} seconds",
            MAX_TTL_SECS
        )),
        _ => None,
    }
}

fn options(prefix: Option<&str>, ttl: Option<u64>) -> CacheOptions {
    let mut opts = CacheOptions::new();
    if let Some(prefix) = prefix {
        opts = opts.prefix(prefix);
    }
    if let Some(ttl) = ttl {
        opts = opts.ttl_secs(ttl);
    }
    opts
}

/// Query string accepted by keyed endpoints and flush (`?prefix=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefixQuery {
    #[serde(default)]
    pub prefix: Option<String>,
}

impl PrefixQuery {
    pub fn options(&self) -> CacheOptions {
        options(self.prefix.as_deref(), None)
    }

    /// Rejects an empty prefix, which would read as a namespace-wide flush.
    pub fn validate(&self) -> Option<String> {
        match self.prefix.as_deref() {
            Some("") => Some("Prefix cannot be empty".to_string()),
            _ => None,
        }
    }
}

/// Request body for PUT /cache/:key
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// Any JSON value
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_ttl(self.ttl)
    }

    pub fn options(&self, query: &PrefixQuery) -> CacheOptions {
        options(query.prefix.as_deref(), self.ttl)
    }
}

/// Request body for POST /cache/mget
#[derive(Debug, Clone, Deserialize)]
pub struct MgetRequest {
    pub keys: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

impl MgetRequest {
    pub fn validate(&self) -> Option<String> {
        if self.keys.is_empty() {
            return Some("At least one key is required".to_string());
        }
        self.keys.iter().find_map(|key| validate_key(key))
    }

    pub fn options(&self) -> CacheOptions {
        options(self.prefix.as_deref(), None)
    }
}

/// One entry of an mset body.
#[derive(Debug, Clone, Deserialize)]
pub struct MsetEntry {
    pub key: String,
    pub value: Value,
}

/// Request body for POST /cache/mset
#[derive(Debug, Clone, Deserialize)]
pub struct MsetRequest {
    pub entries: Vec<MsetEntry>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl MsetRequest {
    pub fn validate(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("At least one entry is required".to_string());
        }
        validate_ttl(self.ttl).or_else(|| {
            self.entries
                .iter()
                .find_map(|entry| validate_key(&entry.key))
        })
    }

    pub fn options(&self) -> CacheOptions {
        options(self.prefix.as_deref(), self.ttl)
    }

    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }
}

/// Request body for POST /keys/list
#[derive(Debug, Clone, Deserialize)]
pub struct ListKeyRequest {
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Request body for POST /keys/search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchKeyRequest {
    pub query: String,
    #[serde(default)]
    pub filters: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"value": {"title": "clip"}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.value["title"], "clip");
        assert!(req.ttl.is_none());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_set_request_zero_ttl_rejected() {
        let req: SetRequest = serde_json::from_str(r#"{"value": 1, "ttl": 0}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_out_of_range_ttl_rejected() {
        let req: SetRequest =
            serde_json::from_str(r#"{"value": 1, "ttl": 18446744073709551615}"#).unwrap();
        assert!(req.validate().is_some());

        let req: MsetRequest = serde_json::from_str(&format!(
            r#"{{"entries": [{{"key": "a", "value": 1}}], "ttl": {}}}"#,
            MAX_TTL_SECS + 1
        ))
        .unwrap();
        assert!(req.validate().is_some());

        let req: SetRequest =
            serde_json::from_str(&format!(r#"{{"value": 1, "ttl": {}}}"#, MAX_TTL_SECS)).unwrap();
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("").is_some());
        assert!(validate_key(&"x".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key("valid_key").is_none());
    }

    #[test]
    fn test_mget_request_validation() {
        let req: MgetRequest = serde_json::from_str(r#"{"keys": []}"#).unwrap();
        assert!(req.validate().is_some());

        let req: MgetRequest = serde_json::from_str(r#"{"keys": ["a", ""]}"#).unwrap();
        assert!(req.validate().is_some());

        let req: MgetRequest =
            serde_json::from_str(r#"{"keys": ["a"], "prefix": "videos"}"#).unwrap();
        assert!(req.validate().is_none());
        assert_eq!(req.options().prefix_or_default(), "videos");
    }

    #[test]
    fn test_mset_request_pairs() {
        let req: MsetRequest = serde_json::from_str(
            r#"{"entries": [{"key": "a", "value": 1}, {"key": "b", "value": 2}], "ttl": 30}"#,
        )
        .unwrap();
        assert!(req.validate().is_none());
        let pairs = req.into_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "b");
    }

    #[test]
    fn test_list_key_request_defaults() {
        let req: ListKeyRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 20);
        assert!(req.filters.is_empty());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let query = PrefixQuery {
            prefix: Some(String::new()),
        };
        assert!(query.validate().is_some());
        assert!(PrefixQuery::default().validate().is_none());
    }
}
