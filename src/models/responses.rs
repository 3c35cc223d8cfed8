//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies. Stats and health
//! reuse the cache layer's own serializable types.

use serde::Serialize;
use serde_json::Value;

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for write-style operations (set, delete, flush, mset)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for POST /cache/mget
#[derive(Debug, Clone, Serialize)]
pub struct MgetResponse {
    /// One slot per requested key, `null` for misses
    pub values: Vec<Option<Value>>,
}

/// Response body for the key preview endpoints
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key: String,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("k", json!({"a": 1}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "k");
        assert_eq!(json["value"]["a"], 1);
    }

    #[test]
    fn test_mget_response_nulls() {
        let resp = MgetResponse {
            values: vec![None, Some(json!(2))],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"values":[null,2]}"#);
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
