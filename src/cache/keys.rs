//! Cache Key Builder
//!
//! Derives deterministic cache keys from request parameters. Field bags are
//! sorted by name before serializing, so the same filters supplied in a
//! different order always land on the same entry.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Prefix for paginated video list queries.
pub const VIDEO_LIST_PREFIX: &str = "videos:list";

/// Prefix for single video lookups.
pub const VIDEO_DETAIL_PREFIX: &str = "videos:detail";

/// Prefix for user profile lookups.
pub const USER_PROFILE_PREFIX: &str = "users:profile";

/// Prefix for search result pages.
pub const SEARCH_PREFIX: &str = "search";

// == Sorted Key ==
/// Builds `"{prefix}:{json}"` where `json` is the field bag serialized with
/// its keys in lexicographic order.
///
/// Later duplicates of a field name replace earlier ones. Nested objects are
/// serialized as given; their inner key order is not normalized.
pub fn build_sorted_key<I, K, V>(prefix: &str, fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let sorted: BTreeMap<String, Value> = fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    // A string-keyed map of JSON values always serializes.
    let serialized = serde_json::to_string(&sorted).unwrap_or_default();
    format!("{}:{}", prefix, serialized)
}

/// Key for a paginated video list with arbitrary filters.
///
/// `page` and `limit` take precedence over filter fields of the same name.
pub fn video_list(filters: &Map<String, Value>, page: u32, limit: u32) -> String {
    let fields = cloned(filters).chain([
        ("page".to_string(), Value::from(page)),
        ("limit".to_string(), Value::from(limit)),
    ]);
    build_sorted_key(VIDEO_LIST_PREFIX, fields)
}

/// Key for a single video.
pub fn video_detail(id: &str) -> String {
    format!("{}:{}", VIDEO_DETAIL_PREFIX, id)
}

/// Key for a user profile.
pub fn user_profile(id: &str) -> String {
    format!("{}:{}", USER_PROFILE_PREFIX, id)
}

/// Key for a search query with filters.
///
/// A filter named `query` overrides the query string.
pub fn search(query: &str, filters: &Map<String, Value>) -> String {
    let fields =
        std::iter::once(("query".to_string(), Value::from(query))).chain(cloned(filters));
    build_sorted_key(SEARCH_PREFIX, fields)
}

// == Namespacing ==
/// Full store key: `"{namespace}:{prefix}:{local_key}"`.
pub fn namespaced(namespace: &str, prefix: &str, local_key: &str) -> String {
    format!("{}:{}:{}", namespace, prefix, local_key)
}

/// Pattern matching every key under `prefix`, or the whole namespace.
///
/// Glob metacharacters in the namespace and prefix are escaped, so only the
/// trailing `*` is a wildcard.
pub fn namespace_pattern(namespace: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}:*", escape_glob(namespace), escape_glob(prefix)),
        None => format!("{}:*", escape_glob(namespace)),
    }
}

/// Backslash-escapes the glob metacharacters `*`, `?`, `[`, `]` and backslash.
pub fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn cloned(map: &Map<String, Value>) -> impl Iterator<Item = (String, Value)> + '_ {
    map.iter().map(|(k, v)| (k.clone(), v.clone()))
}
