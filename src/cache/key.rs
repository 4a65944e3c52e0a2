//! Cache key derivation from request verb and resolved address

use std::fmt;

use reqwest::Method;

/// Deterministic key for a request: `VERB:/path?sorted&query`.
///
/// Query parameters are sorted by name (then value) and form-encoded, so two
/// logically identical requests always map to the same key and a value
/// containing `&` or `=` cannot collide with a different parameter set.
/// The path is kept readable because invalidation matches on substrings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from verb, path, and query parameters.
    pub fn new(method: &Method, path: &str, query: &[(String, String)]) -> Self {
        let mut sorted: Vec<&(String, String)> = query.iter().collect();
        sorted.sort();

        let mut key = format!("{}:{}", method.as_str(), path);
        if !sorted.is_empty() {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (k, v) in sorted {
                serializer.append_pair(k, v);
            }
            key.push('?');
            key.push_str(&serializer.finish());
        }
        Self(key)
    }

    /// Whether the key contains `pattern` anywhere.
    pub fn matches(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
