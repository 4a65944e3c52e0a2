//! Resource descriptors: what to request, independent of how it is sent

use reqwest::Method;

use crate::cache::CacheKey;

/// One addressable API operation: verb, path relative to the API root, and
/// query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Resource {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter.
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    /// Reads are the only requests eligible for caching and deduplication.
    pub fn is_read(&self) -> bool {
        self.method == Method::GET
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.method, &self.path, &self.query)
    }
}

/// Per-call read options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bypass the cache lookup. The response still populates the cache and
    /// concurrent identical requests are still coalesced.
    pub skip_cache: bool,
}

impl FetchOptions {
    /// Options for a read that must reach the network.
    pub fn fresh() -> Self {
        Self { skip_cache: true }
    }
}
