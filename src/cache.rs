use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::metrics::CACHE_SIZE;
use crate::models::PromptRequest;

// Cache key - hash of (prompt, model)
//
// The other generation parameters are left out on purpose: two requests that only
// differ in temperature, max_tokens, etc. share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(prompt: &str, model: &str) -> Self {
        let mut hasher = Sha256::new();
        // length prefix keeps ("ab", "c") and ("a", "bc") apart
        hasher.update((prompt.len() as u64).to_le_bytes());
        hasher.update(prompt);
        hasher.update(model);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn for_request(req: &PromptRequest) -> Self {
        Self::new(req.prompt(), req.model())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// In-memory response cache.
///
/// Entries live as long as the process: no TTL, no eviction, no size bound.
/// Concurrent writes to one key are last-write-wins.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<CacheKey, String>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: CacheKey, text: String) {
        self.entries.insert(key, text);
        CACHE_SIZE.set(self.entries.len() as f64);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
