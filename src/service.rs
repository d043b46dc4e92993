//! The request-to-completion pipeline.
//!
//! [`CompletionService`] owns the response cache and the rate limiter, and is
//! built once at startup and shared between handlers through `AppState`.

use std::sync::Arc;

use crate::cache::{CacheKey, ResponseCache};
use crate::client::CompletionClient;
use crate::error::ServiceError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, UPSTREAM_ERRORS};
use crate::models::PromptRequest;
use crate::rate_limit::RateLimiter;

// Longest prompt prefix written to logs
const LOG_PROMPT_CHARS: usize = 80;

pub struct CompletionService {
    client: Arc<dyn CompletionClient>,
    cache: ResponseCache,
    rate_limiter: RateLimiter,
}

impl CompletionService {
    pub fn new(client: Arc<dyn CompletionClient>, rate_limiter: RateLimiter) -> Self {
        Self {
            client,
            cache: ResponseCache::new(),
            rate_limiter,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns the generated text for `request`.
    ///
    /// Cache hits return immediately without touching the rate limiter. A miss
    /// waits on the limiter, looks again (a concurrent caller may have filled the
    /// entry meanwhile) and then makes one upstream call. Failures are not cached.
    pub async fn generate(&self, request: &PromptRequest) -> Result<String, ServiceError> {
        let key = CacheKey::for_request(request);

        if let Some(text) = self.cache.get(&key) {
            CACHE_HITS.inc();
            tracing::debug!(model = request.model(), "cache hit");
            return Ok(text);
        }

        self.rate_limiter.acquire().await;

        if let Some(text) = self.cache.get(&key) {
            CACHE_HITS.inc();
            tracing::debug!(model = request.model(), "cache hit after rate limit wait");
            return Ok(text);
        }
        CACHE_MISSES.inc();

        tracing::info!(
            model = request.model(),
            prompt = %truncate(request.prompt(), LOG_PROMPT_CHARS),
            "cache miss - calling upstream"
        );

        match self.client.complete(request).await {
            Ok(result) => {
                tracing::debug!(model = %result.model, usage = ?result.usage, "upstream completion");
                self.cache.put(key, result.text.clone());
                Ok(result.text)
            }
            Err(e) => {
                UPSTREAM_ERRORS.inc();
                tracing::error!(
                    model = request.model(),
                    prompt = %truncate(request.prompt(), LOG_PROMPT_CHARS),
                    error = %e,
                    "upstream call failed"
                );
                Err(ServiceError::Upstream(e))
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
