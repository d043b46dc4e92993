use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{ConfigError, UpstreamError};
use crate::models::{CompletionResult, PromptRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Single-shot access to a text completion provider.
///
/// Implementations make exactly one attempt per call; retries are the caller's
/// business.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &PromptRequest) -> Result<CompletionResult, UpstreamError>;
}

// Provider response format
#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

// OpenAI-compatible `/completions` client
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &PromptRequest) -> Result<CompletionResult, UpstreamError> {
        let res = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: provider_message(&body, status),
            });
        }

        let body: CompletionResponse = res
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| UpstreamError::Malformed("response has no choices".to_string()))?;

        // keep only the plain token counters
        let usage: BTreeMap<String, u64> = body
            .usage
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, value)| value.as_u64().map(|count| (name, count)))
            .collect();

        Ok(CompletionResult {
            text,
            model: body.model.unwrap_or_else(|| request.model().to_string()),
            usage,
        })
    }
}

// Pull `error.message` out of a provider error body, falling back to the status text
fn provider_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}
