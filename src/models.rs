use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;

pub const DEFAULT_MAX_TOKENS: i64 = 100;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 1.0;

// Raw request body as sent by clients, before any checks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptFields {
    #[serde(default)]
    pub model: Option<String>,
    pub prompt: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub frequency_penalty: f64,
    #[serde(default)]
    pub presence_penalty: f64,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
}

fn default_max_tokens() -> i64 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}

impl PromptFields {
    // prompt + model with every other field at its default
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
        }
    }

    // fill in the configured model when the client didn't name one
    pub fn with_default_model(mut self, default_model: Option<&str>) -> Self {
        if self.model.is_none() {
            self.model = default_model.map(str::to_string);
        }
        self
    }
}

/// A prompt request that passed validation.
///
/// Fields are private so the only way to get one is [`PromptRequest::new`],
/// which checks every constraint up front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

impl PromptRequest {
    pub fn new(fields: PromptFields) -> Result<Self, ValidationError> {
        if fields.prompt.trim().is_empty() {
            return Err(ValidationError::InvalidPrompt);
        }

        let model = match fields.model {
            Some(model) if !model.trim().is_empty() => model,
            _ => return Err(ValidationError::InvalidParameter("model")),
        };

        let max_tokens = u32::try_from(fields.max_tokens)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ValidationError::InvalidParameter("max_tokens"))?;

        check_unit_range("temperature", fields.temperature)?;
        check_unit_range("top_p", fields.top_p)?;
        check_unit_range("frequency_penalty", fields.frequency_penalty)?;
        check_unit_range("presence_penalty", fields.presence_penalty)?;

        Ok(Self {
            model,
            prompt: fields.prompt,
            max_tokens,
            temperature: fields.temperature,
            top_p: fields.top_p,
            frequency_penalty: fields.frequency_penalty,
            presence_penalty: fields.presence_penalty,
            stop: fields.stop,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn top_p(&self) -> f64 {
        self.top_p
    }

    pub fn frequency_penalty(&self) -> f64 {
        self.frequency_penalty
    }

    pub fn presence_penalty(&self) -> f64 {
        self.presence_penalty
    }

    pub fn stop(&self) -> Option<&[String]> {
        self.stop.as_deref()
    }
}

// NaN fails too, since it is never contained in the range
fn check_unit_range(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidParameter(name))
    }
}

// One successful upstream completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    pub text: String,
    pub model: String,
    pub usage: BTreeMap<String, u64>,
}

// Response body of POST /openai/generate_response
#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}
