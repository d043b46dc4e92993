use thiserror::Error;

// Rejected request fields, raised before any upstream work happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt cannot be empty.")]
    InvalidPrompt,

    #[error("Invalid value for {0}")]
    InvalidParameter(&'static str),
}

impl ValidationError {
    // name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidPrompt => "prompt",
            ValidationError::InvalidParameter(name) => name,
        }
    }
}

// Anything that went wrong talking to the completion provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Error calling completion API: {0}")]
    Upstream(#[from] UpstreamError),
}

// Fatal startup problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("an upstream API key is required (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
