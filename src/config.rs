use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;

// CLI / environment settings
#[derive(Parser, Debug, Clone)]
#[command(name = "completion-gateway")]
#[command(about = "Caching, rate-limited proxy for a text completion API")]
pub struct Args {
    // Upstream API key (required, never logged)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    // Upstream API root; completions go to {base_url}/completions
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    // Model used when a request doesn't name one
    #[arg(long, env = "OPENAI_DEFAULT_MODEL")]
    pub default_model: Option<String>,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // Debug logging, also mirrored to the log file.
    // Accepts 1/0, yes/no, on/off, true/false in any case; bare `--debug` means true.
    #[arg(
        long,
        env = "DEBUG",
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new(),
        default_value_t = false,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub debug: bool,

    // Log file written in debug mode
    #[arg(long, env = "LOG_FILE", default_value = "app.log")]
    pub log_file: PathBuf,

    // Minimum spacing between upstream calls, in seconds
    #[arg(long, env = "RATE_LIMIT_SECONDS", default_value_t = 5)]
    pub rate_limit_seconds: u64,

    // Upstream request timeout, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 60)]
    pub request_timeout: u64,
}

impl Args {
    // Fails fast on settings the service can't start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    // blank default model counts as unset
    pub fn default_model(&self) -> Option<&str> {
        self.default_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}
