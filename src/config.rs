use std::{env, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{AppError, AppResult},
    models::domain::ResearchMode,
};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Bounded retry for rate-limited (429) and overloaded (529) responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Wait before retry number `attempt + 1`: grows linearly, capped at `max_delay_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let linear = self.base_delay_ms.saturating_mul(u64::from(attempt) + 1);
        Duration::from_millis(linear.min(self.max_delay_ms))
    }

    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 4000,
            max_delay_ms: 15000,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub anthropic_api_key: Option<SecretString>,
    pub anthropic_api_url: String,
    pub anthropic_model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub section_delay_ms: u64,
    pub retry: RetryPolicy,
    pub research_mode: ResearchMode,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            anthropic_api_key: env_non_empty("ANTHROPIC_API_KEY").map(SecretString::from),
            anthropic_api_url: env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: env_parse("ANTHROPIC_MAX_TOKENS", 4000),
            request_timeout_secs: env_parse("ANTHROPIC_TIMEOUT_SECS", 120),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env_parse("WEB_SERVER_PORT", 8080),
            cors_allowed_origin: env_non_empty("CORS_ALLOWED_ORIGIN"),
            section_delay_ms: env_parse("SECTION_DELAY_MS", 4000),
            retry: RetryPolicy {
                max_retries: env_parse("RETRY_MAX_ATTEMPTS", defaults.max_retries),
                base_delay_ms: env_parse("RETRY_BASE_DELAY_MS", defaults.base_delay_ms),
                max_delay_ms: env_parse("RETRY_MAX_DELAY_MS", defaults.max_delay_ms),
            },
            research_mode: env::var("RESEARCH_MODE")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// True when a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.anthropic_api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }

    pub fn section_delay(&self) -> Duration {
        Duration::from_millis(self.section_delay_ms)
    }

    /// Reject settings that would make the server unusable.
    pub fn validate(&self) -> AppResult<()> {
        if self.anthropic_api_url.trim().is_empty() {
            return Err(AppError::ValidationError(
                "ANTHROPIC_API_URL cannot be empty".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(AppError::ValidationError(
                "ANTHROPIC_MAX_TOKENS must be greater than zero".to_string(),
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(AppError::ValidationError(format!(
                "RETRY_BASE_DELAY_MS ({}) exceeds RETRY_MAX_DELAY_MS ({})",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_api_url: "http://127.0.0.1:9".to_string(),
            anthropic_model: DEFAULT_MODEL.to_string(),
            max_tokens: 4000,
            request_timeout_secs: 5,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: None,
            section_delay_ms: 0,
            retry: RetryPolicy {
                max_retries: 3,
                base_delay_ms: 0,
                max_delay_ms: 0,
            },
            research_mode: ResearchMode::Deep,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.anthropic_api_key = Some(SecretString::from(key.to_string()));
        self
    }
}
