use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    config::Config,
    errors::ModelError,
    models::dto::messages::{MessagesRequest, MessagesResponse},
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_BETA: &str = "tools-2024-10-22";

/// Outcome of one HTTP exchange that reached the API.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiReply {
    Success(MessagesResponse),
    Failure { status: u16 },
}

impl ApiReply {
    pub fn failure(status: u16) -> Self {
        ApiReply::Failure { status }
    }
}

/// Transport seam for the Messages endpoint.
///
/// `Err` means the request never produced an HTTP response (connection,
/// timeout) or the success body could not be decoded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagesApi: Send + Sync {
    async fn create_message(&self, request: &MessagesRequest) -> Result<ApiReply, ModelError>;
}

pub struct AnthropicClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(config: &Config) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            api_key: config
                .anthropic_api_key
                .clone()
                .unwrap_or_else(|| SecretString::from(String::new())),
            endpoint: format!(
                "{}/v1/messages",
                config.anthropic_api_url.trim_end_matches('/')
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessagesApi for AnthropicClient {
    async fn create_message(&self, request: &MessagesRequest) -> Result<ApiReply, ModelError> {
        log::debug!(
            "POST {} (model={}, messages={}, tools={})",
            self.endpoint,
            request.model,
            request.messages.len(),
            request.tools.as_ref().map_or(0, Vec::len)
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", ANTHROPIC_BETA)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("Messages API returned {}: {}", status, body);
            return Ok(ApiReply::failure(status.as_u16()));
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(ApiReply::Success(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let mut config = Config::test_config();
        config.anthropic_api_url = "https://api.anthropic.com/".to_string();

        let client = AnthropicClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://api.anthropic.com/v1/messages");
    }

    #[actix_web::test]
    async fn test_unreachable_host_is_a_transport_error() {
        // port 9 (discard) on loopback refuses connections
        let client = AnthropicClient::new(&Config::test_config()).unwrap();
        let request = MessagesRequest {
            model: "m".to_string(),
            max_tokens: 1,
            messages: vec![],
            tools: None,
        };

        let result = client.create_message(&request).await;
        assert!(matches!(result, Err(ModelError::Transport(_))));
    }
}
