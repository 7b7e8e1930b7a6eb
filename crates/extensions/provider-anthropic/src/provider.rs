//! Anthropic provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use sitepilot_config::{API_KEY_ENV, ProviderConfig};
use sitepilot_protocols::error::ProviderError;
use sitepilot_protocols::provider::{
    CompletionRequest, CompletionResponse, CompletionStream, LLMProvider,
};

use crate::api::{ApiRequest, ApiResponse};
use crate::converter::{convert_messages, convert_tools};
use crate::parser::{SseDecoder, parse_response};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const COMPUTER_USE_BETA: &str = "computer-use-2025-01-24";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic LLM provider.
pub struct AnthropicProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    computer_use_beta: String,
    default_max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
            computer_use_beta: COMPUTER_USE_BETA.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a provider from the `[provider]` config section.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey(API_KEY_ENV.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            client,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            computer_use_beta: config.computer_use_beta.clone(),
            default_max_tokens: config.max_tokens,
        })
    }

    /// Point the provider at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, request: &CompletionRequest, stream: bool) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            messages: convert_messages(&request.messages),
            system: request.system.clone(),
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            tools: convert_tools(request),
            stream: stream.then_some(true),
        }
    }

    async fn send_request(
        &self,
        api_request: &ApiRequest,
        computer_use: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json");
        if computer_use {
            builder = builder.header("anthropic-beta", &self.computer_use_beta);
        }

        debug!(
            "POST {} model={} messages={} computer_use={}",
            self.endpoint(),
            api_request.model,
            api_request.messages.len(),
            computer_use
        );

        let response = builder
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            // Error bodies look like {"error": {"message": "...", "type": "..."}}
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(body);
            return Err(ProviderError::from_api_response(status, message));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(&request, false);
        let response = self.send_request(&api_request, request.uses_computer()).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let api_response: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;
        Ok(parse_response(api_response))
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        let api_request = self.build_request(&request, true);
        let response = self.send_request(&api_request, request.uses_computer()).await?;

        let stream = response
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, result| {
                let items = match result {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(ProviderError::StreamError(e.to_string()))],
                };
                futures::future::ready(Some(futures::stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
