//! OpenRouter chat-completions adapters.
//!
//! OpenRouter proxies many vendors behind one OpenAI-style endpoint. Replies
//! are kept as raw JSON because image output is not part of a stable contract.

pub mod image_client;
pub mod text_client;

use crate::{
    config::OpenRouterConfig,
    error::{MugenError, Result},
    models::{ChatCompletionRequest, ChatMessage, ModelInfo},
    normalize::{HttpFetcher, ImageFetcher},
};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

pub use image_client::ChatImageClient;
pub use text_client::ChatTextClient;

/// Authenticated chat-completions transport.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// One completion call. Returns the reply as a plain JSON mapping.
    pub async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<Value> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages,
        };

        log::info!("Invoking model: {}", model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Title", "Mugen")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(MugenError::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let parsed: Value = serde_json::from_str(&response_text)
            .map_err(|e| MugenError::ResponseError(format!("Failed to parse response: {}", e)))?;

        // Upstream failures can arrive as a 200 with an error object instead of choices.
        if parsed.get("choices").is_none() {
            if let Some(error) = parsed.get("error") {
                return Err(MugenError::Api {
                    status: error
                        .get("code")
                        .and_then(Value::as_u64)
                        .and_then(|code| u16::try_from(code).ok())
                        .unwrap_or(status.as_u16()),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .unwrap_or_else(|| error.to_string()),
                });
            }
        }

        Ok(parsed)
    }
}

#[derive(Clone)]
pub struct OpenRouterClient {
    image_client: ChatImageClient,
    text_client: ChatTextClient,
}

impl OpenRouterClient {
    /// Strict bring-your-own-key: without a key there is no client.
    pub fn resolve(config: &OpenRouterConfig) -> Option<Self> {
        match &config.api_key {
            Some(api_key) => Some(Self::new(api_key.clone(), config.base_url.clone())),
            None => {
                log::warn!("No OpenRouter API key supplied");
                None
            }
        }
    }

    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_fetcher(ChatClient::new(api_key, base_url), Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(chat: ChatClient, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            image_client: ChatImageClient::new(chat.clone(), fetcher),
            text_client: ChatTextClient::new(chat),
        }
    }

    pub fn image(&self) -> &ChatImageClient {
        &self.image_client
    }

    pub fn text(&self) -> &ChatTextClient {
        &self.text_client
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        let mut models = ChatImageClient::supported_models();
        models.extend(ChatTextClient::supported_models());
        models
    }
}
