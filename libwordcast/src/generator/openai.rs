//! OpenAI chat completions client

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, TextService};
use crate::config::GeneratorConfig;
use crate::error::GeneratorError;

pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl OpenAiClient {
    pub fn new(config: &GeneratorConfig, api_key: SecretString) -> Result<Self, GeneratorError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GeneratorError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl TextService for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GeneratorError> {
        let body = self.request_body(messages);

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GeneratorError::Transport(e.to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeneratorError::RateLimit(text));
        }
        if !status.is_success() {
            return Err(GeneratorError::Service {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = extract_content(&text)?;
        debug!(model = %self.model, chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

/// Pull the first choice's message content out of a response body
fn extract_content(body: &str) -> Result<String, GeneratorError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GeneratorError::MalformedResponse(format!("{}: {}", e, body)))?;

    if let Some(usage) = &response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Token usage"
        );
    }

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(GeneratorError::MalformedResponse(format!(
            "no content in response: {}",
            body
        )));
    }

    Ok(content)
}

// --- API types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
