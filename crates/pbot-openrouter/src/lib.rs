//! OpenRouter adapter (chat completions).
//!
//! Implements `GenerationPort`: one persona system message plus the user prompt,
//! no history between calls.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use pbot_core::{config::Config, errors::GenerationError, ports::GenerationPort};

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct OpenRouterClient {
    endpoint: String,
    model: String,
    persona_prompt: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

impl OpenRouterClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        persona_prompt: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(format!("http client build: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            persona_prompt: persona_prompt.into(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, GenerationError> {
        Self::new(
            cfg.generation_endpoint.clone(),
            cfg.generation_model.clone(),
            cfg.persona_prompt.clone(),
            cfg.openrouter_api_key.clone(),
            cfg.generation_timeout,
        )
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.persona_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

fn map_reqwest_err(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(e.to_string())
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn extract_content(v: &serde_json::Value) -> Result<String, GenerationError> {
    let content = v
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            GenerationError::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            )
        })?;

    if content.trim().is_empty() {
        return Err(GenerationError::MalformedResponse(
            "empty completion".to_string(),
        ));
    }

    Ok(content.to_string())
}

#[async_trait]
impl GenerationPort for OpenRouterClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(map_reqwest_err)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let v: serde_json::Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::MalformedResponse(format!("invalid json: {e}"))
            }
        })?;

        let text = extract_content(&v)?;
        tracing::debug!(model = %self.model, chars = text.len(), "generation complete");
        Ok(text)
    }
}
