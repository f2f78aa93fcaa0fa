//! Local model backend over Ollama's native chat endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use kai_core::config::ResponderConfig;
use kai_core::{Responder, TurnSnapshot};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::prompts::{build_system_prompt, sanitize_reply};
use crate::retry::{with_retry, RetryPolicy};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    message: Option<ChatReplyMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OllamaResponder {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    retry: RetryPolicy,
}

impl OllamaResponder {
    pub fn new(config: &ResponderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("Failed to build HTTP client for Ollama")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl Responder for OllamaResponder {
    async fn respond(&self, message: &str, snapshot: &TurnSnapshot) -> Result<String> {
        let system = build_system_prompt(snapshot);
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let url = self.endpoint();
        tracing::debug!("Ollama request: model={} prompt_chars={}", self.model, system.len());
        let response = with_retry(&self.retry, "Ollama", || {
            self.client.post(&url).json(&payload).send()
        })
        .await?;

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to decode Ollama response")?;
        extract_reply(body)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }

    fn handles_open_ended(&self) -> bool {
        true
    }
}

pub(crate) fn extract_reply(body: ChatResponse) -> Result<String> {
    if let Some(err) = body.error {
        anyhow::bail!("Ollama error: {}", err);
    }
    let content = body.message.map(|m| m.content).unwrap_or_default();
    let reply = sanitize_reply(&content);
    if reply.is_empty() {
        anyhow::bail!("Ollama returned an empty reply");
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_reply() {
        let body = parse(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"  **Hey!** Long day. "},"done":true}"#,
        );
        assert_eq!(extract_reply(body).unwrap(), "Hey! Long day.");
    }

    #[test]
    fn test_extract_reply_errors() {
        assert!(extract_reply(parse(r#"{"error":"model not found"}"#)).is_err());
        assert!(extract_reply(parse(r#"{"message":{"role":"assistant","content":"   "}}"#)).is_err());
    }

    #[test]
    fn test_endpoint_and_flags() {
        let cfg = ResponderConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let r = OllamaResponder::new(&cfg).unwrap();
        assert_eq!(r.endpoint(), "http://localhost:11434/api/chat");
        assert_eq!(r.model(), cfg.model);
        assert!(r.handles_open_ended());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let cfg = ResponderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let r = OllamaResponder::new(&cfg)
            .unwrap()
            .with_retry_policy(RetryPolicy::once());
        assert!(r.respond("hello", &TurnSnapshot::default()).await.is_err());
    }
}
