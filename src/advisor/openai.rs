// OpenAI-compatible chat-completions client.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{API_KEY_ENV, AdvisorError, Summarizer, build_prompt, require_api_key};
use crate::config::AdvisorSettings;

const SYSTEM_PROMPT: &str = "You are a helpful performance optimization assistant.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Clone)]
pub struct OpenAiAdvisor {
    api_key: String,
    settings: AdvisorSettings,
    client: Client,
}

impl std::fmt::Debug for OpenAiAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdvisor")
            .field("model", &self.settings.model)
            .field("base_url", &self.settings.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiAdvisor {
    /// Builds the advisor from OPENAI_API_KEY. Fails before any request is
    /// made when the key is absent.
    pub fn from_env(settings: AdvisorSettings) -> Result<Self, AdvisorError> {
        Self::new(std::env::var(API_KEY_ENV).ok(), settings)
    }

    pub fn new(api_key: Option<String>, settings: AdvisorSettings) -> Result<Self, AdvisorError> {
        let api_key = require_api_key(api_key)?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .user_agent(crate::version::user_agent())
            .build()?;
        Ok(Self {
            api_key,
            settings,
            client,
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiAdvisor {
    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn summarize(&self, digest: &str) -> anyhow::Result<String> {
        let req = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: build_prompt(digest),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let resp = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.settings.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("chat completions request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "chat completions error");
            anyhow::bail!("chat completions error {}: {}", status, body);
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .context("chat completions response could not be parsed")?;
        tracing::debug!(usage = ?chat.usage, "chat completions response received");

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("chat completions returned no choices"))
    }
}
