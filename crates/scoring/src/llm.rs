use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling parameters for a single completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionParams {
    pub const SCORING: Self = Self { temperature: 0.3, max_tokens: 1000 };
    pub const REPORT: Self = Self { temperature: 0.3, max_tokens: 2048 };
    pub const MACRO_RISK: Self = Self { temperature: 0.4, max_tokens: 1024 };
}

/// Single-shot completion against an LLM provider.
#[async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String>;

    fn model(&self) -> &str;
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            n: 1,
        };

        tracing::debug!(
            model = %self.model,
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to LLM provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM request failed: {} {}", status, body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM provider response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("LLM response contained no message content")
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod fake {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a canned reply and records every prompt it receives.
    pub struct FakeClient {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
        pub prompts: Mutex<Vec<(String, CompletionParams)>>,
    }

    impl FakeClient {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push((prompt.to_string(), params));
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => anyhow::bail!("{}", message),
            }
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }
}
