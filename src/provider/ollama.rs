use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ModelClient;
use crate::wire::{Conversation, GenerationConfig, Role};

pub struct Ollama {
    pub model: String,
    pub url: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

fn to_messages(conv: &Conversation) -> Vec<Msg<'_>> {
    let mut out = vec![Msg { role: "system", content: &conv.system }];
    out.extend(conv.messages.iter().map(|m| Msg {
        role: match m.role {
            Role::User => "user",
            Role::Model => "assistant",
        },
        content: &m.content,
    }));
    out
}

#[async_trait]
impl ModelClient for Ollama {
    async fn send(&self, conversation: &Conversation, generation: &GenerationConfig) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let client = Client::builder().timeout(self.timeout).build()?;
        let body = ChatRequest {
            model: &self.model,
            messages: to_messages(conversation),
            stream: false,
            options: OllamaOptions {
                temperature: generation.temperature,
                top_p: generation.top_p,
                top_k: generation.top_k,
                num_predict: generation.max_output_tokens,
            },
        };

        tracing::debug!(%url, "ollama request");

        let resp = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;
        tracing::debug!(%status, body = %text, "ollama raw response");

        if !status.is_success() {
            return Err(anyhow!("Ollama error ({}): {}", status, text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("ollama response parse error: {}", e))?;
        Ok(parsed.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
