use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ModelClient;
use crate::wire::{Conversation, GenerationConfig, Role};

pub struct Gemini {
    pub model: String,
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenParams,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenParams {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn request_body<'a>(conv: &'a Conversation, generation: &GenerationConfig) -> GenerateRequest<'a> {
    GenerateRequest {
        system_instruction: Content { role: None, parts: vec![Part { text: &conv.system }] },
        contents: conv
            .messages
            .iter()
            .map(|m| Content {
                role: Some(match m.role {
                    Role::User => "user",
                    Role::Model => "model",
                }),
                parts: vec![Part { text: &m.content }],
            })
            .collect(),
        generation_config: GenParams {
            temperature: generation.temperature,
            top_p: generation.top_p,
            top_k: generation.top_k,
            max_output_tokens: generation.max_output_tokens,
        },
    }
}

/// Text of the first candidate that has any; parts are concatenated.
fn reply_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("gemini response parse error: {}", e))?;
    parsed
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .find(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow!("gemini: no text in response"))
}

#[async_trait]
impl ModelClient for Gemini {
    async fn send(&self, conversation: &Conversation, generation: &GenerationConfig) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        );
        let client = Client::builder().timeout(self.timeout).build()?;
        let body = request_body(conversation, generation);

        tracing::debug!(%url, turns = conversation.messages.len(), "gemini request");

        let resp = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("gemini read body failed")?;
        tracing::debug!(%status, body = %text, "gemini raw response");

        if !status.is_success() {
            return Err(anyhow!("Gemini API error ({}): {}", status, text));
        }
        reply_text(&text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Message;

    #[test]
    fn body_shape() {
        let mut conv = Conversation::new("sys");
        conv.messages.push(Message::user("hi"));
        conv.messages.push(Message::model("hello"));
        let v = serde_json::to_value(request_body(&conv, &GenerationConfig::default())).unwrap();
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(v["systemInstruction"].get("role").is_none());
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][1]["role"], "model");
        assert_eq!(v["contents"][1]["parts"][0]["text"], "hello");
        assert_eq!(v["generationConfig"]["topK"], 40);
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn reply_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Ana. "},{"text":"```json\n{}\n```"}]}}]}"#;
        assert_eq!(reply_text(body).unwrap(), "Ana. ```json\n{}\n```");
    }

    #[test]
    fn reply_text_skips_empty_candidates() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY"},{"content":{"parts":[{"text":"ok"}]}}]}"#;
        assert_eq!(reply_text(body).unwrap(), "ok");
        assert!(reply_text(r#"{"candidates":[]}"#).is_err());
        assert!(reply_text("not json").is_err());
    }
}
