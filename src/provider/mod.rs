use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::StudioError;
use crate::wire::{Conversation, GenerationConfig};

pub mod gemini;
pub mod ollama;

/// One text reply per call; the conversation carries the system instruction
/// and every turn so far.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn send(&self, conversation: &Conversation, generation: &GenerationConfig) -> Result<String>;
    fn model(&self) -> &str;
}

pub type DynClient = Box<dyn ModelClient + Send + Sync>;

/// Fails with a configuration error before any request when a credential is missing.
pub fn make_client(cfg: &Config) -> Result<DynClient, StudioError> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    match cfg.provider {
        ProviderKind::Gemini => {
            let api_key = cfg.resolve_api_key()?;
            if !cfg.is_known_model(&cfg.model) {
                tracing::warn!(model = %cfg.model, "model is not in the configured option list");
            }
            Ok(Box::new(gemini::Gemini {
                model: cfg.model.clone(),
                api_key,
                api_base: cfg.api_base.clone(),
                timeout,
            }))
        }
        ProviderKind::Ollama => Ok(Box::new(ollama::Ollama {
            model: cfg.model.clone(),
            url: cfg.ollama_url.clone(),
            timeout,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_without_key_is_config_error() {
        let cfg = Config {
            api_key_env: "ART_DIRECTOR_TEST_NO_SUCH_KEY".into(),
            ..Config::default()
        };
        assert!(matches!(make_client(&cfg), Err(StudioError::Config(_))));
    }

    #[test]
    fn gemini_with_inline_key() {
        let cfg = Config { api_key: Some("k".into()), ..Config::default() };
        let client = make_client(&cfg).unwrap();
        assert_eq!(client.model(), "gemini-1.5-flash");
    }

    #[test]
    fn ollama_needs_no_key() {
        let cfg = Config {
            provider: ProviderKind::Ollama,
            model: "llama3".into(),
            api_key_env: "ART_DIRECTOR_TEST_NO_SUCH_KEY".into(),
            ..Config::default()
        };
        assert_eq!(make_client(&cfg).unwrap().model(), "llama3");
    }
}
