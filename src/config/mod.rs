use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::ProviderKind;
use crate::errors::StudioError;
use crate::identity::DEFAULT_NAMESPACE;
use crate::prompt;
use crate::wire::GenerationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of every project identifier.
    pub namespace: String,
    pub provider: ProviderKind,
    pub model: String,
    pub model_options: Vec<String>,
    pub generation: GenerationConfig,
    /// Replaces the built-in system instruction when set.
    pub system_prompt: Option<String>,
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub api_base: String,
    pub ollama_url: String,
    pub timeout_secs: u64,
    pub out_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.into(),
            provider: ProviderKind::Gemini,
            model: "gemini-1.5-flash".into(),
            model_options: vec![
                "gemini-1.5-pro".into(),
                "gemini-1.5-flash".into(),
                "gemini-2.0-flash-exp".into(),
            ],
            generation: GenerationConfig::default(),
            system_prompt: None,
            api_key_env: "GOOGLE_API_KEY".into(),
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com".into(),
            ollama_url: "http://localhost:11434".into(),
            timeout_secs: 120,
            out_dir: ".".into(),
        }
    }
}

impl Config {
    /// Read a TOML or YAML file (by extension). Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
        let cfg: Config = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&s)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg)
    }

    pub fn system_instruction(&self) -> String {
        match &self.system_prompt {
            Some(p) if !p.trim().is_empty() => p.clone(),
            _ => prompt::system_prompt(),
        }
    }

    /// Inline key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Result<String, StudioError> {
        if let Some(k) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(k.trim().to_string());
        }
        match std::env::var(&self.api_key_env) {
            Ok(k) if !k.trim().is_empty() => Ok(k.trim().to_string()),
            _ => Err(StudioError::Config(format!(
                "{} is not set; export it or put api_key in the config file",
                self.api_key_env
            ))),
        }
    }

    pub fn is_known_model(&self, model: &str) -> bool {
        self.model_options.iter().any(|m| m == model)
    }
}
