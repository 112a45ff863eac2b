pub mod gateway;
pub mod openai;
pub mod types;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gateway::CompletionGateway;
pub use openai::{OpenAiProvider, ProviderErrorKind};
pub use types::*;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse>;
}

// ============================================================
// Provider Configuration
// ============================================================

/// Provider type identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Ollama,
    OpenRouter,
    /// Custom OpenAI-compatible endpoint
    Custom,
    /// Offline echo provider, never leaves the process
    Stub,
}

impl ProviderType {
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::OpenRouter | Self::Custom)
    }
}

/// Configuration for a single provider instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider ID (e.g., "openai", "local-ollama")
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Custom base URL (optional, uses default for each provider type)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>, provider_type: ProviderType) -> Self {
        Self {
            id: id.into(),
            provider_type,
            api_key: None,
            base_url: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    fn require_api_key(&self) -> Result<String> {
        self.api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .ok_or_else(|| anyhow!("{} requires api_key", self.id))
    }
}

/// Create a provider from configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider_type {
        ProviderType::OpenAI => {
            let key = config.require_api_key()?;
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or("https://api.openai.com/v1");
            Arc::new(OpenAiProvider::new(key, base_url))
        }
        ProviderType::Ollama => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or("http://localhost:11434/v1");
            // Ollama ignores the key but the header must still be present
            Arc::new(OpenAiProvider::new("ollama", base_url))
        }
        ProviderType::OpenRouter => {
            let key = config.require_api_key()?;
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or("https://openrouter.ai/api/v1");
            Arc::new(OpenAiProvider::new(key, base_url))
        }
        ProviderType::Custom => {
            let key = config.require_api_key()?;
            let base_url = config
                .base_url
                .as_ref()
                .ok_or_else(|| anyhow!("custom provider requires base_url"))?;
            Arc::new(OpenAiProvider::new(key, base_url.clone()))
        }
        ProviderType::Stub => Arc::new(StubProvider),
    };
    tracing::debug!(provider = %config.id, kind = ?config.provider_type, "provider created");
    Ok(provider)
}

/// Echoes the model and the last user message back. Useful offline.
pub struct StubProvider;

#[async_trait]
impl LlmProvider for StubProvider {
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse> {
        Ok(LlmResponse::text(format!(
            "[stub:{}] {}",
            request.model,
            request.user_text()
        )))
    }
}
