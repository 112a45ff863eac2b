use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use ticketcoach_provider::{ProviderConfig, ProviderType};

pub const CONFIG_FILE: &str = "main.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub env: String,
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_evaluation_temperature() -> f32 {
    0.2
}

fn default_generation_temperature() -> f32 {
    0.4
}

/// Settings for the scoring call. Low temperature keeps reruns close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_evaluation_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Reject out-of-range scores and stray KB suggestions as decode failures.
    #[serde(default)]
    pub strict_schema: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_evaluation_temperature(),
            max_tokens: default_max_tokens(),
            strict_schema: false,
        }
    }
}

/// Settings for the free-text calls (KB drafts, team insights).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Falls back to the evaluation model when unset.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_generation_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: default_generation_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketcoachConfig {
    pub app: AppConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl TicketcoachConfig {
    pub fn generation_model(&self) -> &str {
        self.generation
            .model
            .as_deref()
            .unwrap_or(&self.evaluation.model)
    }
}

/// Expand `${VAR}` placeholders from the environment; unset variables become empty.
pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let key = &candidate[..end];
        output.push_str(&std::env::var(key).unwrap_or_default());
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}

pub fn load_config(root: &Path) -> Result<TicketcoachConfig> {
    let mut config: TicketcoachConfig = read_yaml_file(&root.join(CONFIG_FILE))?;
    resolve_config_env(&mut config);
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &TicketcoachConfig) -> Result<()> {
    let provider = &config.provider;
    if provider.id.trim().is_empty() {
        return Err(anyhow!("provider.id must not be empty"));
    }
    if provider.provider_type.requires_api_key()
        && provider
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
    {
        return Err(anyhow!(
            "provider {} requires api_key (is the environment variable set?)",
            provider.id
        ));
    }
    if provider.provider_type == ProviderType::Custom && provider.base_url.is_none() {
        return Err(anyhow!("provider {} requires base_url", provider.id));
    }

    if config.evaluation.model.trim().is_empty() {
        return Err(anyhow!("evaluation.model must not be empty"));
    }
    check_temperature("evaluation.temperature", config.evaluation.temperature)?;
    check_temperature("generation.temperature", config.generation.temperature)?;
    if config.evaluation.max_tokens == 0 {
        return Err(anyhow!("evaluation.max_tokens must be greater than 0"));
    }
    if config.generation.max_tokens == 0 {
        return Err(anyhow!("generation.max_tokens must be greater than 0"));
    }

    Ok(())
}

fn check_temperature(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(anyhow!("{field} must be within [0, 1], got {value}"))
    }
}

fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse yaml file: {}", path.display()))
}

fn resolve_config_env(config: &mut TicketcoachConfig) {
    config.app.name = resolve_env_var(&config.app.name);
    config.app.env = resolve_env_var(&config.app.env);

    let provider = &mut config.provider;
    provider.id = resolve_env_var(&provider.id);
    if let Some(key) = &mut provider.api_key {
        *key = resolve_env_var(key);
    }
    if let Some(url) = &mut provider.base_url {
        *url = resolve_env_var(url);
    }

    config.evaluation.model = resolve_env_var(&config.evaluation.model);
    if let Some(model) = &mut config.generation.model {
        *model = resolve_env_var(model);
    }
}
