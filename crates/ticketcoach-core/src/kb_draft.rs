use anyhow::{Context, Result};
use ticketcoach_provider::CompletionGateway;

use crate::prompts::{build_kb_prompt, KB_SYSTEM_PROMPT};

pub const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.4;

/// Turns a content-gap suggestion into a Markdown KB article.
#[derive(Clone)]
pub struct KbDrafter {
    gateway: CompletionGateway,
    temperature: f32,
}

impl KbDrafter {
    pub fn new(gateway: CompletionGateway) -> Self {
        Self {
            gateway,
            temperature: DEFAULT_GENERATION_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the completion verbatim.
    pub async fn draft_article(&self, transcript: &str, gap_suggestion: &str) -> Result<String> {
        let prompt = build_kb_prompt(transcript, gap_suggestion);
        tracing::debug!(prompt_chars = prompt.len(), "drafting kb article");
        self.gateway
            .complete(KB_SYSTEM_PROMPT, &prompt, self.temperature)
            .await
            .context("kb draft request failed")
    }
}
