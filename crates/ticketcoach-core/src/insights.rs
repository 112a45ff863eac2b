use anyhow::{Context, Result};
use ticketcoach_provider::CompletionGateway;
use ticketcoach_schema::CoachingRecord;

use crate::kb_draft::DEFAULT_GENERATION_TEMPERATURE;
use crate::prompts::{build_insights_prompt, INSIGHTS_SYSTEM_PROMPT};

/// Rolls ticket-level coaching into one team-wide document.
#[derive(Clone)]
pub struct InsightsGenerator {
    gateway: CompletionGateway,
    temperature: f32,
}

impl InsightsGenerator {
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

    pub async fn synthesize(&self, records: &[CoachingRecord]) -> Result<String> {
        let prompt = build_insights_prompt(records);
        tracing::debug!(
            items = records.len(),
            prompt_chars = prompt.len(),
            "synthesizing team insights"
        );
        self.gateway
            .complete(INSIGHTS_SYSTEM_PROMPT, &prompt, self.temperature)
            .await
            .context("team insights request failed")
    }
}
