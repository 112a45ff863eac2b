//! Single-shot completion over one provider and model.
//!
//! The gateway is the only place a request leaves the process. It sends one
//! system instruction and one user prompt and hands back the raw completion
//! text. Transport failures are returned as errors, never retried.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::{LlmMessage, LlmProvider, LlmRequest};

#[derive(Clone)]
pub struct CompletionGateway {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    pub async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(anyhow!("temperature must be within [0, 1], got {temperature}"));
        }

        let request = LlmRequest {
            model: self.model.clone(),
            system: Some(system_instruction.to_string()),
            messages: vec![LlmMessage::user(user_prompt)],
            max_tokens: self.max_tokens,
            temperature: Some(temperature),
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = user_prompt.len(),
            temperature,
            "sending completion request"
        );

        let response = self.provider.chat(request).await.map_err(|err| {
            tracing::warn!(model = %self.model, "completion failed: {err}");
            err
        })?;

        tracing::debug!(
            model = %self.model,
            input_tokens = ?response.input_tokens,
            output_tokens = ?response.output_tokens,
            stop_reason = ?response.stop_reason,
            "completion received"
        );

        Ok(response.text)
    }
}
