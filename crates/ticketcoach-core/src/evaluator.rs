use anyhow::{Context, Result};
use ticketcoach_provider::CompletionGateway;
use ticketcoach_schema::EvaluationResult;

use crate::decoder::{decode_evaluation, decode_evaluation_strict};
use crate::prompts::{build_qa_prompt, QA_SYSTEM_PROMPT};
use crate::transcript::transcript_hash;

pub const DEFAULT_EVALUATION_TEMPERATURE: f32 = 0.2;

/// Scores one transcript against the QA rubric.
///
/// Holds no per-call state, so clones can run concurrently.
#[derive(Clone)]
pub struct Evaluator {
    gateway: CompletionGateway,
    temperature: f32,
    strict: bool,
}

impl Evaluator {
    pub fn new(gateway: CompletionGateway) -> Self {
        Self {
            gateway,
            temperature: DEFAULT_EVALUATION_TEMPERATURE,
            strict: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// `Err` only when the completion itself could not be obtained; an
    /// unparseable completion is a [`EvaluationResult::DecodeFailure`].
    pub async fn evaluate(&self, transcript: &str) -> Result<EvaluationResult> {
        let prompt = build_qa_prompt(transcript);
        tracing::debug!(
            hash = %transcript_hash(transcript),
            prompt_chars = prompt.len(),
            strict = self.strict,
            "evaluating transcript"
        );

        let raw = self
            .gateway
            .complete(QA_SYSTEM_PROMPT, &prompt, self.temperature)
            .await
            .context("evaluation request failed")?;

        let result = if self.strict {
            decode_evaluation_strict(&raw)
        } else {
            decode_evaluation(&raw)
        };
        if let Some(evaluation) = result.evaluation() {
            tracing::debug!(
                overall = evaluation.overall_rating.score,
                root_cause = %evaluation.root_cause.label,
                "evaluation decoded"
            );
        }
        Ok(result)
    }
}
