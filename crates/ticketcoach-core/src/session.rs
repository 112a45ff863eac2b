//! One coaching session: the latest evaluation, its follow-up artefacts and
//! the accumulated history.
//!
//! The session never holds its state lock across a model call. A call that
//! fails in transport leaves the previous state exactly as it was.

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use ticketcoach_provider::{create_provider, CompletionGateway, LlmProvider};
use ticketcoach_schema::EvaluationResult;
use tokio::sync::Mutex;

use crate::config::TicketcoachConfig;
use crate::evaluator::Evaluator;
use crate::history::CoachingHistory;
use crate::insights::InsightsGenerator;
use crate::kb_draft::KbDrafter;

pub const AD_HOC_LABEL: &str = "Ad-hoc ticket";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("transcript is empty; paste a ticket before evaluating")]
    BlankTranscript,
    #[error("the last evaluation did not surface a content gap with a KB suggestion")]
    NoKbOpportunity,
    #[error("no coaching items recorded yet; evaluate some tickets first")]
    EmptyHistory,
}

/// Read model shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_label: Option<String>,
    pub last_result: Option<EvaluationResult>,
    pub last_transcript: Option<String>,
    pub kb_draft: Option<String>,
    pub team_insights: Option<String>,
}

impl SessionState {
    /// The KB suggestion of the last result, when drafting is allowed.
    pub fn kb_opportunity(&self) -> Option<&str> {
        let root_cause = &self.last_result.as_ref()?.evaluation()?.root_cause;
        root_cause
            .suggests_kb_article()
            .then_some(root_cause.kb_article_suggestion.as_str())
    }
}

#[derive(Clone)]
pub struct CoachingSession {
    evaluator: Evaluator,
    kb_drafter: KbDrafter,
    insights: InsightsGenerator,
    history: CoachingHistory,
    state: Arc<Mutex<SessionState>>,
}

impl CoachingSession {
    pub fn new(evaluator: Evaluator, kb_drafter: KbDrafter, insights: InsightsGenerator) -> Self {
        Self {
            evaluator,
            kb_drafter,
            insights,
            history: CoachingHistory::new(),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn from_config(config: &TicketcoachConfig) -> Result<Self> {
        let provider = create_provider(&config.provider)?;
        Ok(Self::with_provider(provider, config))
    }

    /// Wire every component to `provider` using the models and temperatures in `config`.
    pub fn with_provider(provider: Arc<dyn LlmProvider>, config: &TicketcoachConfig) -> Self {
        let eval_gateway = CompletionGateway::new(
            provider.clone(),
            config.evaluation.model.clone(),
            config.evaluation.max_tokens,
        );
        let generation_gateway = CompletionGateway::new(
            provider,
            config.generation_model().to_string(),
            config.generation.max_tokens,
        );

        let evaluator = Evaluator::new(eval_gateway)
            .with_temperature(config.evaluation.temperature)
            .with_strict_schema(config.evaluation.strict_schema);
        let kb_drafter = KbDrafter::new(generation_gateway.clone())
            .with_temperature(config.generation.temperature);
        let insights = InsightsGenerator::new(generation_gateway)
            .with_temperature(config.generation.temperature);

        Self::new(evaluator, kb_drafter, insights)
    }

    /// Evaluate `transcript` and make it the session's current ticket.
    pub async fn evaluate(&self, label: &str, transcript: &str) -> Result<EvaluationResult> {
        if transcript.trim().is_empty() {
            return Err(SessionError::BlankTranscript.into());
        }
        let label = match label.trim() {
            "" => AD_HOC_LABEL,
            label => label,
        };

        let result = self.evaluator.evaluate(transcript).await?;

        {
            let mut state = self.state.lock().await;
            state.current_label = Some(label.to_string());
            state.last_result = Some(result.clone());
            state.last_transcript = Some(transcript.to_string());
            state.kb_draft = None;
            state.team_insights = None;
        }

        if let Some(failure) = result.failure() {
            tracing::warn!(label, error = %failure.error, "evaluation could not be decoded");
        }
        self.history.record(label, transcript, &result).await;
        Ok(result)
    }

    pub async fn kb_opportunity(&self) -> Option<String> {
        self.state.lock().await.kb_opportunity().map(str::to_string)
    }

    /// Draft a KB article for the current ticket. Refused unless the last
    /// evaluation classified a content gap and suggested an article.
    pub async fn draft_kb_article(&self) -> Result<String> {
        let (transcript, suggestion) = {
            let state = self.state.lock().await;
            match (state.kb_opportunity(), state.last_transcript.as_deref()) {
                (Some(suggestion), Some(transcript)) => {
                    (transcript.to_string(), suggestion.to_string())
                }
                _ => return Err(SessionError::NoKbOpportunity.into()),
            }
        };

        let article = self.kb_drafter.draft_article(&transcript, &suggestion).await?;

        let mut state = self.state.lock().await;
        if state.last_transcript.as_deref() == Some(transcript.as_str()) {
            state.kb_draft = Some(article.clone());
        }
        Ok(article)
    }

    pub async fn team_insights(&self) -> Result<String> {
        let records = self.history.snapshot().await;
        if records.is_empty() {
            return Err(SessionError::EmptyHistory.into());
        }

        let insights = self.insights.synthesize(&records).await?;
        self.state.lock().await.team_insights = Some(insights.clone());
        Ok(insights)
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub fn history(&self) -> &CoachingHistory {
        &self.history
    }

    pub async fn reset(&self) {
        *self.state.lock().await = SessionState::default();
        self.history.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use ticketcoach_provider::{LlmRequest, LlmResponse};

    use super::*;

    /// Replies from a queue and remembers every request.
    #[derive(Default)]
    struct ScriptedProvider {
        replies: StdMutex<VecDeque<Result<String>>>,
        seen: StdMutex<Vec<LlmRequest>>,
    }

    impl ScriptedProvider {
        fn reply(self: Arc<Self>, text: impl Into<String>) -> Arc<Self> {
            self.replies.lock().unwrap().push_back(Ok(text.into()));
            self
        }

        fn fail(self: Arc<Self>) -> Arc<Self> {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(anyhow!("openai api error (connect) [retryable]: refused")));
            self
        }

        fn requests(&self) -> Vec<LlmRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(&self, request: LlmRequest) -> Result<LlmResponse> {
            self.seen.lock().unwrap().push(request);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted reply left")));
            next.map(LlmResponse::text)
        }
    }

    fn evaluation_json(label: &str, suggestion: &str, summary: &str) -> String {
        let c = serde_json::json!({"score": 3, "justification": "ok"});
        serde_json::json!({
            "criteria": {
                "technical_accuracy": c,
                "clarity_and_tone": c,
                "diagnostic_depth": c,
                "ownership_and_follow_through": c,
                "escalation_judgment": c
            },
            "overall_rating": {"score": 3, "justification": "ok"},
            "root_cause": {
                "label": label,
                "explanation": "because",
                "kb_article_suggestion": suggestion
            },
            "coaching_summary": summary
        })
        .to_string()
    }

    fn session(provider: Arc<ScriptedProvider>) -> CoachingSession {
        let gateway = CompletionGateway::new(provider, "test-model", 256);
        CoachingSession::new(
            Evaluator::new(gateway.clone()),
            KbDrafter::new(gateway.clone()),
            InsightsGenerator::new(gateway),
        )
    }

    fn is(err: &anyhow::Error, expected: SessionError) -> bool {
        err.downcast_ref::<SessionError>() == Some(&expected)
    }

    #[tokio::test]
    async fn blank_transcript_sends_nothing() {
        let provider = Arc::new(ScriptedProvider::default());
        let session = session(provider.clone());
        let err = session.evaluate("x", "  \n ").await.unwrap_err();
        assert!(is(&err, SessionError::BlankTranscript));
        assert!(provider.requests().is_empty());
        assert_eq!(session.state().await, SessionState::default());
    }

    #[tokio::test]
    async fn successful_evaluation_updates_state_and_history() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("agent_performance", "", "- Read history."));
        let session = session(provider.clone());

        let result = session.evaluate("", "Customer: charged twice").await.unwrap();
        assert!(result.is_well_formed());

        let state = session.state().await;
        assert_eq!(state.current_label.as_deref(), Some(AD_HOC_LABEL));
        assert_eq!(state.last_result, Some(result));
        assert_eq!(state.last_transcript.as_deref(), Some("Customer: charged twice"));
        assert_eq!(session.history().len().await, 1);

        let request = &provider.requests()[0];
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.user_text().contains("Customer: charged twice"));
    }

    #[tokio::test]
    async fn agent_performance_never_reaches_the_drafter() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("agent_performance", "", "- x"))
            .reply("# Should not be used");
        let session = session(provider.clone());
        session.evaluate("Billing", "Customer: again?").await.unwrap();

        assert_eq!(session.kb_opportunity().await, None);
        let err = session.draft_kb_article().await.unwrap_err();
        assert!(is(&err, SessionError::NoKbOpportunity));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn content_gap_without_suggestion_is_not_an_opportunity() {
        let provider =
            Arc::new(ScriptedProvider::default()).reply(evaluation_json("content_gap", " ", "- x"));
        let session = session(provider);
        session.evaluate("CSV", "Customer: limits?").await.unwrap();
        assert_eq!(session.kb_opportunity().await, None);
    }

    #[tokio::test]
    async fn content_gap_drafts_article_from_last_transcript() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("content_gap", "CSV bulk import limits", "- Escalate."))
            .reply("## Overview\nLimits for bulk import.");
        let session = session(provider.clone());
        session.evaluate("CSV", "Customer: limits?").await.unwrap();

        assert_eq!(
            session.kb_opportunity().await.as_deref(),
            Some("CSV bulk import limits")
        );
        let article = session.draft_kb_article().await.unwrap();
        assert_eq!(article, "## Overview\nLimits for bulk import.");
        assert_eq!(session.state().await.kb_draft.as_deref(), Some(article.as_str()));

        let requests = provider.requests();
        let kb_request = &requests[1];
        assert_eq!(kb_request.temperature, Some(0.4));
        assert!(kb_request.user_text().contains("\"\"\"CSV bulk import limits\"\"\""));
        assert!(kb_request.user_text().contains("\"\"\"Customer: limits?\"\"\""));
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_state() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("mixed", "Import limits", "- x"))
            .reply("article")
            .fail();
        let session = session(provider);
        session.evaluate("First", "Customer: one").await.unwrap();
        session.draft_kb_article().await.unwrap();
        let before = session.state().await;

        assert!(session.evaluate("Second", "Customer: two").await.is_err());
        assert_eq!(session.state().await, before);
        assert_eq!(session.history().len().await, 1);
    }

    #[tokio::test]
    async fn decode_failure_replaces_result_but_is_not_recorded() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("content_gap", "Limits", "- x"))
            .reply("Sorry, I can't help with that.");
        let session = session(provider);
        session.evaluate("First", "Customer: one").await.unwrap();

        let result = session.evaluate("Second", "Customer: two").await.unwrap();
        assert_eq!(
            result.failure().map(|f| f.raw_output.as_str()),
            Some("Sorry, I can't help with that.")
        );
        let state = session.state().await;
        assert_eq!(state.last_result, Some(result));
        assert_eq!(state.current_label.as_deref(), Some("Second"));
        assert_eq!(session.kb_opportunity().await, None);
        assert_eq!(session.history().len().await, 1);
    }

    #[tokio::test]
    async fn new_evaluation_clears_draft_and_insights() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("content_gap", "Limits", "- x"))
            .reply("article")
            .reply("insights")
            .reply(evaluation_json("agent_performance", "", "- y"));
        let session = session(provider);
        session.evaluate("a", "Customer: one").await.unwrap();
        session.draft_kb_article().await.unwrap();
        session.team_insights().await.unwrap();
        assert!(session.state().await.team_insights.is_some());

        session.evaluate("b", "Customer: two").await.unwrap();
        let state = session.state().await;
        assert_eq!(state.kb_draft, None);
        assert_eq!(state.team_insights, None);
    }

    #[tokio::test]
    async fn team_insights_requires_history() {
        let provider = Arc::new(ScriptedProvider::default());
        let session = session(provider.clone());
        let err = session.team_insights().await.unwrap_err();
        assert!(is(&err, SessionError::EmptyHistory));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn team_insights_sends_every_record() {
        let provider = Arc::new(ScriptedProvider::default())
            .reply(evaluation_json("agent_performance", "", "- Read prior tickets."))
            .reply(evaluation_json("content_gap", "Limits", "- Escalate for limits."))
            .reply("# Coaching Canon");
        let session = session(provider.clone());
        session.evaluate("Billing", "Customer: one").await.unwrap();
        session.evaluate("CSV", "Customer: two").await.unwrap();

        assert_eq!(session.team_insights().await.unwrap(), "# Coaching Canon");
        let prompt = provider.requests()[2].user_text().to_string();
        assert!(prompt.contains("- Ticket: Billing\n  - Root cause: agent_performance"));
        assert!(prompt.contains("- Ticket: CSV\n  - Root cause: content_gap"));
    }

    #[tokio::test]
    async fn reset_clears_state_and_history() {
        let provider =
            Arc::new(ScriptedProvider::default()).reply(evaluation_json("mixed", "x", "- y"));
        let session = session(provider);
        session.evaluate("a", "Customer: one").await.unwrap();
        session.reset().await;
        assert_eq!(session.state().await, SessionState::default());
        assert!(session.history().is_empty().await);
    }
}
