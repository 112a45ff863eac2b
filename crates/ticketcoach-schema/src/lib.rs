use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bucket used when a stored root cause is blank or not one of the known labels.
pub const ROOT_CAUSE_UNKNOWN: &str = "unknown";

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

// ============================================================
// Ticket ingestion
// ============================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketComment {
    #[serde(default)]
    pub author_role: String,
    #[serde(default)]
    pub body: String,
}

impl TicketComment {
    pub fn new(author_role: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author_role: author_role.into(),
            body: body.into(),
        }
    }
}

/// Ticket as exported by a helpdesk: optional subject plus ordered comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub comments: Vec<TicketComment>,
}

// ============================================================
// Evaluation schema
// ============================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    TechnicalAccuracy,
    ClarityAndTone,
    DiagnosticDepth,
    OwnershipAndFollowThrough,
    EscalationJudgment,
}

impl Criterion {
    /// Rubric order.
    pub const ALL: [Criterion; 5] = [
        Criterion::TechnicalAccuracy,
        Criterion::ClarityAndTone,
        Criterion::DiagnosticDepth,
        Criterion::OwnershipAndFollowThrough,
        Criterion::EscalationJudgment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicalAccuracy => "technical_accuracy",
            Self::ClarityAndTone => "clarity_and_tone",
            Self::DiagnosticDepth => "diagnostic_depth",
            Self::OwnershipAndFollowThrough => "ownership_and_follow_through",
            Self::EscalationJudgment => "escalation_judgment",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            Self::TechnicalAccuracy => "Technical Accuracy",
            Self::ClarityAndTone => "Clarity And Tone",
            Self::DiagnosticDepth => "Diagnostic Depth",
            Self::OwnershipAndFollowThrough => "Ownership And Follow Through",
            Self::EscalationJudgment => "Escalation Judgment",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CriterionScore {
    pub score: i64,
    #[serde(default)]
    pub justification: String,
}

impl CriterionScore {
    pub fn new(score: i64, justification: impl Into<String>) -> Self {
        Self {
            score,
            justification: justification.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Criteria {
    pub technical_accuracy: CriterionScore,
    pub clarity_and_tone: CriterionScore,
    pub diagnostic_depth: CriterionScore,
    pub ownership_and_follow_through: CriterionScore,
    pub escalation_judgment: CriterionScore,
}

impl Criteria {
    pub fn get(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::TechnicalAccuracy => &self.technical_accuracy,
            Criterion::ClarityAndTone => &self.clarity_and_tone,
            Criterion::DiagnosticDepth => &self.diagnostic_depth,
            Criterion::OwnershipAndFollowThrough => &self.ownership_and_follow_through,
            Criterion::EscalationJudgment => &self.escalation_judgment,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &CriterionScore)> + '_ {
        Criterion::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverallRating {
    pub score: i64,
    /// Two or three sentences; length is advisory.
    #[serde(default)]
    pub justification: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RootCauseLabel {
    AgentPerformance,
    ContentGap,
    Mixed,
}

impl RootCauseLabel {
    pub const ALL: [RootCauseLabel; 3] = [
        RootCauseLabel::AgentPerformance,
        RootCauseLabel::ContentGap,
        RootCauseLabel::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgentPerformance => "agent_performance",
            Self::ContentGap => "content_gap",
            Self::Mixed => "mixed",
        }
    }

    /// Labels that point at missing documentation.
    pub fn involves_content_gap(&self) -> bool {
        matches!(self, Self::ContentGap | Self::Mixed)
    }
}

impl fmt::Display for RootCauseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootCauseLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s.trim())
            .ok_or_else(|| format!("unknown root cause label: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootCause {
    pub label: RootCauseLabel,
    #[serde(default)]
    pub explanation: String,
    /// Empty for `agent_performance`; a title and outline otherwise.
    #[serde(default)]
    pub kb_article_suggestion: String,
}

impl RootCause {
    /// Whether a KB draft should be offered for this classification.
    pub fn suggests_kb_article(&self) -> bool {
        self.label.involves_content_gap() && !self.kb_article_suggestion.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evaluation {
    pub criteria: Criteria,
    pub overall_rating: OverallRating,
    pub root_cause: RootCause,
    #[serde(default)]
    pub coaching_summary: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("{field} score {score} is outside 1..=5")]
    ScoreOutOfRange { field: String, score: i64 },
    #[error("kb_article_suggestion must be empty when root cause is agent_performance")]
    UnexpectedKbSuggestion,
}

impl Evaluation {
    /// Every rubric invariant the model was asked to honour but did not.
    pub fn violations(&self) -> Vec<SchemaViolation> {
        let mut out = Vec::new();

        let scores = self
            .criteria
            .iter()
            .map(|(c, s)| (c.as_str(), s.score))
            .chain(std::iter::once(("overall_rating", self.overall_rating.score)));
        for (field, score) in scores {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                out.push(SchemaViolation::ScoreOutOfRange {
                    field: field.to_string(),
                    score,
                });
            }
        }

        if self.root_cause.label == RootCauseLabel::AgentPerformance
            && !self.root_cause.kb_article_suggestion.trim().is_empty()
        {
            out.push(SchemaViolation::UnexpectedKbSuggestion);
        }

        out
    }
}

/// Model output that could not be interpreted as an [`Evaluation`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecodeFailure {
    pub error: String,
    /// Completion text exactly as received, for operator inspection.
    pub raw_output: String,
}

/// Outcome of one evaluation call. Callers must handle both branches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EvaluationResult {
    WellFormed(Evaluation),
    DecodeFailure(DecodeFailure),
}

impl EvaluationResult {
    pub fn is_well_formed(&self) -> bool {
        matches!(self, Self::WellFormed(_))
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            Self::WellFormed(evaluation) => Some(evaluation),
            Self::DecodeFailure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&DecodeFailure> {
        match self {
            Self::WellFormed(_) => None,
            Self::DecodeFailure(failure) => Some(failure),
        }
    }
}

impl From<Evaluation> for EvaluationResult {
    fn from(evaluation: Evaluation) -> Self {
        Self::WellFormed(evaluation)
    }
}

impl From<DecodeFailure> for EvaluationResult {
    fn from(failure: DecodeFailure) -> Self {
        Self::DecodeFailure(failure)
    }
}

// ============================================================
// Coaching history
// ============================================================

/// One ticket's evaluation outcome kept for the team rollup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoachingRecord {
    pub label: String,
    pub overall_score: i64,
    pub root_cause: String,
    pub coaching_summary: String,
}

impl CoachingRecord {
    pub fn from_evaluation(label: impl Into<String>, evaluation: &Evaluation) -> Self {
        Self {
            label: label.into(),
            overall_score: evaluation.overall_rating.score,
            root_cause: evaluation.root_cause.label.as_str().to_string(),
            coaching_summary: evaluation.coaching_summary.clone(),
        }
    }

    /// Root cause bucket for tallies; anything unrecognised is `unknown`.
    pub fn root_cause_bucket(&self) -> &str {
        match self.root_cause.parse::<RootCauseLabel>() {
            Ok(label) => label.as_str(),
            Err(_) => ROOT_CAUSE_UNKNOWN,
        }
    }
}
