use ticketcoach_schema::{DecodeFailure, Evaluation, EvaluationResult};

/// Remove a surrounding Markdown code fence (with or without a `json` tag).
///
/// Text that does not start with a fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let cleaned = raw.trim();
    if !cleaned.starts_with("```") {
        return cleaned;
    }

    let cleaned = cleaned.trim_matches('`');
    match cleaned.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => cleaned[4..].trim(),
        _ => cleaned,
    }
}

/// Interpret a completion as an [`Evaluation`].
///
/// Never fails: anything that does not parse becomes a
/// [`DecodeFailure`] carrying the untouched input. Score ranges and the
/// root-cause/suggestion correlation are not checked here; see
/// [`decode_evaluation_strict`].
pub fn decode_evaluation(raw: &str) -> EvaluationResult {
    match serde_json::from_str::<Evaluation>(strip_code_fence(raw)) {
        Ok(evaluation) => EvaluationResult::WellFormed(evaluation),
        Err(err) => {
            tracing::warn!(raw_len = raw.len(), "model output is not a valid evaluation: {err}");
            EvaluationResult::DecodeFailure(DecodeFailure {
                error: format!("Failed to parse model output as JSON: {err}"),
                raw_output: raw.to_string(),
            })
        }
    }
}

/// Like [`decode_evaluation`], but rubric violations also become failures.
pub fn decode_evaluation_strict(raw: &str) -> EvaluationResult {
    let evaluation = match decode_evaluation(raw) {
        EvaluationResult::WellFormed(evaluation) => evaluation,
        failure @ EvaluationResult::DecodeFailure(_) => return failure,
    };

    let violations = evaluation.violations();
    if violations.is_empty() {
        return EvaluationResult::WellFormed(evaluation);
    }

    let details = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    tracing::warn!("model output violates evaluation schema: {details}");
    EvaluationResult::DecodeFailure(DecodeFailure {
        error: format!("Model output violates evaluation schema: {details}"),
        raw_output: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketcoach_schema::{
        Criteria, CriterionScore, OverallRating, RootCause, RootCauseLabel,
    };

    fn evaluation(label: RootCauseLabel, suggestion: &str) -> Evaluation {
        Evaluation {
            criteria: Criteria {
                technical_accuracy: CriterionScore::new(3, "Generic advice."),
                clarity_and_tone: CriterionScore::new(4, "Polite."),
                diagnostic_depth: CriterionScore::new(2, "Browser questions for a backend call."),
                ownership_and_follow_through: CriterionScore::new(2, "No next step."),
                escalation_judgment: CriterionScore::new(1, "Never escalated."),
            },
            overall_rating: OverallRating {
                score: 2,
                justification: "Struggled without documentation.".into(),
            },
            root_cause: RootCause {
                label,
                explanation: "No documented limits.".into(),
                kb_article_suggestion: suggestion.into(),
            },
            coaching_summary: "- Ask about the integration type.\n- Escalate for limits.".into(),
        }
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "\n{\"a\":1}\n");
        assert_eq!(strip_code_fence(""), "");
        assert_eq!(strip_code_fence("```"), "");
    }

    #[test]
    fn fenced_round_trip_recovers_original_record() {
        let original = evaluation(RootCauseLabel::ContentGap, "CSV bulk import limits");
        let raw = format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&original).unwrap()
        );
        assert_eq!(decode_evaluation(&raw), EvaluationResult::WellFormed(original));
    }

    #[test]
    fn bare_json_decodes() {
        let original = evaluation(RootCauseLabel::AgentPerformance, "");
        let raw = serde_json::to_string(&original).unwrap();
        assert_eq!(decode_evaluation(&raw).evaluation(), Some(&original));
    }

    #[test]
    fn truncated_output_is_failure_with_raw_text() {
        let full = serde_json::to_string(&evaluation(RootCauseLabel::Mixed, "x")).unwrap();
        let raw = format!("```json\n{}", &full[..full.len() / 2]);
        let failure = decode_evaluation(&raw).failure().cloned().unwrap();
        assert_eq!(failure.raw_output, raw);
        assert!(failure.error.starts_with("Failed to parse model output as JSON"));
    }

    #[test]
    fn trailing_prose_is_failure_with_raw_text() {
        let json = serde_json::to_string(&evaluation(RootCauseLabel::Mixed, "x")).unwrap();
        let raw = format!("  {json}\n\nLet me know if you need anything else!  ");
        let failure = decode_evaluation(&raw).failure().cloned().unwrap();
        assert_eq!(failure.raw_output, raw);
    }

    #[test]
    fn empty_output_is_failure() {
        let result = decode_evaluation("");
        assert_eq!(result.failure().unwrap().raw_output, "");
    }

    #[test]
    fn wrong_shape_is_failure() {
        let result = decode_evaluation(r#"{"criteria": [], "coaching_summary": 3}"#);
        assert!(!result.is_well_formed());
    }

    #[test]
    fn lenient_mode_passes_out_of_range_scores() {
        let mut bad = evaluation(RootCauseLabel::AgentPerformance, "Billing FAQ");
        bad.criteria.clarity_and_tone.score = 9;
        let raw = serde_json::to_string(&bad).unwrap();
        assert_eq!(decode_evaluation(&raw).evaluation(), Some(&bad));
    }

    #[test]
    fn strict_mode_folds_violations_into_failure() {
        let mut bad = evaluation(RootCauseLabel::AgentPerformance, "Billing FAQ");
        bad.criteria.clarity_and_tone.score = 9;
        let raw = serde_json::to_string(&bad).unwrap();
        let failure = decode_evaluation_strict(&raw).failure().cloned().unwrap();
        assert!(failure.error.contains("clarity_and_tone score 9"));
        assert!(failure.error.contains("kb_article_suggestion must be empty"));
        assert_eq!(failure.raw_output, raw);
    }

    #[test]
    fn strict_mode_accepts_valid_output() {
        let good = evaluation(RootCauseLabel::ContentGap, "CSV limits");
        let raw = format!("```json\n{}\n```", serde_json::to_string(&good).unwrap());
        assert_eq!(decode_evaluation_strict(&raw).evaluation(), Some(&good));
    }
}
