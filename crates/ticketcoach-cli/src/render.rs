//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use ticketcoach_core::{format_dollars, PatternSnapshot, RoiReport};
use ticketcoach_schema::{Evaluation, EvaluationResult};

pub fn render_result(result: &EvaluationResult) -> String {
    match result {
        EvaluationResult::WellFormed(evaluation) => render_evaluation(evaluation),
        EvaluationResult::DecodeFailure(failure) => {
            format!(
                "error: {}\n\nRaw model output:\n{}\n",
                failure.error, failure.raw_output
            )
        }
    }
}

pub fn render_evaluation(evaluation: &Evaluation) -> String {
    let mut out = String::new();

    let overall = &evaluation.overall_rating;
    let _ = writeln!(out, "Overall rating: {} / 5", overall.score);
    if !overall.justification.trim().is_empty() {
        let _ = writeln!(out, "{}", overall.justification.trim());
    }

    let _ = writeln!(out, "\nCriteria");
    for (criterion, score) in evaluation.criteria.iter() {
        let _ = writeln!(
            out,
            "  {:<30} {}/5  {}",
            criterion.display_label(),
            score.score,
            score.justification.trim()
        );
    }

    let root = &evaluation.root_cause;
    let _ = writeln!(out, "\nRoot cause: {}", root.label);
    if !root.explanation.trim().is_empty() {
        let _ = writeln!(out, "{}", root.explanation.trim());
    }
    if root.suggests_kb_article() {
        let _ = writeln!(out, "KB article suggestion: {}", root.kb_article_suggestion.trim());
    }

    let summary = evaluation.coaching_summary.trim();
    if !summary.is_empty() {
        let _ = writeln!(out, "\nCoaching\n{summary}");
    }
    out
}

pub fn render_pattern_snapshot(snapshot: &PatternSnapshot) -> String {
    if snapshot.total == 0 {
        return "No coaching items captured in this session.\n".to_string();
    }
    format!(
        "{} unique ticket-level coaching summaries captured in this session.\n\nPattern snapshot\n{}",
        snapshot.total,
        snapshot.render()
    )
}

pub fn render_roi(report: &RoiReport) -> String {
    format!(
        "Headline impact (annualized)\n  Support cost savings (est.):               {}\n  Revenue preserved from lower churn (est.): {}\n  Total annual impact (est.):                {}\n",
        format_dollars(report.annual_support_savings),
        format_dollars(report.annual_revenue_preserved),
        format_dollars(report.total_annual_impact),
    )
}
