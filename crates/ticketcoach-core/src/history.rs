//! Session-scoped coaching history, deduplicated by transcript content.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use ticketcoach_schema::{CoachingRecord, EvaluationResult, RootCauseLabel, ROOT_CAUSE_UNKNOWN};
use tokio::sync::Mutex;

use crate::transcript::transcript_hash;

#[derive(Debug, Default)]
struct HistoryInner {
    seen: HashSet<String>,
    records: Vec<CoachingRecord>,
}

/// Cloneable handle; all clones share one store.
#[derive(Debug, Clone, Default)]
pub struct CoachingHistory {
    inner: Arc<Mutex<HistoryInner>>,
}

impl CoachingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the coaching outcome of `transcript` unless that exact text was
    /// already recorded. Decode failures and blank summaries are skipped.
    pub async fn record(&self, label: &str, transcript: &str, result: &EvaluationResult) -> bool {
        let Some(evaluation) = result.evaluation() else {
            return false;
        };
        if evaluation.coaching_summary.trim().is_empty() {
            tracing::debug!(label, "evaluation has no coaching summary, not recorded");
            return false;
        }
        let record = CoachingRecord::from_evaluation(label, evaluation);
        self.record_item(transcript_hash(transcript), record).await
    }

    pub async fn record_item(&self, hash: String, record: CoachingRecord) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.seen.insert(hash.clone()) {
            tracing::debug!(hash = %hash, "transcript already in coaching history");
            return false;
        }
        tracing::info!(
            label = %record.label,
            root_cause = %record.root_cause,
            overall_score = record.overall_score,
            "coaching item recorded"
        );
        inner.records.push(record);
        true
    }

    pub async fn snapshot(&self) -> Vec<CoachingRecord> {
        self.inner.lock().await.records.clone()
    }

    pub async fn counts_by_root_cause(&self) -> BTreeMap<String, usize> {
        let inner = self.inner.lock().await;
        let mut counts = BTreeMap::new();
        for record in &inner.records {
            *counts
                .entry(record.root_cause_bucket().to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    pub async fn pattern_snapshot(&self) -> PatternSnapshot {
        PatternSnapshot::from_counts(&self.counts_by_root_cause().await)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.records.is_empty()
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.seen.clear();
        inner.records.clear();
    }
}

/// Root-cause mix of the recorded tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternSnapshot {
    pub total: usize,
    pub agent_performance: usize,
    pub content_gap: usize,
    pub mixed: usize,
    pub unknown: usize,
}

impl PatternSnapshot {
    pub fn from_counts(counts: &BTreeMap<String, usize>) -> Self {
        let get = |key: &str| counts.get(key).copied().unwrap_or(0);
        Self {
            total: counts.values().sum(),
            agent_performance: get(RootCauseLabel::AgentPerformance.as_str()),
            content_gap: get(RootCauseLabel::ContentGap.as_str()),
            mixed: get(RootCauseLabel::Mixed.as_str()),
            unknown: get(ROOT_CAUSE_UNKNOWN),
        }
    }

    /// Share of tickets that surfaced a documentation gap (pure or mixed).
    pub fn content_gap_share(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.content_gap + self.mixed) as f64 / self.total as f64
    }

    /// Markdown bullets, one per non-empty bucket, plus the share line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.agent_performance > 0 {
            let _ = writeln!(
                out,
                "- {} cases are primarily **agent-performance** (coaching and process issues).",
                self.agent_performance
            );
        }
        if self.content_gap > 0 {
            let _ = writeln!(
                out,
                "- {} cases are primarily **content-gaps** (deflectable via better docs).",
                self.content_gap
            );
        }
        if self.mixed > 0 {
            let _ = writeln!(
                out,
                "- {} cases are **mixed** (both coaching and docs).",
                self.mixed
            );
        }
        if self.total > 0 {
            let _ = writeln!(
                out,
                "\nAbout **{:.0}%** of evaluated tickets surfaced documentation or mixed content gaps.",
                self.content_gap_share() * 100.0
            );
        }
        out
    }
}
