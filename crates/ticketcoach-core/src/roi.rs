//! Back-of-the-envelope business impact of better coaching and docs.
//!
//! Two levers are modelled: cases deflected to self-serve (support cost) and
//! strategic accounts retained after high-risk tickets (revenue).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiInputs {
    pub monthly_tickets: u64,
    /// Fully loaded cost of one agent-handled case.
    pub avg_cost_per_case: f64,
    pub current_deflection_pct: f64,
    pub expected_deflection_uplift_pct: f64,
    pub high_risk_tickets_per_month: u64,
    pub revenue_per_strategic_account: f64,
    pub churn_prob_without_pct: f64,
    pub churn_prob_with_pct: f64,
}

impl Default for RoiInputs {
    fn default() -> Self {
        Self {
            monthly_tickets: 800,
            avg_cost_per_case: 35.0,
            current_deflection_pct: 20.0,
            expected_deflection_uplift_pct: 5.0,
            high_risk_tickets_per_month: 20,
            revenue_per_strategic_account: 50_000.0,
            churn_prob_without_pct: 10.0,
            churn_prob_with_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub annual_support_savings: f64,
    pub annual_revenue_preserved: f64,
    pub total_annual_impact: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoiError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} is a percentage and must be at most 100, got {value}")]
    PercentageAbove100 { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

impl RoiInputs {
    pub fn validate(&self) -> Result<(), RoiError> {
        let amounts = [
            ("avg_cost_per_case", self.avg_cost_per_case),
            ("revenue_per_strategic_account", self.revenue_per_strategic_account),
        ];
        let percentages = [
            ("current_deflection_pct", self.current_deflection_pct),
            ("expected_deflection_uplift_pct", self.expected_deflection_uplift_pct),
            ("churn_prob_without_pct", self.churn_prob_without_pct),
            ("churn_prob_with_pct", self.churn_prob_with_pct),
        ];

        for (field, value) in amounts.iter().chain(percentages.iter()).copied() {
            if !value.is_finite() {
                return Err(RoiError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(RoiError::Negative { field, value });
            }
        }
        for (field, value) in percentages {
            if value > 100.0 {
                return Err(RoiError::PercentageAbove100 { field, value });
            }
        }
        Ok(())
    }
}

pub fn compute_roi(inputs: &RoiInputs) -> Result<RoiReport, RoiError> {
    inputs.validate()?;

    let annual_tickets = inputs.monthly_tickets as f64 * 12.0;
    let handled_now = annual_tickets * (1.0 - inputs.current_deflection_pct / 100.0);
    let new_deflection =
        (inputs.current_deflection_pct + inputs.expected_deflection_uplift_pct).min(100.0);
    let handled_after = annual_tickets * (1.0 - new_deflection / 100.0);
    let deflected_cases = (handled_now - handled_after).max(0.0);
    let annual_support_savings = deflected_cases * inputs.avg_cost_per_case;

    let annual_high_risk = inputs.high_risk_tickets_per_month as f64 * 12.0;
    let churn_without = annual_high_risk * inputs.churn_prob_without_pct / 100.0;
    let churn_with = annual_high_risk * inputs.churn_prob_with_pct / 100.0;
    let accounts_retained = (churn_without - churn_with).max(0.0);
    let annual_revenue_preserved = accounts_retained * inputs.revenue_per_strategic_account;

    Ok(RoiReport {
        annual_support_savings,
        annual_revenue_preserved,
        total_annual_impact: annual_support_savings + annual_revenue_preserved,
    })
}

/// `1234567.8` -> `"$1,234,568"`.
pub fn format_dollars(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn defaults_produce_expected_report() {
        let report = compute_roi(&RoiInputs::default()).unwrap();
        // 9600 tickets/yr, 5 points more deflection -> 480 cases at $35.
        assert!(close(report.annual_support_savings, 16_800.0));
        // 240 high-risk tickets, 5 points less churn -> 12 accounts at $50k.
        assert!(close(report.annual_revenue_preserved, 600_000.0));
        assert!(close(report.total_annual_impact, 616_800.0));
    }

    #[test]
    fn deflection_is_capped_at_100() {
        let inputs = RoiInputs {
            current_deflection_pct: 90.0,
            expected_deflection_uplift_pct: 30.0,
            ..RoiInputs::default()
        };
        let report = compute_roi(&inputs).unwrap();
        // Only 10 points of headroom: 960 cases.
        assert!(close(report.annual_support_savings, 960.0 * 35.0));
    }

    #[test]
    fn worse_churn_does_not_go_negative() {
        let inputs = RoiInputs {
            churn_prob_without_pct: 5.0,
            churn_prob_with_pct: 10.0,
            ..RoiInputs::default()
        };
        let report = compute_roi(&inputs).unwrap();
        assert_eq!(report.annual_revenue_preserved, 0.0);
    }

    #[test]
    fn zero_volume_is_zero_impact() {
        let inputs = RoiInputs {
            monthly_tickets: 0,
            high_risk_tickets_per_month: 0,
            ..RoiInputs::default()
        };
        assert_eq!(compute_roi(&inputs).unwrap().total_annual_impact, 0.0);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let inputs = RoiInputs {
            avg_cost_per_case: -1.0,
            ..RoiInputs::default()
        };
        assert_eq!(
            compute_roi(&inputs).unwrap_err(),
            RoiError::Negative {
                field: "avg_cost_per_case",
                value: -1.0
            }
        );
    }

    #[test]
    fn percentage_above_100_is_rejected() {
        let inputs = RoiInputs {
            churn_prob_with_pct: 101.0,
            ..RoiInputs::default()
        };
        let err = compute_roi(&inputs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "churn_prob_with_pct is a percentage and must be at most 100, got 101"
        );
    }

    #[test]
    fn nan_is_rejected() {
        let inputs = RoiInputs {
            current_deflection_pct: f64::NAN,
            ..RoiInputs::default()
        };
        assert!(matches!(
            compute_roi(&inputs),
            Err(RoiError::NotFinite { .. })
        ));
    }

    #[test]
    fn dollars_are_grouped_by_thousands() {
        assert_eq!(format_dollars(0.0), "$0");
        assert_eq!(format_dollars(999.4), "$999");
        assert_eq!(format_dollars(16_800.0), "$16,800");
        assert_eq!(format_dollars(1_234_567.8), "$1,234,568");
        assert_eq!(format_dollars(-2500.0), "-$2,500");
    }
}
