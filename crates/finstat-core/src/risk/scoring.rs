use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rules::{LabelThresholds, RedFlagKind, RiskConfig, MAX_SCORE};
use crate::metrics::MetricRow;
use crate::statements::FinancialRow;
use crate::types::FiscalYear;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    /// Map a clamped score onto the label bands. Total over [0, 100].
    pub fn from_score(score: Decimal, bands: &LabelThresholds) -> Self {
        if score >= bands.high_from {
            RiskLabel::High
        } else if score >= bands.medium_from {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub kind: RedFlagKind,
    pub description: String,
    pub points: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub year: FiscalYear,
    pub score: Decimal,
    pub label: RiskLabel,
    pub flags: Vec<RiskFlag>,
}

impl RiskAssessment {
    pub fn flag_names(&self) -> Vec<&'static str> {
        self.flags.iter().map(|f| f.kind.name()).collect()
    }
}

/// Score one year. `metrics` must have been derived from `row`.
pub fn assess(row: &FinancialRow, metrics: &MetricRow, config: &RiskConfig) -> RiskAssessment {
    let flags: Vec<RiskFlag> = RedFlagKind::ALL
        .into_iter()
        .filter_map(|kind| {
            kind.evaluate(row, metrics, &config.thresholds)
                .map(|description| RiskFlag {
                    kind,
                    description,
                    points: config.weights.weight(kind),
                })
        })
        .collect();

    // Weights are non-negative, so an overflowing sum is past the cap anyway.
    let score = flags
        .iter()
        .try_fold(Decimal::ZERO, |acc, f| acc.checked_add(f.points))
        .map_or(MAX_SCORE, |raw| raw.clamp(Decimal::ZERO, MAX_SCORE));
    let label = RiskLabel::from_score(score, &config.labels);

    RiskAssessment {
        year: row.year,
        score,
        label,
        flags,
    }
}
