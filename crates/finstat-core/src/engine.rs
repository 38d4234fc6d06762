//! Metric engine: derive ratios and risk assessments for a yearly series.
//!
//! The engine is stateless. Each call recomputes everything from the rows it
//! is given; the only cross-year dependency is the single prior-year lookback
//! used for growth ratios.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinstatError;
use crate::metrics::{compute_metric_row, MetricRow};
use crate::risk::{assess, RiskAssessment, RiskConfig};
use crate::statements::FinancialRow;
use crate::types::{with_metadata, ComputationOutput};
use crate::FinstatResult;

/// Years of history below which trend flags are considered thin.
const MIN_TREND_YEARS: usize = 3;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub rows: Vec<FinancialRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_config: Option<RiskConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub metrics: Vec<MetricRow>,
    pub risks: Vec<RiskAssessment>,
    /// Assessment for the most recent year, if any.
    pub latest: Option<RiskAssessment>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute metrics and risk assessments with the default rule set.
pub fn compute(rows: &[FinancialRow]) -> FinstatResult<(Vec<MetricRow>, Vec<RiskAssessment>)> {
    compute_with_config(rows, &RiskConfig::default())
}

/// Compute metrics and risk assessments with an explicit rule set.
///
/// Rows must be strictly ascending by year. An empty slice yields two empty
/// vectors.
pub fn compute_with_config(
    rows: &[FinancialRow],
    config: &RiskConfig,
) -> FinstatResult<(Vec<MetricRow>, Vec<RiskAssessment>)> {
    config.validate()?;
    validate_order(rows)?;

    let mut metrics = Vec::with_capacity(rows.len());
    let mut risks = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let prior = i.checked_sub(1).map(|p| &rows[p]);
        let m = compute_metric_row(row, prior);
        let r = assess(row, &m, config);
        tracing::debug!(
            year = row.year,
            score = %r.score,
            label = %r.label,
            flags = r.flags.len(),
            "assessed year"
        );
        metrics.push(m);
        risks.push(r);
    }

    Ok((metrics, risks))
}

/// Run the full analysis and wrap it in the standard output envelope.
pub fn analyze(input: &AnalysisInput) -> FinstatResult<ComputationOutput<AnalysisOutput>> {
    let start = Instant::now();
    let config = input.risk_config.clone().unwrap_or_default();

    let (metrics, risks) = compute_with_config(&input.rows, &config)?;
    let warnings = collect_warnings(&metrics);
    let latest = risks.last().cloned();

    let output = AnalysisOutput {
        metrics,
        risks,
        latest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Year-over-year ratio derivation with weighted red-flag scoring",
        &serde_json::json!({
            "years": input.rows.len(),
            "risk_config": config,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_order(rows: &[FinancialRow]) -> FinstatResult<()> {
    for pair in rows.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.year == prev.year {
            return Err(FinstatError::invalid(
                "year",
                format!("Duplicate fiscal year {}", next.year),
            ));
        }
        if next.year < prev.year {
            return Err(FinstatError::invalid(
                "year",
                format!(
                    "Rows must be in ascending year order ({} follows {})",
                    next.year, prev.year
                ),
            ));
        }
    }
    Ok(())
}

fn collect_warnings(metrics: &[MetricRow]) -> Vec<String> {
    let mut warnings = Vec::new();

    if !metrics.is_empty() && metrics.len() < MIN_TREND_YEARS {
        warnings.push(format!(
            "Only {} year(s) of data; trend analysis needs at least {} years.",
            metrics.len(),
            MIN_TREND_YEARS
        ));
    }

    for m in metrics {
        let mut undefined = Vec::new();
        if m.net_margin.is_none() {
            undefined.push("margins (zero revenue)");
        }
        if m.current_ratio.is_none() {
            undefined.push("current ratio (zero current liabilities)");
        }
        if m.debt_to_equity.is_none() {
            undefined.push("leverage and ROE (zero equity)");
        }
        if !undefined.is_empty() {
            warnings.push(format!("{}: undefined {}", m.year, undefined.join(", ")));
        }
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
