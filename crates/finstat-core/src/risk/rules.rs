//! Red-flag predicates, weights and label thresholds.
//!
//! Every predicate reads the year's raw statement fields and derived ratios.
//! A ratio that is `None` makes its predicate non-evaluable, which is treated
//! as "not triggered".

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinstatError;
use crate::metrics::MetricRow;
use crate::statements::FinancialRow;
use crate::FinstatResult;

/// Upper bound of the risk score.
pub const MAX_SCORE: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Flag enumeration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlagKind {
    LowLiquidity,
    HighLeverage,
    NegativeEquity,
    NegativeNetMargin,
    DecliningRevenue,
    NegativeOperatingCashFlow,
    CashFlowDivergence,
    DebtOutpacingRevenue,
    LowInterestCoverage,
    HighDebtorDays,
    HighFinanceCosts,
    NegativeReserves,
    StbOutpacingCurrentAssets,
}

/// Render a ratio as a percentage. Ratios too large to scale are shown as-is.
fn pct(ratio: Decimal) -> String {
    match ratio.checked_mul(dec!(100)) {
        Some(p) => format!("{:.2}%", p),
        None => format!("{}x", ratio),
    }
}

impl RedFlagKind {
    /// Evaluation order; also the order flags appear in an assessment.
    pub const ALL: [RedFlagKind; 13] = [
        RedFlagKind::LowLiquidity,
        RedFlagKind::HighLeverage,
        RedFlagKind::NegativeEquity,
        RedFlagKind::NegativeNetMargin,
        RedFlagKind::DecliningRevenue,
        RedFlagKind::NegativeOperatingCashFlow,
        RedFlagKind::CashFlowDivergence,
        RedFlagKind::DebtOutpacingRevenue,
        RedFlagKind::LowInterestCoverage,
        RedFlagKind::HighDebtorDays,
        RedFlagKind::HighFinanceCosts,
        RedFlagKind::NegativeReserves,
        RedFlagKind::StbOutpacingCurrentAssets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LowLiquidity => "low_liquidity",
            Self::HighLeverage => "high_leverage",
            Self::NegativeEquity => "negative_equity",
            Self::NegativeNetMargin => "negative_net_margin",
            Self::DecliningRevenue => "declining_revenue",
            Self::NegativeOperatingCashFlow => "negative_operating_cash_flow",
            Self::CashFlowDivergence => "cash_flow_divergence",
            Self::DebtOutpacingRevenue => "debt_outpacing_revenue",
            Self::LowInterestCoverage => "low_interest_coverage",
            Self::HighDebtorDays => "high_debtor_days",
            Self::HighFinanceCosts => "high_finance_costs",
            Self::NegativeReserves => "negative_reserves",
            Self::StbOutpacingCurrentAssets => "stb_outpacing_current_assets",
        }
    }

    /// Returns a human-readable explanation when the predicate fires.
    pub fn evaluate(
        &self,
        row: &FinancialRow,
        m: &MetricRow,
        th: &FlagThresholds,
    ) -> Option<String> {
        match self {
            Self::LowLiquidity => m
                .current_ratio
                .filter(|cr| *cr < th.min_current_ratio)
                .map(|cr| {
                    format!(
                        "Current ratio {:.2} is below {}; short-term obligations exceed liquid assets",
                        cr, th.min_current_ratio
                    )
                }),
            Self::HighLeverage => m
                .debt_to_equity
                .filter(|de| *de > th.max_debt_to_equity)
                .map(|de| {
                    format!(
                        "Debt-to-equity {:.2} exceeds {}, indicating high leverage",
                        de, th.max_debt_to_equity
                    )
                }),
            Self::NegativeEquity => (row.equity < Decimal::ZERO)
                .then(|| format!("Equity is negative ({}); liabilities exceed assets", row.equity)),
            Self::NegativeNetMargin => m
                .net_margin
                .filter(|nm| *nm < Decimal::ZERO)
                .map(|nm| format!("Net margin is negative ({})", pct(nm))),
            Self::DecliningRevenue => m
                .revenue_growth
                .filter(|g| *g < Decimal::ZERO)
                .map(|g| format!("Revenue declined {} year over year", pct(-g))),
            Self::NegativeOperatingCashFlow => (row.operating_cash_flow < Decimal::ZERO).then(|| {
                format!(
                    "Operating cash flow is negative ({}); operations consume cash",
                    row.operating_cash_flow
                )
            }),
            Self::CashFlowDivergence => match (m.revenue_growth, m.operating_cash_flow_growth) {
                (Some(rev), Some(ocf)) if rev > Decimal::ZERO && ocf < Decimal::ZERO => Some(
                    "Revenue is growing while operating cash flow is declining; \
                     earnings quality or revenue recognition may be aggressive"
                        .to_string(),
                ),
                _ => None,
            },
            Self::DebtOutpacingRevenue => match (m.total_debt_growth, m.revenue_growth) {
                (Some(debt), Some(rev)) if debt > Decimal::ZERO && debt > rev => Some(format!(
                    "Total debt grew {} against revenue growth of {}",
                    pct(debt),
                    pct(rev)
                )),
                _ => None,
            },
            Self::LowInterestCoverage => m
                .interest_coverage
                .filter(|ic| *ic < th.min_interest_coverage)
                .map(|ic| {
                    format!(
                        "Interest coverage {:.2}x is below {}x; debt service is at risk",
                        ic, th.min_interest_coverage
                    )
                }),
            Self::HighDebtorDays => m
                .debtor_days
                .filter(|d| *d > th.max_debtor_days)
                .map(|d| {
                    format!(
                        "Receivable days of {:.0} exceed {}, indicating working capital stress",
                        d, th.max_debtor_days
                    )
                }),
            Self::HighFinanceCosts => m
                .finance_cost_to_revenue
                .filter(|fc| *fc > th.max_finance_cost_to_revenue)
                .map(|fc| {
                    format!(
                        "Finance costs are {} of revenue, above the {} ceiling",
                        pct(fc),
                        pct(th.max_finance_cost_to_revenue)
                    )
                }),
            Self::NegativeReserves => row
                .reserves_and_surplus
                .filter(|r| *r < Decimal::ZERO)
                .map(|r| format!("Reserves & surplus is negative ({r}), indicating accumulated losses")),
            Self::StbOutpacingCurrentAssets => {
                match (m.short_term_borrowings_growth, m.current_assets_growth) {
                    (Some(stb), Some(ca)) if stb > Decimal::ZERO && stb > ca => Some(format!(
                        "Short-term borrowings grew {} against current asset growth of {}; \
                         potential liquidity mismatch",
                        pct(stb),
                        pct(ca)
                    )),
                    _ => None,
                }
            }
        }
    }
}

impl std::fmt::Display for RedFlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Points added to the score when a flag fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagWeights {
    pub low_liquidity: Decimal,
    pub high_leverage: Decimal,
    pub negative_equity: Decimal,
    pub negative_net_margin: Decimal,
    pub declining_revenue: Decimal,
    pub negative_operating_cash_flow: Decimal,
    pub cash_flow_divergence: Decimal,
    pub debt_outpacing_revenue: Decimal,
    pub low_interest_coverage: Decimal,
    pub high_debtor_days: Decimal,
    pub high_finance_costs: Decimal,
    pub negative_reserves: Decimal,
    pub stb_outpacing_current_assets: Decimal,
}

impl Default for FlagWeights {
    fn default() -> Self {
        Self {
            low_liquidity: dec!(20),
            high_leverage: dec!(20),
            negative_equity: dec!(25),
            negative_net_margin: dec!(20),
            declining_revenue: dec!(15),
            negative_operating_cash_flow: dec!(15),
            cash_flow_divergence: dec!(10),
            debt_outpacing_revenue: dec!(10),
            low_interest_coverage: dec!(10),
            high_debtor_days: dec!(5),
            high_finance_costs: dec!(10),
            negative_reserves: dec!(10),
            stb_outpacing_current_assets: dec!(10),
        }
    }
}

impl FlagWeights {
    pub fn weight(&self, kind: RedFlagKind) -> Decimal {
        match kind {
            RedFlagKind::LowLiquidity => self.low_liquidity,
            RedFlagKind::HighLeverage => self.high_leverage,
            RedFlagKind::NegativeEquity => self.negative_equity,
            RedFlagKind::NegativeNetMargin => self.negative_net_margin,
            RedFlagKind::DecliningRevenue => self.declining_revenue,
            RedFlagKind::NegativeOperatingCashFlow => self.negative_operating_cash_flow,
            RedFlagKind::CashFlowDivergence => self.cash_flow_divergence,
            RedFlagKind::DebtOutpacingRevenue => self.debt_outpacing_revenue,
            RedFlagKind::LowInterestCoverage => self.low_interest_coverage,
            RedFlagKind::HighDebtorDays => self.high_debtor_days,
            RedFlagKind::HighFinanceCosts => self.high_finance_costs,
            RedFlagKind::NegativeReserves => self.negative_reserves,
            RedFlagKind::StbOutpacingCurrentAssets => self.stb_outpacing_current_assets,
        }
    }
}

/// Cut-offs used by the ratio predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagThresholds {
    pub min_current_ratio: Decimal,
    pub max_debt_to_equity: Decimal,
    pub min_interest_coverage: Decimal,
    pub max_debtor_days: Decimal,
    pub max_finance_cost_to_revenue: Decimal,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            min_current_ratio: dec!(1.0),
            max_debt_to_equity: dec!(2.0),
            min_interest_coverage: dec!(1.5),
            max_debtor_days: dec!(90),
            max_finance_cost_to_revenue: dec!(0.08),
        }
    }
}

/// Lower bounds (inclusive) of the Medium and High bands. Anything below
/// `medium_from` is Low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub medium_from: Decimal,
    pub high_from: Decimal,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            medium_from: dec!(25),
            high_from: dec!(50),
        }
    }
}

/// Complete rule configuration. Partial files override only the keys they name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub weights: FlagWeights,
    pub thresholds: FlagThresholds,
    pub labels: LabelThresholds,
}

impl RiskConfig {
    /// Reject configurations that would break score monotonicity or leave
    /// gaps in the label bands.
    pub fn validate(&self) -> FinstatResult<()> {
        for kind in RedFlagKind::ALL {
            if self.weights.weight(kind) < Decimal::ZERO {
                return Err(FinstatError::invalid(
                    format!("weights.{}", kind.name()),
                    "Flag weight must be non-negative",
                ));
            }
        }

        let LabelThresholds {
            medium_from,
            high_from,
        } = self.labels;
        if medium_from <= Decimal::ZERO || medium_from > MAX_SCORE {
            return Err(FinstatError::invalid(
                "labels.medium_from",
                "Must lie in (0, 100]",
            ));
        }
        if high_from <= medium_from || high_from > MAX_SCORE {
            return Err(FinstatError::invalid(
                "labels.high_from",
                "Must be greater than medium_from and at most 100",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_metric_row;
    use rust_decimal_macros::dec;

    fn healthy_row(year: i32) -> FinancialRow {
        FinancialRow {
            revenue: dec!(1000),
            gross_profit: dec!(400),
            ebitda: dec!(200),
            net_profit: dec!(80),
            total_assets: dec!(2000),
            total_debt: dec!(500),
            equity: dec!(1000),
            current_assets: dec!(600),
            current_liabilities: dec!(300),
            operating_cash_flow: dec!(150),
            ..FinancialRow::zeroed(year)
        }
    }

    fn fired(row: &FinancialRow, prior: Option<&FinancialRow>) -> Vec<RedFlagKind> {
        let m = compute_metric_row(row, prior);
        let th = FlagThresholds::default();
        RedFlagKind::ALL
            .into_iter()
            .filter(|k| k.evaluate(row, &m, &th).is_some())
            .collect()
    }

    #[test]
    fn test_healthy_row_fires_nothing() {
        assert!(fired(&healthy_row(2023), None).is_empty());
    }

    #[test]
    fn test_low_liquidity_fires_below_one() {
        let mut row = healthy_row(2023);
        row.current_assets = dec!(200);
        assert_eq!(fired(&row, None), vec![RedFlagKind::LowLiquidity]);
    }

    #[test]
    fn test_current_ratio_of_exactly_one_is_not_flagged() {
        let mut row = healthy_row(2023);
        row.current_assets = dec!(300);
        assert!(fired(&row, None).is_empty());
    }

    #[test]
    fn test_null_current_ratio_does_not_fire() {
        let mut row = healthy_row(2023);
        row.current_liabilities = Decimal::ZERO;
        assert!(!fired(&row, None).contains(&RedFlagKind::LowLiquidity));
    }

    #[test]
    fn test_negative_equity_fires_without_leverage_flag() {
        let mut row = healthy_row(2023);
        row.equity = dec!(-100);
        let flags = fired(&row, None);
        assert!(flags.contains(&RedFlagKind::NegativeEquity));
        assert!(!flags.contains(&RedFlagKind::HighLeverage));
    }

    #[test]
    fn test_cross_year_flags() {
        let prior = healthy_row(2022);
        let mut row = healthy_row(2023);
        row.revenue = dec!(1100);
        row.operating_cash_flow = dec!(100);
        row.total_debt = dec!(700);
        let flags = fired(&row, Some(&prior));
        assert!(flags.contains(&RedFlagKind::CashFlowDivergence));
        assert!(flags.contains(&RedFlagKind::DebtOutpacingRevenue));
        assert!(!flags.contains(&RedFlagKind::DecliningRevenue));
    }

    #[test]
    fn test_extended_flags_need_extended_fields() {
        let mut row = healthy_row(2023);
        row.depreciation_amortisation = Some(dec!(150));
        row.finance_costs = Some(dec!(100));
        row.trade_receivables = Some(dec!(300));
        row.reserves_and_surplus = Some(dec!(-1));
        let flags = fired(&row, None);
        // EBIT 50 / finance costs 100 = 0.5x
        assert!(flags.contains(&RedFlagKind::LowInterestCoverage));
        // 300 / 1000 * 365 = 109.5 days
        assert!(flags.contains(&RedFlagKind::HighDebtorDays));
        // 100 / 1000 = 10% of revenue
        assert!(flags.contains(&RedFlagKind::HighFinanceCosts));
        assert!(flags.contains(&RedFlagKind::NegativeReserves));
    }

    #[test]
    fn test_short_term_borrowings_outpacing_current_assets() {
        let mut prior = healthy_row(2022);
        prior.short_term_borrowings = Some(dec!(100));
        let mut row = healthy_row(2023);
        row.short_term_borrowings = Some(dec!(130));
        row.current_assets = dec!(660);
        assert_eq!(
            fired(&row, Some(&prior)),
            vec![RedFlagKind::StbOutpacingCurrentAssets]
        );

        // Current assets keeping pace clears the flag
        row.current_assets = dec!(900);
        assert!(fired(&row, Some(&prior)).is_empty());

        // No prior-year figure, nothing to compare
        prior.short_term_borrowings = None;
        row.current_assets = dec!(660);
        assert!(fired(&row, Some(&prior)).is_empty());
    }

    #[test]
    fn test_huge_ratios_describe_without_overflow() {
        let mut row = healthy_row(2023);
        row.revenue = dec!(1);
        row.net_profit = dec!(-1_000_000_000_000_000_000_000_000_000);
        let m = compute_metric_row(&row, None);
        let description = RedFlagKind::NegativeNetMargin
            .evaluate(&row, &m, &FlagThresholds::default())
            .unwrap();
        assert!(description.ends_with("x)"), "{description}");

        assert_eq!(pct(dec!(0.125)), "12.50%");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(RiskConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut cfg = RiskConfig::default();
        cfg.weights.high_leverage = dec!(-5);
        match cfg.validate().unwrap_err() {
            FinstatError::InvalidInput { field, .. } => {
                assert_eq!(field, "weights.high_leverage");
            }
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_non_ascending_labels_rejected() {
        let mut cfg = RiskConfig::default();
        cfg.labels.high_from = dec!(20);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: RiskConfig =
            serde_json::from_str(r#"{"weights": {"low_liquidity": 40}}"#).unwrap();
        assert_eq!(cfg.weights.low_liquidity, dec!(40));
        assert_eq!(cfg.weights.high_leverage, dec!(20));
        assert_eq!(cfg.labels, LabelThresholds::default());
    }
}
