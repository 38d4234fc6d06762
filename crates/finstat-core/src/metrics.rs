//! Per-year ratio derivation.
//!
//! Every ratio is a `Ratio` (`Option<Decimal>`): a zero divisor, an absent
//! extended field, or a missing prior year all yield `None`. Nothing in this
//! module returns an error. All arithmetic uses `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::statements::FinancialRow;
use crate::types::{FiscalYear, Money, Ratio};

const DAYS_PER_YEAR: Decimal = dec!(365);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Derived metrics for a single fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub year: FiscalYear,
    // Growth (None for the first year)
    pub revenue_growth: Ratio,
    pub net_profit_growth: Ratio,
    pub ebitda_growth: Ratio,
    pub total_debt_growth: Ratio,
    pub operating_cash_flow_growth: Ratio,
    pub current_assets_growth: Ratio,
    pub short_term_borrowings_growth: Ratio,
    // Margins
    pub gross_margin: Ratio,
    pub ebitda_margin: Ratio,
    pub net_margin: Ratio,
    // Liquidity
    pub current_ratio: Ratio,
    // Leverage
    pub debt_to_equity: Ratio,
    pub debt_ratio: Ratio,
    // Returns
    pub return_on_equity: Ratio,
    pub return_on_assets: Ratio,
    // Cash flow
    pub operating_cash_flow_margin: Ratio,
    pub cash_flow_to_net_income: Ratio,
    // Extended (need optional statement lines)
    pub ebit: Option<Money>,
    pub return_on_capital_employed: Ratio,
    pub interest_coverage: Ratio,
    /// (net profit + D&A + finance costs) / finance costs; no principal data.
    pub debt_service_coverage: Ratio,
    pub inventory_turnover: Ratio,
    pub debtor_days: Ratio,
    pub creditor_days: Ratio,
    pub finance_cost_to_revenue: Ratio,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Null-propagating division. Zero divisor or overflow gives `None`.
pub fn safe_div(num: Decimal, den: Decimal) -> Ratio {
    if den.is_zero() {
        return None;
    }
    num.checked_div(den)
}

/// Year-over-year change relative to the magnitude of the prior value.
///
/// Using `|prior|` keeps the sign meaningful when the prior value is negative:
/// a loss of 50 narrowing to a loss of 20 is +60%, not -60%.
pub fn growth(current: Decimal, prior: Decimal) -> Ratio {
    safe_div(current.checked_sub(prior)?, prior.abs())
}

fn lookback(
    prior: Option<&FinancialRow>,
    current: Money,
    pick: impl Fn(&FinancialRow) -> Money,
) -> Ratio {
    prior.and_then(|p| growth(current, pick(p)))
}

/// Growth of an optional line; absent in either year gives `None`.
fn lookback_opt(
    prior: Option<&FinancialRow>,
    current: Option<Money>,
    pick: impl Fn(&FinancialRow) -> Option<Money>,
) -> Ratio {
    growth(current?, pick(prior?)?)
}

fn opt_div(num: Option<Decimal>, den: Option<Decimal>) -> Ratio {
    safe_div(num?, den?)
}

fn days(ratio: Ratio) -> Ratio {
    ratio?.checked_mul(DAYS_PER_YEAR)
}

/// EBIT from D&A when reported, else rebuilt from net profit, tax and finance costs.
fn derive_ebit(row: &FinancialRow) -> Option<Money> {
    if let Some(da) = row.depreciation_amortisation {
        return row.ebitda.checked_sub(da);
    }
    row.net_profit
        .checked_add(row.tax_expense?)?
        .checked_add(row.finance_costs?)
}

/// Cash available for interest: net profit with D&A and finance costs added back.
fn debt_service_cash(row: &FinancialRow) -> Option<Money> {
    row.net_profit
        .checked_add(row.depreciation_amortisation?)?
        .checked_add(row.finance_costs?)
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Derive the metric row for `row`, looking back at most one year.
pub fn compute_metric_row(row: &FinancialRow, prior: Option<&FinancialRow>) -> MetricRow {
    let ebit = derive_ebit(row);
    let capital_employed = row.total_assets.checked_sub(row.current_liabilities);

    MetricRow {
        year: row.year,
        revenue_growth: lookback(prior, row.revenue, |p| p.revenue),
        net_profit_growth: lookback(prior, row.net_profit, |p| p.net_profit),
        ebitda_growth: lookback(prior, row.ebitda, |p| p.ebitda),
        total_debt_growth: lookback(prior, row.total_debt, |p| p.total_debt),
        operating_cash_flow_growth: lookback(prior, row.operating_cash_flow, |p| p.operating_cash_flow),
        current_assets_growth: lookback(prior, row.current_assets, |p| p.current_assets),
        short_term_borrowings_growth: lookback_opt(prior, row.short_term_borrowings, |p| {
            p.short_term_borrowings
        }),

        gross_margin: safe_div(row.gross_profit, row.revenue),
        ebitda_margin: safe_div(row.ebitda, row.revenue),
        net_margin: safe_div(row.net_profit, row.revenue),

        current_ratio: safe_div(row.current_assets, row.current_liabilities),

        debt_to_equity: safe_div(row.total_debt, row.equity),
        debt_ratio: safe_div(row.total_debt, row.total_assets),

        return_on_equity: safe_div(row.net_profit, row.equity),
        return_on_assets: safe_div(row.net_profit, row.total_assets),

        operating_cash_flow_margin: safe_div(row.operating_cash_flow, row.revenue),
        cash_flow_to_net_income: safe_div(row.operating_cash_flow, row.net_profit),

        ebit,
        return_on_capital_employed: opt_div(ebit, capital_employed),
        interest_coverage: opt_div(ebit, row.finance_costs),
        debt_service_coverage: opt_div(debt_service_cash(row), row.finance_costs),
        inventory_turnover: opt_div(Some(row.revenue), row.inventories),
        debtor_days: days(opt_div(row.trade_receivables, Some(row.revenue))),
        creditor_days: days(opt_div(row.trade_payables, row.cost_of_goods_sold)),
        finance_cost_to_revenue: opt_div(row.finance_costs, Some(row.revenue)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_row(year: FiscalYear) -> FinancialRow {
        FinancialRow {
            year,
            revenue: dec!(1000),
            gross_profit: dec!(400),
            ebitda: dec!(250),
            net_profit: dec!(100),
            total_assets: dec!(2000),
            total_debt: dec!(600),
            equity: dec!(800),
            current_assets: dec!(500),
            current_liabilities: dec!(250),
            operating_cash_flow: dec!(180),
            ..FinancialRow::zeroed(year)
        }
    }

    #[test]
    fn test_safe_div_zero_is_none() {
        assert_eq!(safe_div(dec!(5), Decimal::ZERO), None);
        assert_eq!(safe_div(Decimal::ZERO, dec!(5)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_growth_uses_absolute_prior() {
        assert_eq!(growth(dec!(120), dec!(100)), Some(dec!(0.2)));
        assert_eq!(growth(dec!(-20), dec!(-50)), Some(dec!(0.6)));
        assert_eq!(growth(dec!(10), Decimal::ZERO), None);
    }

    #[test]
    fn test_margins_and_ratios() {
        let m = compute_metric_row(&base_row(2023), None);
        assert_eq!(m.gross_margin, Some(dec!(0.4)));
        assert_eq!(m.ebitda_margin, Some(dec!(0.25)));
        assert_eq!(m.net_margin, Some(dec!(0.1)));
        assert_eq!(m.current_ratio, Some(dec!(2)));
        assert_eq!(m.debt_to_equity, Some(dec!(0.75)));
        assert_eq!(m.debt_ratio, Some(dec!(0.3)));
        assert_eq!(m.return_on_equity, Some(dec!(0.125)));
        assert_eq!(m.return_on_assets, Some(dec!(0.05)));
        assert_eq!(m.operating_cash_flow_margin, Some(dec!(0.18)));
        assert_eq!(m.cash_flow_to_net_income, Some(dec!(1.8)));
    }

    #[test]
    fn test_first_year_has_no_growth() {
        let m = compute_metric_row(&base_row(2023), None);
        assert!(m.revenue_growth.is_none());
        assert!(m.net_profit_growth.is_none());
        assert!(m.ebitda_growth.is_none());
        assert!(m.total_debt_growth.is_none());
        assert!(m.operating_cash_flow_growth.is_none());
    }

    #[test]
    fn test_zero_revenue_nulls_margins() {
        let mut row = base_row(2023);
        row.revenue = Decimal::ZERO;
        let m = compute_metric_row(&row, None);
        assert!(m.gross_margin.is_none());
        assert!(m.ebitda_margin.is_none());
        assert!(m.net_margin.is_none());
        assert!(m.operating_cash_flow_margin.is_none());
        // Unaffected ratios still compute
        assert_eq!(m.current_ratio, Some(dec!(2)));
    }

    #[test]
    fn test_extended_ratios_absent_without_inputs() {
        let m = compute_metric_row(&base_row(2023), None);
        assert!(m.ebit.is_none());
        assert!(m.interest_coverage.is_none());
        assert!(m.return_on_capital_employed.is_none());
        assert!(m.inventory_turnover.is_none());
        assert!(m.debtor_days.is_none());
        assert!(m.creditor_days.is_none());
        assert!(m.finance_cost_to_revenue.is_none());
    }

    #[test]
    fn test_extended_ratios_with_inputs() {
        let mut row = base_row(2023);
        row.depreciation_amortisation = Some(dec!(50));
        row.finance_costs = Some(dec!(40));
        row.inventories = Some(dec!(200));
        row.trade_receivables = Some(dec!(100));
        row.trade_payables = Some(dec!(60));
        row.cost_of_goods_sold = Some(dec!(600));
        let m = compute_metric_row(&row, None);

        // EBIT = 250 - 50 = 200
        assert_eq!(m.ebit, Some(dec!(200)));
        // Capital employed = 2000 - 250 = 1750
        assert_eq!(m.return_on_capital_employed, Some(dec!(200) / dec!(1750)));
        assert_eq!(m.interest_coverage, Some(dec!(5)));
        assert_eq!(m.inventory_turnover, Some(dec!(5)));
        assert_eq!(m.debtor_days, Some(dec!(36.5)));
        assert_eq!(m.creditor_days, Some(dec!(36.5)));
        assert_eq!(m.finance_cost_to_revenue, Some(dec!(0.04)));
        // (100 + 50 + 40) / 40
        assert_eq!(m.debt_service_coverage, Some(dec!(4.75)));
    }

    #[test]
    fn test_debt_service_coverage_needs_all_lines() {
        let mut row = base_row(2023);
        row.finance_costs = Some(dec!(40));
        assert!(compute_metric_row(&row, None).debt_service_coverage.is_none());
        row.depreciation_amortisation = Some(dec!(50));
        row.finance_costs = Some(Decimal::ZERO);
        assert!(compute_metric_row(&row, None).debt_service_coverage.is_none());
    }

    #[test]
    fn test_short_term_borrowings_growth() {
        let mut prior = base_row(2022);
        prior.short_term_borrowings = Some(dec!(100));
        let mut row = base_row(2023);
        row.current_assets = dec!(550);
        row.short_term_borrowings = Some(dec!(150));

        let m = compute_metric_row(&row, Some(&prior));
        assert_eq!(m.short_term_borrowings_growth, Some(dec!(0.5)));
        assert_eq!(m.current_assets_growth, Some(dec!(0.1)));

        prior.short_term_borrowings = None;
        let m = compute_metric_row(&row, Some(&prior));
        assert!(m.short_term_borrowings_growth.is_none());
    }

    #[test]
    fn test_overflowing_arithmetic_is_undefined() {
        assert_eq!(growth(Decimal::MAX, -Decimal::MAX), None);
        assert_eq!(safe_div(Decimal::MAX, dec!(0.0001)), None);

        let mut prior = base_row(2022);
        prior.revenue = -Decimal::MAX;
        let mut row = base_row(2023);
        row.revenue = Decimal::MAX;
        row.ebitda = Decimal::MIN;
        row.depreciation_amortisation = Some(Decimal::MAX);
        row.total_assets = Decimal::MAX;
        row.current_liabilities = Decimal::MIN;

        let m = compute_metric_row(&row, Some(&prior));
        assert!(m.revenue_growth.is_none());
        assert!(m.ebit.is_none());
        assert!(m.return_on_capital_employed.is_none());
    }

    #[test]
    fn test_ebit_fallback_overflow_is_undefined() {
        let mut row = base_row(2023);
        row.net_profit = Decimal::MAX;
        row.tax_expense = Some(Decimal::MAX);
        row.finance_costs = Some(dec!(1));
        let m = compute_metric_row(&row, None);
        assert!(m.ebit.is_none());
        assert!(m.interest_coverage.is_none());
    }

    #[test]
    fn test_ebit_fallback_from_net_profit() {
        let mut row = base_row(2023);
        row.tax_expense = Some(dec!(30));
        row.finance_costs = Some(dec!(20));
        let m = compute_metric_row(&row, None);
        assert_eq!(m.ebit, Some(dec!(150)));
    }

    #[test]
    fn test_zero_finance_costs_coverage_undefined() {
        let mut row = base_row(2023);
        row.depreciation_amortisation = Some(dec!(50));
        row.finance_costs = Some(Decimal::ZERO);
        let m = compute_metric_row(&row, None);
        assert!(m.interest_coverage.is_none());
        assert_eq!(m.finance_cost_to_revenue, Some(Decimal::ZERO));
    }
}
