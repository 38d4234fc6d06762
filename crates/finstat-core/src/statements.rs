//! Annual financial-statement rows consumed by the metric engine.

use serde::{Deserialize, Serialize};

use crate::types::{FiscalYear, Money};

/// One fiscal year of statement data.
///
/// The ten core fields are required. The extended fields feed the optional
/// ratios (interest coverage, working-capital days, ROCE) and default to
/// absent when a source does not report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRow {
    pub year: FiscalYear,
    pub revenue: Money,
    pub gross_profit: Money,
    pub ebitda: Money,
    pub net_profit: Money,
    pub total_assets: Money,
    pub total_debt: Money,
    pub equity: Money,
    pub current_assets: Money,
    pub current_liabilities: Money,
    pub operating_cash_flow: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depreciation_amortisation: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance_costs: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_expense: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventories: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_receivables: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_payables: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_goods_sold: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserves_and_surplus: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_term_borrowings: Option<Money>,
}

impl FinancialRow {
    /// A row with every core field set to zero and no extended fields.
    pub fn zeroed(year: FiscalYear) -> Self {
        Self {
            year,
            revenue: Money::ZERO,
            gross_profit: Money::ZERO,
            ebitda: Money::ZERO,
            net_profit: Money::ZERO,
            total_assets: Money::ZERO,
            total_debt: Money::ZERO,
            equity: Money::ZERO,
            current_assets: Money::ZERO,
            current_liabilities: Money::ZERO,
            operating_cash_flow: Money::ZERO,
            depreciation_amortisation: None,
            finance_costs: None,
            tax_expense: None,
            inventories: None,
            trade_receivables: None,
            trade_payables: None,
            cost_of_goods_sold: None,
            reserves_and_surplus: None,
            short_term_borrowings: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_without_extended_fields() {
        let json = r#"{
            "year": 2023,
            "revenue": 1000, "gross_profit": 400, "ebitda": 200, "net_profit": 80,
            "total_assets": 2000, "total_debt": 500, "equity": 900,
            "current_assets": 600, "current_liabilities": 300,
            "operating_cash_flow": 150
        }"#;
        let row: FinancialRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.year, 2023);
        assert_eq!(row.revenue, dec!(1000));
        assert!(row.finance_costs.is_none());
        assert!(row.reserves_and_surplus.is_none());
    }

    #[test]
    fn test_negative_values_accepted() {
        let json = r#"{
            "year": 2020,
            "revenue": 0, "gross_profit": -10, "ebitda": -20, "net_profit": -35.5,
            "total_assets": 100, "total_debt": 150, "equity": -50,
            "current_assets": 10, "current_liabilities": 40,
            "operating_cash_flow": -5
        }"#;
        let row: FinancialRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.net_profit, dec!(-35.5));
        assert_eq!(row.equity, dec!(-50));
    }
}
