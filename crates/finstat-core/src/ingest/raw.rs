use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::schema::StatementField;
use crate::error::FinstatError;
use crate::statements::FinancialRow;
use crate::types::{FiscalYear, Money};
use crate::FinstatResult;

/// A possibly incomplete statement for one year, keyed by field.
///
/// Single-year uploads often carry only part of the statement; these are
/// merged before being promoted to a `FinancialRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    pub year: FiscalYear,
    pub values: BTreeMap<StatementField, Money>,
}

impl RawStatement {
    pub fn new(year: FiscalYear) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: StatementField, value: Money) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn get(&self, field: StatementField) -> Option<Money> {
        self.values.get(&field).copied()
    }

    /// Promote to a `FinancialRow`. Every missing core field is named in the error.
    pub fn into_row(self) -> FinstatResult<FinancialRow> {
        let missing: Vec<&str> = StatementField::ALL
            .iter()
            .filter(|f| f.is_required() && **f != StatementField::Year)
            .filter(|f| !self.values.contains_key(*f))
            .map(|f| f.canonical())
            .collect();
        if !missing.is_empty() {
            return Err(FinstatError::invalid(
                format!("{}", self.year),
                format!("Missing required fields: {}", missing.join(", ")),
            ));
        }

        let req = |field: StatementField| self.get(field).unwrap_or_default();
        Ok(FinancialRow {
            year: self.year,
            revenue: req(StatementField::Revenue),
            gross_profit: req(StatementField::GrossProfit),
            ebitda: req(StatementField::Ebitda),
            net_profit: req(StatementField::NetProfit),
            total_assets: req(StatementField::TotalAssets),
            total_debt: req(StatementField::TotalDebt),
            equity: req(StatementField::Equity),
            current_assets: req(StatementField::CurrentAssets),
            current_liabilities: req(StatementField::CurrentLiabilities),
            operating_cash_flow: req(StatementField::OperatingCashFlow),
            depreciation_amortisation: self.get(StatementField::DepreciationAmortisation),
            finance_costs: self.get(StatementField::FinanceCosts),
            tax_expense: self.get(StatementField::TaxExpense),
            inventories: self.get(StatementField::Inventories),
            trade_receivables: self.get(StatementField::TradeReceivables),
            trade_payables: self.get(StatementField::TradePayables),
            cost_of_goods_sold: self.get(StatementField::CostOfGoodsSold),
            reserves_and_surplus: self.get(StatementField::ReservesAndSurplus),
            short_term_borrowings: self.get(StatementField::ShortTermBorrowings),
        })
    }
}

impl From<&FinancialRow> for RawStatement {
    fn from(row: &FinancialRow) -> Self {
        let required = [
            (StatementField::Revenue, row.revenue),
            (StatementField::GrossProfit, row.gross_profit),
            (StatementField::Ebitda, row.ebitda),
            (StatementField::NetProfit, row.net_profit),
            (StatementField::TotalAssets, row.total_assets),
            (StatementField::TotalDebt, row.total_debt),
            (StatementField::Equity, row.equity),
            (StatementField::CurrentAssets, row.current_assets),
            (StatementField::CurrentLiabilities, row.current_liabilities),
            (StatementField::OperatingCashFlow, row.operating_cash_flow),
        ];
        let extended = [
            (StatementField::DepreciationAmortisation, row.depreciation_amortisation),
            (StatementField::FinanceCosts, row.finance_costs),
            (StatementField::TaxExpense, row.tax_expense),
            (StatementField::Inventories, row.inventories),
            (StatementField::TradeReceivables, row.trade_receivables),
            (StatementField::TradePayables, row.trade_payables),
            (StatementField::CostOfGoodsSold, row.cost_of_goods_sold),
            (StatementField::ReservesAndSurplus, row.reserves_and_surplus),
            (StatementField::ShortTermBorrowings, row.short_term_borrowings),
        ];

        let values = required
            .into_iter()
            .chain(
                extended
                    .into_iter()
                    .filter_map(|(field, value)| value.map(|v| (field, v))),
            )
            .collect();
        Self {
            year: row.year,
            values,
        }
    }
}
