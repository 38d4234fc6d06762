//! Statement fields and header-to-field mapping.
//!
//! Uploaded tables rarely use our canonical headers. Each field carries an
//! alias list drawn from common Indian Schedule III and US GAAP captions, and
//! `map_columns` resolves headers in three passes: canonical name, alias, then
//! a normalised comparison that ignores case, punctuation and word order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementField {
    Year,
    Revenue,
    GrossProfit,
    Ebitda,
    NetProfit,
    TotalAssets,
    TotalDebt,
    Equity,
    CurrentAssets,
    CurrentLiabilities,
    OperatingCashFlow,
    DepreciationAmortisation,
    FinanceCosts,
    TaxExpense,
    Inventories,
    TradeReceivables,
    TradePayables,
    CostOfGoodsSold,
    ReservesAndSurplus,
    ShortTermBorrowings,
}

impl StatementField {
    pub const ALL: [StatementField; 20] = [
        StatementField::Year,
        StatementField::Revenue,
        StatementField::GrossProfit,
        StatementField::Ebitda,
        StatementField::NetProfit,
        StatementField::TotalAssets,
        StatementField::TotalDebt,
        StatementField::Equity,
        StatementField::CurrentAssets,
        StatementField::CurrentLiabilities,
        StatementField::OperatingCashFlow,
        StatementField::DepreciationAmortisation,
        StatementField::FinanceCosts,
        StatementField::TaxExpense,
        StatementField::Inventories,
        StatementField::TradeReceivables,
        StatementField::TradePayables,
        StatementField::CostOfGoodsSold,
        StatementField::ReservesAndSurplus,
        StatementField::ShortTermBorrowings,
    ];

    /// The documented header for this field.
    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Revenue => "Revenue",
            Self::GrossProfit => "Gross Profit",
            Self::Ebitda => "EBITDA",
            Self::NetProfit => "Net Profit",
            Self::TotalAssets => "Total Assets",
            Self::TotalDebt => "Total Debt",
            Self::Equity => "Equity",
            Self::CurrentAssets => "Current Assets",
            Self::CurrentLiabilities => "Current Liabilities",
            Self::OperatingCashFlow => "Operating Cash Flow",
            Self::DepreciationAmortisation => "Depreciation & Amortisation",
            Self::FinanceCosts => "Finance Costs",
            Self::TaxExpense => "Tax Expense",
            Self::Inventories => "Inventories",
            Self::TradeReceivables => "Trade Receivables",
            Self::TradePayables => "Trade Payables",
            Self::CostOfGoodsSold => "Cost of Goods Sold",
            Self::ReservesAndSurplus => "Reserves & Surplus",
            Self::ShortTermBorrowings => "Short Term Borrowings",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Year => &["Fiscal Year", "Financial Year", "FY", "Period"],
            Self::Revenue => &[
                "Revenue from Operations",
                "Total Revenue",
                "Sales",
                "Net Sales",
                "Gross Sales",
                "Turnover",
            ],
            Self::GrossProfit => &["Gross Income"],
            Self::Ebitda => &["PBDIT", "Operating EBITDA", "Operating Profit"],
            Self::NetProfit => &[
                "Profit After Tax",
                "PAT",
                "Net Income",
                "Profit for the Period",
            ],
            Self::TotalAssets => &["Assets", "Balance Sheet Total"],
            Self::TotalDebt => &["Total Borrowings", "Borrowings", "Debt"],
            Self::Equity => &[
                "Total Equity",
                "Shareholders Equity",
                "Shareholders' Equity",
                "Shareholders Funds",
                "Net Worth",
            ],
            Self::CurrentAssets => &["Total Current Assets"],
            Self::CurrentLiabilities => &["Total Current Liabilities"],
            Self::OperatingCashFlow => &[
                "Cash Flow from Operations",
                "Cash from Operating Activities",
                "Net Cash from Operating Activities",
                "CFO",
                "OCF",
            ],
            Self::DepreciationAmortisation => &[
                "Depreciation and Amortization",
                "Depreciation",
                "Amortisation",
                "D&A",
            ],
            Self::FinanceCosts => &["Interest Expense", "Interest", "Finance Charges"],
            Self::TaxExpense => &["Total Tax", "Income Tax", "Current Tax"],
            Self::Inventories => &["Inventory", "Stock", "Stock-in-Trade"],
            Self::TradeReceivables => &["Accounts Receivable", "Sundry Debtors", "Debtors"],
            Self::TradePayables => &["Accounts Payable", "Sundry Creditors", "Creditors"],
            Self::CostOfGoodsSold => &[
                "COGS",
                "Cost of Sales",
                "Cost of Revenue",
                "Cost of Materials Consumed",
            ],
            Self::ReservesAndSurplus => &["Other Equity", "Retained Earnings"],
            Self::ShortTermBorrowings => &[
                "Short-Term Borrowings",
                "Current Borrowings",
                "Short Term Debt",
                "STB",
            ],
        }
    }

    /// Year plus the ten core statement lines.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Self::Year
                | Self::Revenue
                | Self::GrossProfit
                | Self::Ebitda
                | Self::NetProfit
                | Self::TotalAssets
                | Self::TotalDebt
                | Self::Equity
                | Self::CurrentAssets
                | Self::CurrentLiabilities
                | Self::OperatingCashFlow
        )
    }
}

impl std::fmt::Display for StatementField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    Exact,
    Alias,
    Normalized,
    /// Year detected from a header containing "year" or "period".
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedColumn {
    pub field: StatementField,
    pub header: String,
    pub index: usize,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub columns: Vec<MappedColumn>,
    pub unmapped_headers: Vec<String>,
}

impl ColumnMapping {
    pub fn index_of(&self, field: StatementField) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.index)
    }

    pub fn missing_required(&self) -> Vec<StatementField> {
        StatementField::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.index_of(*f).is_none())
            .collect()
    }
}

/// Lowercase, spell out `&`, split on anything non-alphanumeric, sort tokens.
fn normalize(header: &str) -> String {
    let lowered = header.to_lowercase().replace('&', " and ");
    let mut tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Resolve each statement field to at most one header. A header is claimed
/// by at most one field; earlier passes win.
pub fn map_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let trimmed: Vec<&str> = headers.iter().map(|h| h.as_ref().trim()).collect();
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut columns: Vec<MappedColumn> = Vec::new();

    let mut claim = |field: StatementField,
                     method: MatchMethod,
                     matches: &dyn Fn(&str) -> bool,
                     claimed: &mut HashSet<usize>| {
        if columns.iter().any(|c| c.field == field) {
            return;
        }
        if let Some(index) = (0..trimmed.len())
            .find(|i| !claimed.contains(i) && matches(trimmed[*i]))
        {
            claimed.insert(index);
            columns.push(MappedColumn {
                field,
                header: trimmed[index].to_string(),
                index,
                method,
            });
        }
    };

    for field in StatementField::ALL {
        let canonical = field.canonical();
        claim(
            field,
            MatchMethod::Exact,
            &|h| h.eq_ignore_ascii_case(canonical),
            &mut claimed,
        );
    }
    for field in StatementField::ALL {
        let aliases = field.aliases();
        claim(
            field,
            MatchMethod::Alias,
            &|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)),
            &mut claimed,
        );
    }
    for field in StatementField::ALL {
        let targets: Vec<String> = std::iter::once(field.canonical())
            .chain(field.aliases().iter().copied())
            .map(normalize)
            .collect();
        claim(
            field,
            MatchMethod::Normalized,
            &|h| {
                let n = normalize(h);
                !n.is_empty() && targets.contains(&n)
            },
            &mut claimed,
        );
    }
    claim(
        StatementField::Year,
        MatchMethod::Heuristic,
        &|h| {
            let lower = h.to_lowercase();
            lower.contains("year") || lower.contains("period")
        },
        &mut claimed,
    );

    let unmapped_headers = trimmed
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed.contains(i))
        .map(|(_, h)| h.to_string())
        .collect();

    columns.sort_by_key(|c| c.field);
    ColumnMapping {
        columns,
        unmapped_headers,
    }
}
