use finstat_core::ingest::{
    map_columns, merge_statements, parse_amount, parse_fiscal_year, RawStatement,
    StatementField, StatementSource,
};
use finstat_core::{compute, FinancialRow, FinstatError, FinstatResult};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

/// Build raw statements from a header row and string cells, the way a table
/// reader would.
fn read_table(headers: &[&str], rows: &[&[&str]]) -> FinstatResult<Vec<RawStatement>> {
    let mapping = map_columns(headers);
    let year_idx = mapping.index_of(StatementField::Year).ok_or_else(|| {
        FinstatError::InvalidInput {
            field: "Year".into(),
            reason: "no year column".into(),
        }
    })?;

    rows.iter()
        .map(|cells| -> FinstatResult<RawStatement> {
            let mut statement = RawStatement::new(parse_fiscal_year(cells[year_idx])?);
            for col in mapping.columns.iter().filter(|c| c.field != StatementField::Year) {
                let cell = cells[col.index].trim();
                if !cell.is_empty() {
                    statement.values.insert(col.field, parse_amount(cell)?);
                }
            }
            Ok(statement)
        })
        .collect()
}

const HEADERS: [&str; 11] = [
    "Financial Year",
    "Sales",
    "Gross Profit",
    "EBITDA",
    "PAT",
    "Total Assets",
    "Borrowings",
    "Net Worth",
    "Current Assets",
    "Current Liabilities",
    "Cash Flow from Operations",
];

// ===========================================================================
// End-to-end
// ===========================================================================

#[test]
fn test_table_to_metrics() {
    let rows: [&[&str]; 2] = [
        &[
            "2021-22", "1,00,000", "40,000", "20,000", "8,000", "3,00,000", "50,000",
            "1,50,000", "60,000", "40,000", "12,000",
        ],
        &[
            "FY23", "1,20,000", "45,000", "22,000", "(2,000)", "3,20,000", "90,000",
            "1,40,000", "55,000", "50,000", "9,000",
        ],
    ];
    let statements = read_table(&HEADERS, &rows).unwrap();
    let financials: Vec<FinancialRow> = statements
        .into_iter()
        .map(RawStatement::into_row)
        .collect::<FinstatResult<_>>()
        .unwrap();

    assert_eq!(financials[0].year, 2022);
    assert_eq!(financials[1].year, 2023);
    assert_eq!(financials[1].net_profit, dec!(-2000));

    let (metrics, risks) = compute(&financials).unwrap();
    assert_eq!(metrics[1].revenue_growth, Some(dec!(0.2)));
    assert_eq!(metrics[1].current_ratio, Some(dec!(1.1)));

    let names = risks[1].flag_names();
    assert!(names.contains(&"negative_net_margin"));
    assert!(names.contains(&"cash_flow_divergence"));
    assert!(names.contains(&"debt_outpacing_revenue"));
}

#[test]
fn test_missing_required_column_rejected() {
    let headers = ["Year", "Revenue", "Net Profit"];
    let rows: [&[&str]; 1] = [&["2023", "100", "10"]];
    let statements = read_table(&headers, &rows).unwrap();
    let err = statements
        .into_iter()
        .next()
        .unwrap()
        .into_row()
        .unwrap_err();
    assert!(err.to_string().contains("Operating Cash Flow"));
}

#[test]
fn test_malformed_cell_rejected() {
    let rows: [&[&str]; 1] = [&[
        "2023", "abc", "1", "1", "1", "1", "1", "1", "1", "1", "1",
    ]];
    let err = read_table(&HEADERS, &rows).unwrap_err();
    assert!(matches!(err, FinstatError::InvalidInput { .. }));
}

#[test]
fn test_merge_single_year_files_then_compute() {
    let full = |year: i32, revenue| {
        StatementField::ALL
            .into_iter()
            .filter(|f| f.is_required() && *f != StatementField::Year)
            .fold(RawStatement::new(year), |s, f| s.with(f, dec!(100)))
            .with(StatementField::Revenue, revenue)
    };

    let sources = vec![
        StatementSource {
            label: "annual-report-2023".into(),
            statements: vec![full(2023, dec!(150)), full(2022, dec!(120))],
        },
        StatementSource {
            label: "annual-report-2022".into(),
            statements: vec![full(2022, dec!(100))],
        },
    ];

    let outcome = merge_statements(&sources);
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].year, 2022);
    assert_eq!(outcome.conflicts[0].field, StatementField::Revenue);

    let rows: Vec<FinancialRow> = outcome
        .statements
        .into_iter()
        .map(RawStatement::into_row)
        .collect::<FinstatResult<_>>()
        .unwrap();
    assert_eq!(rows.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2022, 2023]);
    // Later source wins: 2022 revenue is 100, so 2023 growth is 50%.
    let (metrics, _) = compute(&rows).unwrap();
    assert_eq!(metrics[1].revenue_growth, Some(dec!(0.5)));
}
