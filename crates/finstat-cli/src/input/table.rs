use finstat_core::ingest::{map_columns, parse_amount, parse_fiscal_year, RawStatement, StatementField};
use std::io::Read;

/// Rows read from one table, plus a `file:line: reason` entry per dropped row.
#[derive(Debug, Default)]
pub struct TableRead {
    pub statements: Vec<RawStatement>,
    pub skipped: Vec<String>,
}

/// Parse a CSV statement table into raw yearly statements.
///
/// Headers are mapped onto statement fields; unmapped columns are ignored.
/// A row with an unparsable year or amount fails the whole file unless
/// `skip_invalid` is set, in which case it is logged and reported in `skipped`.
pub fn read_statements<R: Read>(
    reader: R,
    label: &str,
    skip_invalid: bool,
) -> Result<TableRead, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mapping = map_columns(&headers);
    tracing::debug!(
        source = label,
        mapped = mapping.columns.len(),
        unmapped = ?mapping.unmapped_headers,
        "mapped columns"
    );

    let year_idx = mapping
        .index_of(StatementField::Year)
        .ok_or_else(|| format!("{}: no Year column among headers {:?}", label, headers))?;

    let mut out = TableRead::default();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let parsed = (|| -> Result<RawStatement, String> {
            let year_cell = record.get(year_idx).unwrap_or_default();
            let year = parse_fiscal_year(year_cell).map_err(|e| e.to_string())?;
            let mut statement = RawStatement::new(year);
            for col in mapping.columns.iter().filter(|c| c.field != StatementField::Year) {
                let cell = record.get(col.index).unwrap_or_default();
                if cell.is_empty() {
                    continue;
                }
                let value = parse_amount(cell).map_err(|e| format!("{} ({})", e, col.header))?;
                statement.values.insert(col.field, value);
            }
            Ok(statement)
        })();

        match parsed {
            Ok(statement) => out.statements.push(statement),
            Err(reason) if skip_invalid => {
                tracing::warn!(source = label, line, %reason, "skipping malformed row");
                out.skipped.push(format!("{}:{}: {}", label, line, reason));
            }
            Err(reason) => return Err(format!("{}:{}: {}", label, line, reason).into()),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CSV: &str = "\
Fiscal Year,Sales,Gross Profit,EBITDA,PAT,Total Assets,Borrowings,Net Worth,Current Assets,Current Liabilities,CFO,Remarks
2021-22,\"1,00,000\",40000,20000,8000,300000,50000,150000,60000,40000,12000,audited
FY23,120000,45000,22000,(2000),320000,90000,140000,55000,50000,9000,
";

    #[test]
    fn test_reads_mapped_columns() {
        let read = read_statements(CSV.as_bytes(), "test.csv", false).unwrap();
        assert!(read.skipped.is_empty());
        let statements = read.statements;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].year, 2022);
        assert_eq!(statements[0].get(StatementField::Revenue), Some(dec!(100000)));
        assert_eq!(statements[1].get(StatementField::NetProfit), Some(dec!(-2000)));
        assert_eq!(
            statements[1].get(StatementField::OperatingCashFlow),
            Some(dec!(9000))
        );
    }

    #[test]
    fn test_bad_row_fails_with_line() {
        let csv = "Year,Revenue\n2022,100\n2023,oops\n";
        let err = read_statements(csv.as_bytes(), "bad.csv", false).unwrap_err();
        assert!(err.to_string().starts_with("bad.csv:3:"), "{}", err);
    }

    #[test]
    fn test_bad_row_skipped_when_asked() {
        let csv = "Year,Revenue\n2022,100\nnext year,5\n2023,120\n";
        let read = read_statements(csv.as_bytes(), "skip.csv", true).unwrap();
        let years: Vec<i32> = read.statements.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2022, 2023]);
        assert_eq!(read.skipped.len(), 1);
        assert!(read.skipped[0].starts_with("skip.csv:3:"), "{}", read.skipped[0]);
    }

    #[test]
    fn test_missing_year_column() {
        let csv = "Revenue,EBITDA\n100,20\n";
        assert!(read_statements(csv.as_bytes(), "noyear.csv", false).is_err());
    }
}
