pub mod file;
pub mod stdin;
pub mod table;

use serde::Deserialize;

use finstat_core::ingest::{merge_statements, RawStatement, RestatementConflict, StatementSource};
use finstat_core::{AnalysisInput, FinancialRow, FinstatError, RiskConfig};

/// JSON inputs may be a bare array of rows or a full analysis request.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Rows(Vec<FinancialRow>),
    Analysis(AnalysisInput),
}

impl JsonInput {
    fn into_parts(self) -> (Vec<FinancialRow>, Option<RiskConfig>) {
        match self {
            JsonInput::Rows(rows) => (rows, None),
            JsonInput::Analysis(a) => (a.rows, a.risk_config),
        }
    }
}

/// Everything the analysis commands need, gathered from files or stdin.
pub struct LoadedInput {
    pub rows: Vec<FinancialRow>,
    pub risk_config: Option<RiskConfig>,
    pub conflicts: Vec<RestatementConflict>,
    pub skipped: Vec<String>,
}

/// One input file as a labelled source, with any embedded rule set and the
/// rows dropped under `--skip-invalid`.
pub struct SourceRead {
    pub source: StatementSource,
    pub risk_config: Option<RiskConfig>,
    pub skipped: Vec<String>,
}

/// Read one file into a labelled source of raw statements.
pub fn read_source(path: &str, skip_invalid: bool) -> Result<SourceRead, Box<dyn std::error::Error>> {
    let (statements, config, skipped) = match file::extension(path).as_deref() {
        Some("csv") => {
            let text = file::read_text(path)?;
            let read = table::read_statements(text.as_bytes(), path, skip_invalid)?;
            (read.statements, None, read.skipped)
        }
        Some("json") => {
            let (rows, config) = file::read_json::<JsonInput>(path)?.into_parts();
            (rows.iter().map(RawStatement::from).collect(), config, Vec::new())
        }
        _ => return Err(format!("Unsupported input format '{}': use .csv or .json", path).into()),
    };

    if statements.is_empty() {
        return Err(FinstatError::InsufficientData(format!("{}: no usable rows", path)).into());
    }

    Ok(SourceRead {
        source: StatementSource {
            label: path.to_string(),
            statements,
        },
        risk_config: config,
        skipped,
    })
}

/// Load rows from `--input` files (merged, sorted by year) or piped JSON.
pub fn load_input(
    paths: &[String],
    skip_invalid: bool,
) -> Result<LoadedInput, Box<dyn std::error::Error>> {
    if paths.is_empty() {
        let value = stdin::read_stdin()?
            .ok_or("No input: pass --input <file> or pipe JSON on stdin")?;
        let (rows, risk_config) = serde_json::from_value::<JsonInput>(value)?.into_parts();
        return Ok(LoadedInput {
            rows,
            risk_config,
            conflicts: Vec::new(),
            skipped: Vec::new(),
        });
    }

    let mut sources = Vec::with_capacity(paths.len());
    let mut risk_config = None;
    let mut skipped = Vec::new();
    for path in paths {
        let read = read_source(path, skip_invalid)?;
        sources.push(read.source);
        skipped.extend(read.skipped);
        risk_config = read.risk_config.or(risk_config);
    }

    let merged = merge_statements(&sources);
    let mut rows = Vec::with_capacity(merged.statements.len());
    for statement in merged.statements {
        match statement.into_row() {
            Ok(row) => rows.push(row),
            Err(e) if skip_invalid => {
                tracing::warn!(error = %e, "skipping incomplete year");
                skipped.push(e.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(LoadedInput {
        rows,
        risk_config,
        conflicts: merged.conflicts,
        skipped,
    })
}
