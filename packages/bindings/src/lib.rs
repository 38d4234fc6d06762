use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use finstat_core::ingest::StatementSource;
use finstat_core::{AnalysisInput, FinancialRow, RiskConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Either a bare array of rows or `{ rows, risk_config }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RowsInput {
    Rows(Vec<FinancialRow>),
    Analysis(AnalysisInput),
}

impl From<RowsInput> for AnalysisInput {
    fn from(input: RowsInput) -> Self {
        match input {
            RowsInput::Rows(rows) => AnalysisInput {
                rows,
                risk_config: None,
            },
            RowsInput::Analysis(a) => a,
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_statements(input_json: String) -> NapiResult<String> {
    let input: RowsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finstat_core::analyze(&input.into()).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_metrics(input_json: String) -> NapiResult<String> {
    let input: AnalysisInput = serde_json::from_str::<RowsInput>(&input_json)
        .map_err(to_napi_error)?
        .into();
    let config: RiskConfig = input.risk_config.unwrap_or_default();
    let (metrics, _) =
        finstat_core::compute_with_config(&input.rows, &config).map_err(to_napi_error)?;
    serde_json::to_string(&metrics).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[napi]
pub fn merge_sources(input_json: String) -> NapiResult<String> {
    let sources: Vec<StatementSource> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let outcome = finstat_core::ingest::merge_statements(&sources);
    serde_json::to_string(&outcome).map_err(to_napi_error)
}

#[napi]
pub fn map_columns(headers_json: String) -> NapiResult<String> {
    let headers: Vec<String> = serde_json::from_str(&headers_json).map_err(to_napi_error)?;
    let mapping = finstat_core::ingest::map_columns(&headers);
    serde_json::to_string(&mapping).map_err(to_napi_error)
}
