use clap::Args;
use serde_json::{json, Value};

use finstat_core::{analyze, compute_with_config, AnalysisInput, RiskConfig};

use crate::input::{self, LoadedInput};

/// Arguments shared by the analyze, metrics and risk commands
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Statement file (.csv or .json); repeat to merge several sources.
    /// Reads JSON from stdin when omitted.
    #[arg(long)]
    pub input: Vec<String>,

    /// Risk rule configuration (.yaml, .yml or .json)
    #[arg(long)]
    pub risk_config: Option<String>,

    /// Skip malformed rows and incomplete years instead of failing
    #[arg(long)]
    pub skip_invalid: bool,
}

/// Load rows and settle on a rule set. A `--risk-config` file takes
/// precedence over one embedded in JSON input.
fn load(args: &AnalyzeArgs) -> Result<(LoadedInput, RiskConfig), Box<dyn std::error::Error>> {
    let loaded = input::load_input(&args.input, args.skip_invalid)?;
    let config = match args.risk_config {
        Some(ref path) => input::file::read_config::<RiskConfig>(path)?,
        None => loaded.risk_config.clone().unwrap_or_default(),
    };
    Ok((loaded, config))
}

fn ingest_warnings(loaded: &LoadedInput) -> Vec<String> {
    loaded
        .conflicts
        .iter()
        .map(|c| c.message.clone())
        .chain(loaded.skipped.iter().map(|s| format!("Skipped: {}", s)))
        .collect()
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (loaded, config) = load(&args)?;
    let extra = ingest_warnings(&loaded);

    let mut output = analyze(&AnalysisInput {
        rows: loaded.rows,
        risk_config: Some(config),
    })?;
    output.warnings.extend(extra);

    Ok(serde_json::to_value(output)?)
}

pub fn run_metrics(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (loaded, config) = load(&args)?;
    for w in ingest_warnings(&loaded) {
        tracing::warn!("{}", w);
    }
    let (metrics, _) = compute_with_config(&loaded.rows, &config)?;
    Ok(json!({ "metrics": metrics }))
}

pub fn run_risk(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (loaded, config) = load(&args)?;
    for w in ingest_warnings(&loaded) {
        tracing::warn!("{}", w);
    }
    let (_, risks) = compute_with_config(&loaded.rows, &config)?;

    let rows: Vec<Value> = risks
        .iter()
        .map(|r| {
            json!({
                "year": r.year,
                "score": r.score,
                "label": r.label,
                "flags": r.flag_names().join(", "),
            })
        })
        .collect();
    Ok(json!({ "risks": rows }))
}
