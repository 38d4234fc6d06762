use clap::Args;
use serde_json::{json, Value};

use finstat_core::ingest::{map_columns, merge_statements};

use crate::input;

/// Arguments for merging statement files
#[derive(Args)]
pub struct MergeArgs {
    /// Statement files, oldest report first; later files win on restatement
    #[arg(long, required = true)]
    pub input: Vec<String>,

    /// Skip malformed rows instead of failing
    #[arg(long)]
    pub skip_invalid: bool,
}

/// Arguments for inspecting a CSV header row
#[derive(Args)]
pub struct MapColumnsArgs {
    /// CSV file whose first row holds the headers
    #[arg(long)]
    pub input: String,
}

pub fn run_merge(args: MergeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut sources = Vec::with_capacity(args.input.len());
    let mut skipped = Vec::new();
    for path in &args.input {
        let read = input::read_source(path, args.skip_invalid)?;
        sources.push(read.source);
        skipped.extend(read.skipped);
    }

    let outcome = merge_statements(&sources);
    let missing: Vec<String> = outcome
        .statements
        .iter()
        .filter_map(|s| s.clone().into_row().err().map(|e| e.to_string()))
        .collect();

    Ok(json!({
        "statements": outcome.statements,
        "conflicts": outcome.conflicts,
        "incomplete": missing,
        "skipped": skipped,
    }))
}

pub fn run_map_columns(args: MapColumnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(input::file::resolve_path(&args.input)?)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mapping = map_columns(&headers);

    let columns: Vec<Value> = mapping
        .columns
        .iter()
        .map(|c| {
            json!({
                "field": c.field.canonical(),
                "header": c.header,
                "index": c.index,
                "method": c.method,
            })
        })
        .collect();
    let missing: Vec<&str> = mapping
        .missing_required()
        .iter()
        .map(|f| f.canonical())
        .collect();

    Ok(json!({
        "columns": columns,
        "missing_required": missing,
        "unmapped_headers": mapping.unmapped_headers,
    }))
}
