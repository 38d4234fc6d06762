//! Combine several single-year uploads into one multi-year series.
//!
//! When two sources report the same line for the same year, values within
//! 2% of each other are treated as rounding noise. Larger gaps are recorded as
//! restatement conflicts. Either way the later source wins, on the basis that
//! the most recent report carries the restated figure.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::raw::RawStatement;
use super::schema::StatementField;
use crate::types::{FiscalYear, Money, Rate};

/// Relative spread above which two reported values conflict.
const RESTATEMENT_TOLERANCE: Rate = dec!(0.02);

/// Absolute spread used instead when the smallest value is zero.
const ZERO_BASE_TOLERANCE: Money = dec!(0.01);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementSource {
    pub label: String,
    pub statements: Vec<RawStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestatementConflict {
    pub year: FiscalYear,
    pub field: StatementField,
    /// Source label and value, in source order.
    pub reported: Vec<(String, Money)>,
    pub chosen: Money,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// One statement per year, ascending.
    pub statements: Vec<RawStatement>,
    pub conflicts: Vec<RestatementConflict>,
}

fn is_conflict(values: &[Money]) -> bool {
    let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
        return false;
    };
    // A spread too large to represent is a conflict by any measure.
    let Some(spread) = max.checked_sub(*min) else {
        return true;
    };
    if min.is_zero() {
        spread > ZERO_BASE_TOLERANCE
    } else {
        spread
            .checked_div(min.abs())
            .map_or(true, |relative| relative > RESTATEMENT_TOLERANCE)
    }
}

pub fn merge_statements(sources: &[StatementSource]) -> MergeOutcome {
    let mut reported: BTreeMap<(FiscalYear, StatementField), Vec<(String, Money)>> =
        BTreeMap::new();

    for source in sources {
        for statement in &source.statements {
            for (field, value) in &statement.values {
                reported
                    .entry((statement.year, *field))
                    .or_default()
                    .push((source.label.clone(), *value));
            }
        }
    }

    // Years with no values at all still deserve a (empty) statement.
    let mut merged: BTreeMap<FiscalYear, RawStatement> = sources
        .iter()
        .flat_map(|s| s.statements.iter().map(|st| st.year))
        .map(|y| (y, RawStatement::new(y)))
        .collect();
    let mut conflicts = Vec::new();

    for ((year, field), entries) in reported {
        let values: Vec<Money> = entries.iter().map(|(_, v)| *v).collect();
        let chosen = *values.last().unwrap_or(&Decimal::ZERO);

        if values.len() > 1 && is_conflict(&values) {
            let listed: Vec<String> = entries
                .iter()
                .map(|(label, v)| format!("{v} ({label})"))
                .collect();
            let message = format!(
                "Restatement or mismatch detected for {} in {}: {}",
                field,
                year,
                listed.join(", ")
            );
            tracing::warn!(year, field = %field, "{}", message);
            conflicts.push(RestatementConflict {
                year,
                field,
                reported: entries,
                chosen,
                message,
            });
        }

        merged
            .entry(year)
            .or_insert_with(|| RawStatement::new(year))
            .values
            .insert(field, chosen);
    }

    MergeOutcome {
        statements: merged.into_values().collect(),
        conflicts,
    }
}
