//! Ingestion helpers for the input side of the engine: header mapping,
//! accounting-style number parsing, and merging of single-year sources.
//!
//! None of this is needed to call [`crate::compute`]; it exists so every
//! front end normalises uploaded tables the same way.

pub mod merge;
pub mod parse;
pub mod raw;
pub mod schema;

pub use merge::{merge_statements, MergeOutcome, RestatementConflict, StatementSource};
pub use parse::{parse_amount, parse_fiscal_year};
pub use raw::RawStatement;
pub use schema::{map_columns, ColumnMapping, MappedColumn, MatchMethod, StatementField};
