pub mod engine;
pub mod error;
pub mod metrics;
pub mod risk;
pub mod statements;
pub mod types;

#[cfg(feature = "ingest")]
pub mod ingest;

pub use engine::{analyze, compute, compute_with_config, AnalysisInput, AnalysisOutput};
pub use error::FinstatError;
pub use metrics::MetricRow;
pub use risk::{RiskAssessment, RiskConfig, RiskLabel};
pub use statements::FinancialRow;
pub use types::*;

/// Standard result type for all finstat operations
pub type FinstatResult<T> = Result<T, FinstatError>;
