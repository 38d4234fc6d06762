//! Rule-based red-flag scoring.
//!
//! `rules` holds the enumerated predicates and their configuration;
//! `scoring` sums triggered weights into a clamped score and label.

pub mod rules;
pub mod scoring;

pub use rules::{FlagThresholds, FlagWeights, LabelThresholds, RedFlagKind, RiskConfig};
pub use scoring::{assess, RiskAssessment, RiskFlag, RiskLabel};
