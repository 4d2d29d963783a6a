pub mod amortization;
pub mod analysis;
pub mod cash_flow;
pub mod error;
pub mod flags;
pub mod format;
pub mod inputs;
pub mod returns;
pub mod scoring;
pub mod types;
pub mod verdict;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use analysis::{
    analyze_deal, calculate_all_metrics, calculate_metrics_with, AnalysisConfig,
    CalculatedMetrics, DealAnalysis,
};
pub use error::DealCalcError;
pub use flags::{get_green_lights, get_red_flags, DealInsights, FlagOverrides, FlagThresholds};
pub use format::{format_currency, format_optional_percent, format_percent};
pub use inputs::{MarketTier, PropertyInputs, PropertyInputsDraft, Strategy};
pub use scoring::{calculate_deal_score, ScoringConfig};
pub use types::*;
pub use verdict::{calculate_simple_mode_verdict, VerdictCategory, VerdictCopy, VERDICT_COPY};

/// Standard result type for all deal-calc operations
pub type DealCalcResult<T> = Result<T, DealCalcError>;
