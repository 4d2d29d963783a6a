//! Score bands and the display copy bound to each.
//!
//! Classification only ever produces a [`VerdictCategory`]; copy is looked up
//! separately through [`VerdictCategory::copy`], whose exhaustive match means
//! a new category cannot compile without copy.

use serde::{Deserialize, Serialize};

use crate::analysis::CalculatedMetrics;

pub const STRONG_BUY_MIN_SCORE: u8 = 80;
pub const BUY_MIN_SCORE: u8 = 60;
pub const CAUTION_MIN_SCORE: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictCategory {
    StrongBuy,
    Buy,
    Caution,
    Pass,
}

impl VerdictCategory {
    pub const ALL: [VerdictCategory; 4] = [
        VerdictCategory::StrongBuy,
        VerdictCategory::Buy,
        VerdictCategory::Caution,
        VerdictCategory::Pass,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "strong-buy",
            Self::Buy => "buy",
            Self::Caution => "caution",
            Self::Pass => "pass",
        }
    }

    pub fn copy(self) -> &'static VerdictCopy {
        match self {
            Self::StrongBuy => &STRONG_BUY_COPY,
            Self::Buy => &BUY_COPY,
            Self::Caution => &CAUTION_COPY,
            Self::Pass => &PASS_COPY,
        }
    }
}

impl std::fmt::Display for VerdictCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VerdictCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown verdict '{s}'"))
    }
}

/// User-facing copy for one verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictCopy {
    pub headline: &'static str,
    pub message: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub cta: &'static str,
}

pub const STRONG_BUY_COPY: VerdictCopy = VerdictCopy {
    headline: "Strong Buy",
    message: "The numbers work on every front: healthy cash flow, solid returns and rent that supports the price.",
    emoji: "🚀",
    color: "green",
    cta: "Run your due diligence and make an offer",
};

pub const BUY_COPY: VerdictCopy = VerdictCopy {
    headline: "Good Deal",
    message: "This property clears most investor benchmarks. A few metrics are merely average.",
    emoji: "👍",
    color: "emerald",
    cta: "Verify rents and expenses, then negotiate",
};

pub const CAUTION_COPY: VerdictCopy = VerdictCopy {
    headline: "Proceed with Caution",
    message: "Returns are thin. Small changes in rent, rate or expenses could turn this deal negative.",
    emoji: "⚠️",
    color: "amber",
    cta: "Try a lower offer price or larger down payment",
};

pub const PASS_COPY: VerdictCopy = VerdictCopy {
    headline: "Pass on This One",
    message: "At this price the property does not pay for itself. The numbers point to a losing investment.",
    emoji: "🛑",
    color: "red",
    cta: "Keep looking or rework the numbers",
};

pub const VERDICT_COPY: [(VerdictCategory, VerdictCopy); 4] = [
    (VerdictCategory::StrongBuy, STRONG_BUY_COPY),
    (VerdictCategory::Buy, BUY_COPY),
    (VerdictCategory::Caution, CAUTION_COPY),
    (VerdictCategory::Pass, PASS_COPY),
];

/// Map a 0-100 score into its band: 80+ strong buy, 60-79 buy, 40-59 caution, below 40 pass.
pub fn classify(deal_score: u8) -> VerdictCategory {
    match deal_score {
        s if s >= STRONG_BUY_MIN_SCORE => VerdictCategory::StrongBuy,
        s if s >= BUY_MIN_SCORE => VerdictCategory::Buy,
        s if s >= CAUTION_MIN_SCORE => VerdictCategory::Caution,
        _ => VerdictCategory::Pass,
    }
}

/// Verdict for the simple (score-only) analysis mode.
pub fn calculate_simple_mode_verdict(metrics: &CalculatedMetrics) -> VerdictCategory {
    classify(metrics.deal_score)
}

/// Copy table as a serializable list, for presentation layers.
pub fn verdict_copy_table() -> Vec<(VerdictCategory, &'static VerdictCopy)> {
    VerdictCategory::ALL.into_iter().map(|v| (v, v.copy())).collect()
}
