//! 0-100 deal score from four piecewise-linear sub-scores.
//!
//! Each sub-score is clamped to [0, 100] by its ramp before weighting, so a
//! single extreme metric cannot dominate or invert the total. Every ramp is
//! non-decreasing, which makes the score non-decreasing in rent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::CalculatedMetrics;
use crate::error::DealCalcError;
use crate::inputs::MarketTier;
use crate::types::{Money, Percent, ROUNDING};
use crate::DealCalcResult;

const MIN_SCORE: Decimal = dec!(0);
const MAX_SCORE: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One breakpoint of a ramp: at metric value `at`, the sub-score is `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampPoint {
    pub at: Decimal,
    pub score: Decimal,
}

/// Piecewise-linear map from a metric to a sub-score. Flat beyond the first
/// and last breakpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ramp(pub Vec<RampPoint>);

impl Ramp {
    pub fn new(points: &[(Decimal, Decimal)]) -> Self {
        Ramp(
            points
                .iter()
                .map(|&(at, score)| RampPoint { at, score })
                .collect(),
        )
    }

    pub fn evaluate(&self, value: Decimal) -> Decimal {
        let points = &self.0;
        let (first, last) = match (points.first(), points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return MIN_SCORE,
        };
        if value <= first.at {
            return first.score;
        }
        if value >= last.at {
            return last.score;
        }

        for pair in points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if value <= hi.at {
                let span = hi.at - lo.at;
                return lo.score + (value - lo.at) / span * (hi.score - lo.score);
            }
        }
        last.score
    }

    /// At least two breakpoints, strictly increasing `at`, scores within
    /// [0, 100] and non-decreasing.
    pub fn validate(&self, name: &str) -> DealCalcResult<()> {
        if self.0.len() < 2 {
            return Err(DealCalcError::InvalidConfig(format!(
                "{name} ramp needs at least two points"
            )));
        }
        for point in &self.0 {
            if point.score < MIN_SCORE || point.score > MAX_SCORE {
                return Err(DealCalcError::InvalidConfig(format!(
                    "{name} ramp score {} is outside 0-100",
                    point.score
                )));
            }
        }
        for pair in self.0.windows(2) {
            if pair[1].at <= pair[0].at {
                return Err(DealCalcError::InvalidConfig(format!(
                    "{name} ramp breakpoints must be strictly increasing"
                )));
            }
            if pair[1].score < pair[0].score {
                return Err(DealCalcError::InvalidConfig(format!(
                    "{name} ramp scores must not decrease"
                )));
            }
        }
        Ok(())
    }
}

/// Cap-rate ramp per market tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRamps {
    pub a: Ramp,
    pub b: Ramp,
    pub c: Ramp,
}

impl TierRamps {
    pub fn for_tier(&self, tier: MarketTier) -> &Ramp {
        match tier {
            MarketTier::A => &self.a,
            MarketTier::B => &self.b,
            MarketTier::C => &self.c,
        }
    }
}

/// Relative importance of each sub-score. Must sum to exactly 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub cash_flow: Decimal,
    pub cap_rate: Decimal,
    pub cash_on_cash: Decimal,
    pub rent_ratio: Decimal,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cash_flow: dec!(0.35),
            cap_rate: dec!(0.20),
            cash_on_cash: dec!(0.30),
            rent_ratio: dec!(0.15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// Monthly cash flow in dollars
    pub cash_flow: Ramp,
    /// Cap rate in percent, by tier
    pub cap_rate: TierRamps,
    /// Cash-on-cash return in percent; negative returns always score 0
    pub cash_on_cash: Ramp,
    /// Rent / price in percent
    pub rent_ratio: Ramp,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            cash_flow: Ramp::new(&[
                (dec!(-100), dec!(0)),
                (dec!(0), dec!(50)),
                (dec!(200), dec!(80)),
                (dec!(500), dec!(100)),
            ]),
            cap_rate: TierRamps {
                a: Ramp::new(&[(dec!(2), dec!(0)), (dec!(4), dec!(50)), (dec!(6), dec!(100))]),
                b: Ramp::new(&[(dec!(3), dec!(0)), (dec!(5), dec!(50)), (dec!(8), dec!(100))]),
                c: Ramp::new(&[(dec!(4), dec!(0)), (dec!(7), dec!(50)), (dec!(10), dec!(100))]),
            },
            cash_on_cash: Ramp::new(&[(dec!(0), dec!(40)), (dec!(8), dec!(100))]),
            rent_ratio: Ramp::new(&[
                (dec!(0.4), dec!(0)),
                (dec!(0.7), dec!(50)),
                (dec!(1.0), dec!(100)),
            ]),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> DealCalcResult<()> {
        let w = &self.weights;
        for (name, weight) in [
            ("cash_flow", w.cash_flow),
            ("cap_rate", w.cap_rate),
            ("cash_on_cash", w.cash_on_cash),
            ("rent_ratio", w.rent_ratio),
        ] {
            if weight < Decimal::ZERO || weight > Decimal::ONE {
                return Err(DealCalcError::InvalidConfig(format!(
                    "{name} weight must be between 0 and 1"
                )));
            }
        }
        let sum = w.cash_flow + w.cap_rate + w.cash_on_cash + w.rent_ratio;
        if sum != Decimal::ONE {
            return Err(DealCalcError::InvalidConfig(format!(
                "scoring weights must sum to 1, got {sum}"
            )));
        }

        self.cash_flow.validate("cash_flow")?;
        self.cap_rate.a.validate("cap_rate.a")?;
        self.cap_rate.b.validate("cap_rate.b")?;
        self.cap_rate.c.validate("cap_rate.c")?;
        self.cash_on_cash.validate("cash_on_cash")?;
        self.rent_ratio.validate("rent_ratio")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// The metrics the scorer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringFactors {
    pub monthly_cash_flow: Money,
    pub cap_rate: Percent,
    pub cash_on_cash_return: Option<Percent>,
    pub rent_to_price_ratio: Percent,
    pub market_tier: MarketTier,
}

impl From<&CalculatedMetrics> for ScoringFactors {
    fn from(m: &CalculatedMetrics) -> Self {
        Self {
            monthly_cash_flow: m.monthly_cash_flow,
            cap_rate: m.cap_rate,
            cash_on_cash_return: m.cash_on_cash_return,
            rent_to_price_ratio: m.rent_to_price_ratio,
            market_tier: m.market_tier,
        }
    }
}

/// Sub-scores (0-100, two decimals) behind a deal score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub cash_flow: Decimal,
    pub cap_rate: Decimal,
    pub cash_on_cash: Decimal,
    pub rent_ratio: Decimal,
    pub weighted_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealScore {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
}

/// Weighted deal score. The config is assumed valid; see [`ScoringConfig::validate`].
pub fn score_deal(factors: &ScoringFactors, config: &ScoringConfig) -> DealScore {
    let cash_flow = config.cash_flow.evaluate(factors.monthly_cash_flow);
    let cap_rate = config
        .cap_rate
        .for_tier(factors.market_tier)
        .evaluate(factors.cap_rate);
    let cash_on_cash = cash_on_cash_score(factors, &config.cash_on_cash);
    let rent_ratio = config.rent_ratio.evaluate(factors.rent_to_price_ratio);

    let w = &config.weights;
    let weighted_total = cash_flow * w.cash_flow
        + cap_rate * w.cap_rate
        + cash_on_cash * w.cash_on_cash
        + rent_ratio * w.rent_ratio;

    let score = weighted_total
        .round_dp_with_strategy(0, ROUNDING)
        .clamp(MIN_SCORE, MAX_SCORE)
        .to_u8()
        .unwrap_or(0);

    debug!(
        score,
        %cash_flow, %cap_rate, %cash_on_cash, %rent_ratio,
        tier = %factors.market_tier,
        "deal score"
    );

    DealScore {
        score,
        breakdown: ScoreBreakdown {
            cash_flow: cash_flow.round_dp(2),
            cap_rate: cap_rate.round_dp(2),
            cash_on_cash: cash_on_cash.round_dp(2),
            rent_ratio: rent_ratio.round_dp(2),
            weighted_total: weighted_total.round_dp(2),
        },
    }
}

/// Deal score of a metrics record under the default weights and ramps.
pub fn calculate_deal_score(metrics: &CalculatedMetrics) -> u8 {
    score_deal(&ScoringFactors::from(metrics), &ScoringConfig::default()).score
}

/// Negative returns score 0 regardless of the ramp. An undefined return (no
/// cash invested) scores full marks when the deal still cash-flows and zero
/// otherwise.
fn cash_on_cash_score(factors: &ScoringFactors, ramp: &Ramp) -> Decimal {
    match factors.cash_on_cash_return {
        Some(coc) if coc < Decimal::ZERO => MIN_SCORE,
        Some(coc) => ramp.evaluate(coc),
        None if factors.monthly_cash_flow > Decimal::ZERO => MAX_SCORE,
        None => MIN_SCORE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn factors(
        cash_flow: Decimal,
        cap: Decimal,
        coc: Option<Decimal>,
        ratio: Decimal,
    ) -> ScoringFactors {
        ScoringFactors {
            monthly_cash_flow: cash_flow,
            cap_rate: cap,
            cash_on_cash_return: coc,
            rent_to_price_ratio: ratio,
            market_tier: MarketTier::B,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        ScoringConfig::default().validate().unwrap();
    }

    #[test]
    fn test_cash_flow_ramp_anchor_points() {
        let ramp = ScoringConfig::default().cash_flow;
        assert_eq!(ramp.evaluate(dec!(-500)), dec!(0));
        assert_eq!(ramp.evaluate(dec!(-100)), dec!(0));
        assert_eq!(ramp.evaluate(dec!(0)), dec!(50));
        assert_eq!(ramp.evaluate(dec!(100)), dec!(65));
        assert_eq!(ramp.evaluate(dec!(200)), dec!(80));
        assert_eq!(ramp.evaluate(dec!(10000)), dec!(100));
    }

    #[test]
    fn test_cap_rate_ramp_depends_on_tier() {
        let config = ScoringConfig::default();
        let cap = dec!(5);
        assert_eq!(config.cap_rate.for_tier(MarketTier::A).evaluate(cap), dec!(75));
        assert_eq!(config.cap_rate.for_tier(MarketTier::B).evaluate(cap), dec!(50));
        assert!(config.cap_rate.for_tier(MarketTier::C).evaluate(cap) < dec!(50));
    }

    #[test]
    fn test_example_breakdown() {
        let result = score_deal(
            &factors(dec!(-202.02), dec!(5.8309), Some(dec!(-3.8328)), dec!(0.8)),
            &ScoringConfig::default(),
        );
        assert_eq!(result.score, 23);
        assert_eq!(result.breakdown.cash_flow, dec!(0));
        assert_eq!(result.breakdown.cap_rate, dec!(63.85));
        assert_eq!(result.breakdown.cash_on_cash, dec!(0));
        assert_eq!(result.breakdown.rent_ratio, dec!(66.67));
    }

    #[test]
    fn test_all_strong_metrics_score_100() {
        let result = score_deal(
            &factors(dec!(700), dec!(13.8), Some(dec!(30)), dec!(1.5)),
            &ScoringConfig::default(),
        );
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_all_weak_metrics_score_0() {
        let result = score_deal(
            &factors(dec!(-2000), dec!(1), Some(dec!(-20)), dec!(0.3)),
            &ScoringConfig::default(),
        );
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_undefined_cash_on_cash_follows_cash_flow_sign() {
        let ramp = ScoringConfig::default().cash_on_cash;
        assert_eq!(
            cash_on_cash_score(&factors(dec!(10), dec!(5), None, dec!(1)), &ramp),
            dec!(100)
        );
        assert_eq!(
            cash_on_cash_score(&factors(dec!(0), dec!(5), None, dec!(1)), &ramp),
            dec!(0)
        );
    }

    #[test]
    fn test_zero_cash_on_cash_scores_ramp_floor() {
        let ramp = ScoringConfig::default().cash_on_cash;
        assert_eq!(
            cash_on_cash_score(&factors(dec!(0), dec!(5), Some(dec!(0)), dec!(1)), &ramp),
            dec!(40)
        );
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = ScoringConfig::default();
        config.weights.cash_flow = dec!(0.40);
        assert!(matches!(config.validate(), Err(DealCalcError::InvalidConfig(_))));
    }

    #[test]
    fn test_decreasing_ramp_rejected() {
        let mut config = ScoringConfig::default();
        config.rent_ratio = Ramp::new(&[(dec!(0.4), dec!(100)), (dec!(1.0), dec!(0))]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unordered_ramp_rejected() {
        let mut config = ScoringConfig::default();
        config.cash_flow = Ramp::new(&[(dec!(100), dec!(0)), (dec!(100), dec!(50))]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "weights": { "cash_flow": "0.25", "cap_rate": "0.25", "cash_on_cash": "0.25", "rent_ratio": "0.25" } }"#;
        let config: ScoringConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.cash_flow, ScoringConfig::default().cash_flow);
    }
}
