//! Red flags and green lights.
//!
//! Each rule is an independent predicate paired with a fixed message. Rules
//! run in table order and their messages come out in that order; nothing is
//! sorted by severity. The emoji prefix is part of the message contract (UIs
//! strip it with a pattern), so it must stay stable.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::analysis::CalculatedMetrics;
use crate::inputs::MarketTier;
use crate::types::{Money, Percent};

pub const DANGER_MARKER: &str = "🚨";
pub const WARNING_MARKER: &str = "⚠️";
pub const GREEN_MARKER: &str = "✅";

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagThresholds {
    /// Cap rate (percent) below which the deal is flagged
    pub low_cap_rate: Percent,
    /// Rent / price (percent) below which rent is "well below" the 1% rule
    pub rent_ratio_floor: Percent,
    /// Operating expense ratio (percent of rent) above which expenses are flagged
    pub max_expense_ratio: Percent,
    pub strong_cash_on_cash: Percent,
    pub strong_cash_flow: Money,
    pub one_percent_rule: Percent,
    pub strong_cap_rate: Percent,
}

impl FlagThresholds {
    /// A-tier markets tolerate lower cap rates.
    pub fn for_tier(tier: MarketTier) -> Self {
        let low_cap_rate = match tier {
            MarketTier::A => dec!(3),
            MarketTier::B => dec!(4),
            MarketTier::C => dec!(5),
        };
        Self {
            low_cap_rate,
            rent_ratio_floor: dec!(0.5),
            max_expense_ratio: dec!(50),
            strong_cash_on_cash: dec!(8),
            strong_cash_flow: dec!(200),
            one_percent_rule: dec!(1),
            strong_cap_rate: dec!(8),
        }
    }
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self::for_tier(MarketTier::default())
    }
}

/// Configured threshold overrides. Unset fields keep the property's tier
/// thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagOverrides {
    pub low_cap_rate: Option<Percent>,
    pub rent_ratio_floor: Option<Percent>,
    pub max_expense_ratio: Option<Percent>,
    pub strong_cash_on_cash: Option<Percent>,
    pub strong_cash_flow: Option<Money>,
    pub one_percent_rule: Option<Percent>,
    pub strong_cap_rate: Option<Percent>,
}

impl FlagOverrides {
    pub fn apply(&self, base: FlagThresholds) -> FlagThresholds {
        FlagThresholds {
            low_cap_rate: self.low_cap_rate.unwrap_or(base.low_cap_rate),
            rent_ratio_floor: self.rent_ratio_floor.unwrap_or(base.rent_ratio_floor),
            max_expense_ratio: self.max_expense_ratio.unwrap_or(base.max_expense_ratio),
            strong_cash_on_cash: self.strong_cash_on_cash.unwrap_or(base.strong_cash_on_cash),
            strong_cash_flow: self.strong_cash_flow.unwrap_or(base.strong_cash_flow),
            one_percent_rule: self.one_percent_rule.unwrap_or(base.one_percent_rule),
            strong_cap_rate: self.strong_cap_rate.unwrap_or(base.strong_cap_rate),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub struct FlagRule {
    pub id: &'static str,
    pub message: &'static str,
    pub triggered: fn(&CalculatedMetrics, &FlagThresholds) -> bool,
}

pub const RED_FLAG_RULES: &[FlagRule] = &[
    FlagRule {
        id: "negative-cash-flow",
        message: "🚨 Negative monthly cash flow",
        triggered: negative_cash_flow,
    },
    FlagRule {
        id: "low-cap-rate",
        message: "⚠️ Cap rate below market threshold",
        triggered: low_cap_rate,
    },
    FlagRule {
        id: "rent-well-below-one-percent",
        message: "⚠️ Rent is well below the 1% rule",
        triggered: rent_well_below_one_percent,
    },
    FlagRule {
        id: "high-expense-ratio",
        message: "⚠️ Operating expenses consume over half of rent",
        triggered: high_expense_ratio,
    },
];

pub const GREEN_LIGHT_RULES: &[FlagRule] = &[
    FlagRule {
        id: "strong-cash-on-cash",
        message: "✅ Cash-on-cash return of 8% or better",
        triggered: strong_cash_on_cash,
    },
    FlagRule {
        id: "strong-cash-flow",
        message: "✅ Cash flow of $200/month or more",
        triggered: strong_cash_flow,
    },
    FlagRule {
        id: "meets-one-percent-rule",
        message: "✅ Meets the 1% rule",
        triggered: meets_one_percent_rule,
    },
    FlagRule {
        id: "strong-cap-rate",
        message: "✅ Cap rate of 8% or better",
        triggered: strong_cap_rate,
    },
];

fn negative_cash_flow(m: &CalculatedMetrics, _: &FlagThresholds) -> bool {
    m.monthly_cash_flow < Decimal::ZERO
}

fn low_cap_rate(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.cap_rate < t.low_cap_rate
}

fn rent_well_below_one_percent(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.rent_to_price_ratio < t.rent_ratio_floor
}

fn high_expense_ratio(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.operating_expense_ratio
        .is_some_and(|ratio| ratio > t.max_expense_ratio)
}

fn strong_cash_on_cash(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.cash_on_cash_return
        .is_some_and(|coc| coc >= t.strong_cash_on_cash)
}

fn strong_cash_flow(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.monthly_cash_flow >= t.strong_cash_flow
}

fn meets_one_percent_rule(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.rent_to_price_ratio >= t.one_percent_rule
}

fn strong_cap_rate(m: &CalculatedMetrics, t: &FlagThresholds) -> bool {
    m.cap_rate >= t.strong_cap_rate
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInsights {
    pub red_flags: Vec<String>,
    pub green_lights: Vec<String>,
}

/// Run a rule table in order, keeping the messages of the rules that fire.
pub fn evaluate_rules(
    rules: &[FlagRule],
    metrics: &CalculatedMetrics,
    thresholds: &FlagThresholds,
) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| (rule.triggered)(metrics, thresholds))
        .map(|rule| rule.message.to_string())
        .collect()
}

pub fn evaluate_flags(metrics: &CalculatedMetrics, thresholds: &FlagThresholds) -> DealInsights {
    DealInsights {
        red_flags: evaluate_rules(RED_FLAG_RULES, metrics, thresholds),
        green_lights: evaluate_rules(GREEN_LIGHT_RULES, metrics, thresholds),
    }
}

/// Red flags under the thresholds for the metrics' market tier.
pub fn get_red_flags(metrics: &CalculatedMetrics) -> Vec<String> {
    evaluate_rules(
        RED_FLAG_RULES,
        metrics,
        &FlagThresholds::for_tier(metrics.market_tier),
    )
}

/// Green lights under the thresholds for the metrics' market tier.
pub fn get_green_lights(metrics: &CalculatedMetrics) -> Vec<String> {
    evaluate_rules(
        GREEN_LIGHT_RULES,
        metrics,
        &FlagThresholds::for_tier(metrics.market_tier),
    )
}

/// Message text without its emoji marker.
pub fn strip_marker(message: &str) -> &str {
    let rest = [DANGER_MARKER, WARNING_MARKER, "⚠", GREEN_MARKER]
        .iter()
        .find_map(|marker| message.strip_prefix(marker))
        .unwrap_or(message);
    rest.trim_start()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::calculate_all_metrics;
    use crate::inputs::{PropertyInputs, PropertyInputsDraft};
    use pretty_assertions::assert_eq;

    fn metrics(draft: PropertyInputsDraft) -> CalculatedMetrics {
        calculate_all_metrics(&PropertyInputs::new(draft).unwrap()).unwrap()
    }

    fn example_draft() -> PropertyInputsDraft {
        PropertyInputsDraft {
            purchase_price: dec!(275000),
            down_payment_percent: dec!(20),
            interest_rate: dec!(7.5),
            loan_term: 30,
            monthly_rent: dec!(2200),
            annual_property_tax: dec!(2750),
            annual_insurance: dec!(1375),
            monthly_maintenance: dec!(344),
            monthly_vacancy: dec!(176),
            closing_costs: dec!(8250),
            ..Default::default()
        }
    }

    #[test]
    fn test_example_flags() {
        let m = metrics(example_draft());
        assert_eq!(get_red_flags(&m), vec!["🚨 Negative monthly cash flow".to_string()]);
        assert!(get_green_lights(&m).is_empty());
    }

    #[test]
    fn test_below_half_percent_rule_flagged() {
        let m = metrics(PropertyInputsDraft {
            purchase_price: dec!(500000),
            down_payment_percent: dec!(20),
            interest_rate: dec!(7),
            loan_term: 30,
            monthly_rent: dec!(1500),
            annual_property_tax: dec!(6000),
            annual_insurance: dec!(1800),
            monthly_maintenance: dec!(150),
            monthly_vacancy: dec!(120),
            monthly_capex: dec!(100),
            closing_costs: dec!(10000),
            ..Default::default()
        });
        // opex 1020 / 1500 = 68% of rent
        assert_eq!(
            get_red_flags(&m),
            vec![
                "🚨 Negative monthly cash flow".to_string(),
                "⚠️ Cap rate below market threshold".to_string(),
                "⚠️ Rent is well below the 1% rule".to_string(),
                "⚠️ Operating expenses consume over half of rent".to_string(),
            ]
        );
    }

    #[test]
    fn test_green_lights_in_rule_order() {
        let m = metrics(PropertyInputsDraft {
            purchase_price: dec!(100000),
            down_payment_percent: dec!(25),
            interest_rate: dec!(6),
            loan_term: 30,
            monthly_rent: dec!(1500),
            annual_property_tax: dec!(1200),
            annual_insurance: dec!(600),
            monthly_maintenance: dec!(75),
            monthly_vacancy: dec!(75),
            monthly_capex: dec!(50),
            closing_costs: dec!(3000),
            ..Default::default()
        });
        assert!(get_red_flags(&m).is_empty());
        assert_eq!(
            get_green_lights(&m),
            vec![
                "✅ Cash-on-cash return of 8% or better".to_string(),
                "✅ Cash flow of $200/month or more".to_string(),
                "✅ Meets the 1% rule".to_string(),
                "✅ Cap rate of 8% or better".to_string(),
            ]
        );
    }

    #[test]
    fn test_cap_rate_threshold_depends_on_tier() {
        // cap rate 3.5%: fine in A, flagged in B and C
        let mut m = metrics(example_draft());
        m.cap_rate = dec!(3.5);
        m.monthly_cash_flow = dec!(10);

        m.market_tier = MarketTier::A;
        assert!(get_red_flags(&m).is_empty());

        m.market_tier = MarketTier::B;
        assert_eq!(get_red_flags(&m), vec!["⚠️ Cap rate below market threshold".to_string()]);
    }

    #[test]
    fn test_undefined_cash_on_cash_never_green() {
        let mut m = metrics(example_draft());
        m.cash_on_cash_return = None;
        let t = FlagThresholds::default();
        assert!(!strong_cash_on_cash(&m, &t));
    }

    #[test]
    fn test_overrides_merge_over_tier() {
        let overrides = FlagOverrides {
            strong_cash_flow: Some(dec!(300)),
            ..Default::default()
        };
        let merged = overrides.apply(FlagThresholds::for_tier(MarketTier::A));
        assert_eq!(merged.low_cap_rate, dec!(3));
        assert_eq!(merged.strong_cash_flow, dec!(300));
        assert_eq!(
            FlagOverrides::default().apply(FlagThresholds::for_tier(MarketTier::C)),
            FlagThresholds::for_tier(MarketTier::C)
        );
    }

    #[test]
    fn test_rule_ids_unique() {
        let mut ids: Vec<&str> = RED_FLAG_RULES
            .iter()
            .chain(GREEN_LIGHT_RULES)
            .map(|r| r.id)
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_every_message_carries_its_marker() {
        for rule in RED_FLAG_RULES {
            assert!(
                rule.message.starts_with(DANGER_MARKER) || rule.message.starts_with(WARNING_MARKER),
                "{}",
                rule.id
            );
        }
        for rule in GREEN_LIGHT_RULES {
            assert!(rule.message.starts_with(GREEN_MARKER), "{}", rule.id);
        }
    }

    #[test]
    fn test_strip_marker() {
        assert_eq!(strip_marker("🚨 Negative monthly cash flow"), "Negative monthly cash flow");
        assert_eq!(strip_marker("⚠️ Rent is well below the 1% rule"), "Rent is well below the 1% rule");
        assert_eq!(strip_marker("⚠ bare warning"), "bare warning");
        assert_eq!(strip_marker("✅ Meets the 1% rule"), "Meets the 1% rule");
        assert_eq!(strip_marker("no marker"), "no marker");
    }
}
