use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::{finance_purchase, Financing};
use crate::cash_flow::{aggregate_cash_flow, OperatingCashFlow};
use crate::flags::{evaluate_flags, FlagOverrides, FlagThresholds};
use crate::inputs::{MarketTier, PropertyInputs};
use crate::returns::{calculate_return_metrics, ReturnMetrics};
use crate::scoring::{score_deal, DealScore, ScoreBreakdown, ScoringConfig, ScoringFactors};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::verdict::{classify, VerdictCategory, VerdictCopy};
use crate::DealCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Every figure the engine derives for one property. Recomputed on each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedMetrics {
    pub purchase_price: Money,
    pub monthly_rent: Money,
    pub market_tier: MarketTier,

    pub down_payment_amount: Money,
    pub loan_amount: Money,
    pub monthly_mortgage_payment: Money,
    pub total_cash_invested: Money,

    pub monthly_operating_expenses: Money,
    pub monthly_cash_flow: Money,
    #[serde(rename = "annualNOI")]
    pub annual_noi: Money,

    pub cap_rate: Percent,
    /// `null` when no cash was invested
    pub cash_on_cash_return: Option<Percent>,
    pub deal_score: u8,

    pub annual_debt_service: Money,
    pub annual_cash_flow: Money,
    pub rent_to_price_ratio: Percent,
    pub gross_rent_multiplier: Option<Decimal>,
    pub debt_service_coverage_ratio: Option<Decimal>,
    pub operating_expense_ratio: Option<Percent>,
    pub break_even_ratio: Option<Percent>,
    pub loan_to_value: Percent,
}

/// Scoring and flag settings for a full analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub scoring: ScoringConfig,
    /// Applied field by field over the property's tier thresholds
    pub flags: FlagOverrides,
}

impl AnalysisConfig {
    pub fn validate(&self) -> DealCalcResult<()> {
        self.scoring.validate()
    }

    pub fn flag_thresholds(&self, tier: MarketTier) -> FlagThresholds {
        self.flags.apply(FlagThresholds::for_tier(tier))
    }
}

/// Complete deal analysis: metrics, score rationale, insights and verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealAnalysis {
    pub metrics: CalculatedMetrics,
    pub score_breakdown: ScoreBreakdown,
    pub red_flags: Vec<String>,
    pub green_lights: Vec<String>,
    pub verdict: VerdictCategory,
    pub verdict_copy: &'static VerdictCopy,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the metric pipeline under the default scoring configuration.
///
/// All-or-nothing: either every field is populated or an error is returned.
pub fn calculate_all_metrics(inputs: &PropertyInputs) -> DealCalcResult<CalculatedMetrics> {
    Ok(calculate_metrics_with(inputs, &ScoringConfig::default())?.0)
}

/// Run the metric pipeline under a caller-supplied scoring configuration,
/// returning the score rationale alongside the metrics.
pub fn calculate_metrics_with(
    inputs: &PropertyInputs,
    scoring: &ScoringConfig,
) -> DealCalcResult<(CalculatedMetrics, ScoreBreakdown)> {
    scoring.validate()?;
    let financing = finance_purchase(inputs)?;
    let operating = aggregate_cash_flow(inputs, financing.monthly_mortgage_payment);
    let returns = calculate_return_metrics(inputs, &financing, &operating)?;

    let DealScore { score, breakdown } = score_deal(
        &ScoringFactors {
            monthly_cash_flow: operating.monthly_cash_flow,
            cap_rate: returns.cap_rate,
            cash_on_cash_return: returns.cash_on_cash_return,
            rent_to_price_ratio: returns.rent_to_price_ratio,
            market_tier: inputs.market_tier(),
        },
        scoring,
    );

    let metrics = assemble(inputs, financing, operating, returns, score);
    debug!(
        deal_score = metrics.deal_score,
        cash_flow = %metrics.monthly_cash_flow,
        cap_rate = %metrics.cap_rate,
        "metrics calculated"
    );
    Ok((metrics, breakdown))
}

/// Full analysis wrapped in the standard output envelope.
pub fn analyze_deal(
    inputs: &PropertyInputs,
    config: &AnalysisConfig,
) -> DealCalcResult<ComputationOutput<DealAnalysis>> {
    let start = Instant::now();
    config.validate()?;

    let (metrics, score_breakdown) = calculate_metrics_with(inputs, &config.scoring)?;
    let thresholds = config.flag_thresholds(inputs.market_tier());
    let insights = evaluate_flags(&metrics, &thresholds);
    let verdict = classify(metrics.deal_score);
    let warnings = collect_warnings(inputs, &metrics);

    let analysis = DealAnalysis {
        metrics,
        score_breakdown,
        red_flags: insights.red_flags,
        green_lights: insights.green_lights,
        verdict,
        verdict_copy: verdict.copy(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rental Deal Analysis (amortized debt service, NOI, weighted deal score)",
        inputs,
        warnings,
        elapsed,
        analysis,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn assemble(
    inputs: &PropertyInputs,
    financing: Financing,
    operating: OperatingCashFlow,
    returns: ReturnMetrics,
    deal_score: u8,
) -> CalculatedMetrics {
    CalculatedMetrics {
        purchase_price: inputs.purchase_price(),
        monthly_rent: inputs.monthly_rent(),
        market_tier: inputs.market_tier(),
        down_payment_amount: financing.down_payment_amount,
        loan_amount: financing.loan_amount,
        monthly_mortgage_payment: financing.monthly_mortgage_payment,
        total_cash_invested: returns.total_cash_invested,
        monthly_operating_expenses: operating.monthly_operating_expenses,
        monthly_cash_flow: operating.monthly_cash_flow,
        annual_noi: operating.annual_noi,
        cap_rate: returns.cap_rate,
        cash_on_cash_return: returns.cash_on_cash_return,
        deal_score,
        annual_debt_service: returns.annual_debt_service,
        annual_cash_flow: returns.annual_cash_flow,
        rent_to_price_ratio: returns.rent_to_price_ratio,
        gross_rent_multiplier: returns.gross_rent_multiplier,
        debt_service_coverage_ratio: returns.debt_service_coverage_ratio,
        operating_expense_ratio: returns.operating_expense_ratio,
        break_even_ratio: returns.break_even_ratio,
        loan_to_value: returns.loan_to_value,
    }
}

fn collect_warnings(inputs: &PropertyInputs, metrics: &CalculatedMetrics) -> Vec<String> {
    let mut warnings = Vec::new();

    if metrics.cash_on_cash_return.is_none() {
        warnings.push("No cash invested; cash-on-cash return is undefined (N/A)".into());
    }

    if metrics.loan_to_value > dec!(80) {
        warnings.push(format!(
            "Loan-to-value of {:.1}% exceeds 80%; expect PMI or a higher rate",
            metrics.loan_to_value
        ));
    }

    if let Some(dscr) = metrics.debt_service_coverage_ratio {
        if dscr < dec!(1.2) {
            warnings.push(format!(
                "DSCR of {dscr:.2} is below 1.20x; most lenders will not finance this"
            ));
        }
    }

    if inputs.monthly_rent() > Decimal::ZERO && inputs.monthly_vacancy().is_zero() {
        warnings.push("No vacancy allowance budgeted; cash flow may be overstated".into());
    }

    if inputs.monthly_rent() > Decimal::ZERO
        && inputs.monthly_maintenance().is_zero()
        && inputs.monthly_capex().is_zero()
    {
        warnings.push("No maintenance or CapEx reserve budgeted".into());
    }

    if inputs.interest_rate() > dec!(15) {
        warnings.push(format!(
            "Interest rate of {}% is unusually high; verify the quote",
            inputs.interest_rate()
        ));
    }

    if inputs.loan_term() > 40 {
        warnings.push(format!(
            "Loan term of {} years exceeds typical mortgage products",
            inputs.loan_term()
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DealCalcError;
    use crate::inputs::PropertyInputsDraft;
    use crate::scoring::Ramp;
    use pretty_assertions::assert_eq;

    fn example() -> PropertyInputs {
        PropertyInputs::new(PropertyInputsDraft {
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
        })
        .unwrap()
    }

    #[test]
    fn test_example_metrics() {
        let m = calculate_all_metrics(&example()).unwrap();
        assert_eq!(m.down_payment_amount, dec!(55000));
        assert_eq!(m.loan_amount, dec!(220000));
        assert_eq!(m.monthly_mortgage_payment, dec!(1538.27));
        assert_eq!(m.total_cash_invested, dec!(63250));
        assert_eq!(m.monthly_operating_expenses, dec!(863.75));
        assert_eq!(m.monthly_cash_flow, dec!(-202.02));
        assert_eq!(m.annual_noi, dec!(16035));
        assert_eq!(m.cap_rate, dec!(5.8309));
        assert_eq!(m.cash_on_cash_return, Some(dec!(-3.8328)));
        assert_eq!(m.deal_score, 23);
    }

    #[test]
    fn test_analyze_example() {
        let out = analyze_deal(&example(), &AnalysisConfig::default()).unwrap();
        let a = &out.result;
        assert_eq!(a.verdict, VerdictCategory::Pass);
        assert_eq!(a.verdict_copy, VerdictCategory::Pass.copy());
        assert_eq!(a.red_flags, vec!["🚨 Negative monthly cash flow".to_string()]);
        assert!(a.green_lights.is_empty());
        assert_eq!(a.score_breakdown.cap_rate, dec!(63.85));
        // DSCR 0.87 is below lender minimums
        assert!(out.warnings.iter().any(|w| w.contains("DSCR")));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalysisConfig::default();
        config.scoring.weights.rent_ratio = dec!(0.5);
        assert!(analyze_deal(&example(), &config).is_err());
    }

    #[test]
    fn test_metrics_reject_unvalidated_scoring() {
        let mut scoring = ScoringConfig::default();
        scoring.rent_ratio = Ramp::new(&[(dec!(0.4), dec!(0)), (dec!(1.0), dec!(150))]);
        assert!(matches!(
            calculate_metrics_with(&example(), &scoring),
            Err(DealCalcError::InvalidConfig(_))
        ));

        let mut scoring = ScoringConfig::default();
        scoring.weights.cash_flow = dec!(0.9);
        assert!(calculate_metrics_with(&example(), &scoring).is_err());
    }

    #[test]
    fn test_flag_threshold_override() {
        let config = AnalysisConfig {
            flags: FlagOverrides {
                low_cap_rate: Some(dec!(6)),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = analyze_deal(&example(), &config).unwrap();
        assert_eq!(
            out.result.red_flags,
            vec![
                "🚨 Negative monthly cash flow".to_string(),
                "⚠️ Cap rate below market threshold".to_string(),
            ]
        );
    }

    #[test]
    fn test_partial_override_keeps_tier_thresholds() {
        // all cash, rent 300 on 100k with no expenses: cap rate 3.6%
        let inputs = PropertyInputs::new(PropertyInputsDraft {
            purchase_price: dec!(100000),
            down_payment_percent: dec!(100),
            interest_rate: dec!(6),
            loan_term: 30,
            monthly_rent: dec!(300),
            market_tier: MarketTier::A,
            ..Default::default()
        })
        .unwrap();
        let low_cap = "⚠️ Cap rate below market threshold".to_string();

        let plain = analyze_deal(&inputs, &AnalysisConfig::default()).unwrap();
        assert_eq!(plain.result.metrics.cap_rate, dec!(3.6));
        assert!(!plain.result.red_flags.contains(&low_cap));

        let config: AnalysisConfig =
            serde_json::from_str(r#"{"flags":{"strong_cash_flow":"300"}}"#).unwrap();
        assert_eq!(config.flag_thresholds(MarketTier::A).low_cap_rate, dec!(3));
        assert_eq!(config.flag_thresholds(MarketTier::A).strong_cash_flow, dec!(300));
        let overridden = analyze_deal(&inputs, &config).unwrap();
        assert_eq!(overridden.result.red_flags, plain.result.red_flags);
        assert!(!overridden.result.red_flags.contains(&low_cap));
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let m = calculate_all_metrics(&example()).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("dealScore").is_some());
        assert!(json.get("annualNOI").is_some());
        assert!(json.get("monthlyMortgagePayment").is_some());
    }

    #[test]
    fn test_undefined_coc_serializes_null_and_warns() {
        let mut draft = example().to_draft();
        draft.down_payment_percent = Decimal::ZERO;
        draft.closing_costs = Decimal::ZERO;
        let inputs = PropertyInputs::new(draft).unwrap();

        let out = analyze_deal(&inputs, &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&out.result.metrics).unwrap();
        assert!(json["cashOnCashReturn"].is_null());
        assert!(out.warnings.iter().any(|w| w.contains("N/A")));
    }
}
