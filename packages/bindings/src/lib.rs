use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use deal_calc_core::analysis::{AnalysisConfig, CalculatedMetrics};
use deal_calc_core::inputs::PropertyInputs;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_metrics(metrics_json: &str) -> NapiResult<CalculatedMetrics> {
    serde_json::from_str(metrics_json).map_err(to_napi_error)
}

fn parse_decimal(value: &str) -> NapiResult<Decimal> {
    value.trim().parse().map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_all_metrics(input_json: String) -> NapiResult<String> {
    let inputs: PropertyInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let metrics = deal_calc_core::calculate_all_metrics(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&metrics).map_err(to_napi_error)
}

/// `config_json` is optional; the built-in scoring and flag settings apply without it.
#[napi]
pub fn analyze_deal(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let inputs: PropertyInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config: AnalysisConfig = match config_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => AnalysisConfig::default(),
    };
    let output = deal_calc_core::analyze_deal(&inputs, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Verdict and insights
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_simple_mode_verdict(metrics_json: String) -> NapiResult<String> {
    let metrics = parse_metrics(&metrics_json)?;
    let verdict = deal_calc_core::calculate_simple_mode_verdict(&metrics);
    serde_json::to_string(&serde_json::json!({
        "verdict": verdict,
        "copy": verdict.copy(),
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn get_red_flags(metrics_json: String) -> NapiResult<String> {
    let metrics = parse_metrics(&metrics_json)?;
    serde_json::to_string(&deal_calc_core::get_red_flags(&metrics)).map_err(to_napi_error)
}

#[napi]
pub fn get_green_lights(metrics_json: String) -> NapiResult<String> {
    let metrics = parse_metrics(&metrics_json)?;
    serde_json::to_string(&deal_calc_core::get_green_lights(&metrics)).map_err(to_napi_error)
}

#[napi]
pub fn verdict_copy() -> NapiResult<String> {
    let table: serde_json::Map<String, serde_json::Value> =
        deal_calc_core::verdict::verdict_copy_table()
            .into_iter()
            .map(|(verdict, copy)| {
                serde_json::to_value(copy).map(|v| (verdict.as_str().to_string(), v))
            })
            .collect::<Result<_, _>>()
            .map_err(to_napi_error)?;
    serde_json::to_string(&table).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoanRequest {
    principal: Decimal,
    interest_rate: Decimal,
    loan_term: u32,
}

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let req: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let payment =
        deal_calc_core::amortization::monthly_payment(req.principal, req.interest_rate, req.loan_term)
            .map_err(to_napi_error)?;
    Ok(payment.to_string())
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let req: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let summary =
        deal_calc_core::amortization::loan_summary(req.principal, req.interest_rate, req.loan_term)
            .map_err(to_napi_error)?;
    serde_json::to_string(&summary).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: deal_calc_core::sensitivity::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = deal_calc_core::sensitivity::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Amount as a decimal string ("-202.02") in, display string ("-$202.02") out.
#[napi]
pub fn format_currency(amount: String) -> NapiResult<String> {
    Ok(deal_calc_core::format_currency(parse_decimal(&amount)?))
}

#[napi]
pub fn format_percent(value: String) -> NapiResult<String> {
    Ok(deal_calc_core::format_percent(parse_decimal(&value)?))
}
