//! Investor ratios derived from the financing split and operating cash flow.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::Financing;
use crate::cash_flow::OperatingCashFlow;
use crate::error::DealCalcError;
use crate::inputs::PropertyInputs;
use crate::types::{round_percent, Money, Percent};
use crate::DealCalcResult;

const HUNDRED: Decimal = dec!(100);
const MONTHS: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnMetrics {
    /// Down payment + closing costs + rehab costs
    pub total_cash_invested: Money,
    /// NOI / purchase price, in percent. Ignores financing.
    pub cap_rate: Percent,
    /// Annual cash flow / total cash invested, in percent.
    /// `None` when nothing was invested: the ratio is undefined, not infinite.
    pub cash_on_cash_return: Option<Percent>,
    pub annual_debt_service: Money,
    pub annual_cash_flow: Money,
    /// Monthly rent / purchase price, in percent (the "1% rule" ratio)
    pub rent_to_price_ratio: Percent,
    /// Purchase price / annual rent
    pub gross_rent_multiplier: Option<Decimal>,
    /// NOI / annual debt service
    pub debt_service_coverage_ratio: Option<Decimal>,
    /// Operating expenses / rent, in percent
    pub operating_expense_ratio: Option<Percent>,
    /// (Operating expenses + debt service) / rent, in percent
    pub break_even_ratio: Option<Percent>,
    /// Loan / purchase price, in percent
    pub loan_to_value: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_return_metrics(
    inputs: &PropertyInputs,
    financing: &Financing,
    operating: &OperatingCashFlow,
) -> DealCalcResult<ReturnMetrics> {
    let price = inputs.purchase_price();
    if price <= Decimal::ZERO {
        return Err(DealCalcError::invalid(
            "purchasePrice",
            "Purchase price must be positive to compute cap rate",
        ));
    }

    let rent = inputs.monthly_rent();
    let total_cash_invested =
        financing.down_payment_amount + inputs.closing_costs() + inputs.rehab_costs();
    let annual_cash_flow = operating.monthly_cash_flow * MONTHS;
    let annual_debt_service = financing.monthly_mortgage_payment * MONTHS;

    let cap_rate = percent_of(operating.annual_noi, price, "capRate")?.unwrap_or_default();
    let cash_on_cash_return = percent_of(annual_cash_flow, total_cash_invested, "cashOnCashReturn")?;

    Ok(ReturnMetrics {
        total_cash_invested,
        cap_rate,
        cash_on_cash_return,
        annual_debt_service,
        annual_cash_flow,
        rent_to_price_ratio: percent_of(rent, price, "rentToPriceRatio")?.unwrap_or_default(),
        gross_rent_multiplier: multiple(price, rent * MONTHS, "grossRentMultiplier")?,
        debt_service_coverage_ratio: multiple(
            operating.annual_noi,
            annual_debt_service,
            "debtServiceCoverageRatio",
        )?,
        operating_expense_ratio: percent_of(
            operating.monthly_operating_expenses,
            rent,
            "operatingExpenseRatio",
        )?,
        break_even_ratio: percent_of(
            operating.monthly_operating_expenses + financing.monthly_mortgage_payment,
            rent,
            "breakEvenRatio",
        )?,
        loan_to_value: percent_of(financing.loan_amount, price, "loanToValue")?.unwrap_or_default(),
    })
}

/// `numerator / denominator * 100`, undefined (`None`) at a zero denominator.
fn percent_of(numerator: Decimal, denominator: Decimal, metric: &str) -> DealCalcResult<Option<Percent>> {
    Ok(checked_ratio(numerator, denominator, metric)?
        .map(|r| r.checked_mul(HUNDRED).ok_or_else(|| out_of_range(metric)))
        .transpose()?
        .map(round_percent))
}

/// Plain multiple to two decimals (GRM, DSCR).
fn multiple(numerator: Decimal, denominator: Decimal, metric: &str) -> DealCalcResult<Option<Decimal>> {
    Ok(checked_ratio(numerator, denominator, metric)?.map(|r| r.round_dp(2)))
}

fn checked_ratio(numerator: Decimal, denominator: Decimal, metric: &str) -> DealCalcResult<Option<Decimal>> {
    if denominator.is_zero() {
        return Ok(None);
    }
    numerator
        .checked_div(denominator)
        .map(Some)
        .ok_or_else(|| out_of_range(metric))
}

fn out_of_range(metric: &str) -> DealCalcError {
    DealCalcError::invalid(metric, "Inputs push this ratio outside decimal range")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
