//! Fixed-rate, fully-amortizing loan arithmetic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DealCalcError;
use crate::inputs::{PropertyInputs, MAX_AMOUNT, MAX_LOAN_TERM_YEARS};
use crate::types::{round_money, Money, Percent};
use crate::DealCalcResult;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One year of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    /// 1-based loan year
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    /// Outstanding balance after the year's last payment
    pub ending_balance: Money,
}

/// How a purchase is funded: cash down, amount borrowed and the resulting payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    pub down_payment_amount: Money,
    pub loan_amount: Money,
    pub monthly_mortgage_payment: Money,
}

/// Lifetime totals for a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub principal: Money,
    pub monthly_payment: Money,
    pub number_of_payments: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub schedule: Vec<AmortizationYear>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fixed monthly payment, rounded half-up to the cent.
///
/// `P * r(1+r)^n / ((1+r)^n - 1)` with `r = annual_rate_percent / 100 / 12`
/// and `n = term_years * 12`. A zero rate amortizes straight-line and a
/// non-positive principal (nothing borrowed) pays nothing.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> DealCalcResult<Money> {
    if principal <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if term_years == 0 || term_years > MAX_LOAN_TERM_YEARS {
        return Err(DealCalcError::invalid(
            "loanTerm",
            format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
        ));
    }
    if annual_rate_percent < Decimal::ZERO || annual_rate_percent > dec!(100) {
        return Err(DealCalcError::invalid(
            "interestRate",
            "Interest rate must be between 0 and 100",
        ));
    }
    if principal > MAX_AMOUNT {
        return Err(DealCalcError::invalid(
            "loanAmount",
            "Amount exceeds the supported maximum",
        ));
    }

    let total_months = months_in_term(term_years)?;
    let payment = unrounded_payment(principal, monthly_rate(annual_rate_percent), total_months)?;
    let rounded = round_money(payment);

    debug!(%principal, %annual_rate_percent, term_years, payment = %rounded, "monthly payment");
    Ok(rounded)
}

/// Split the purchase price into down payment and loan, and price the loan.
pub fn finance_purchase(inputs: &PropertyInputs) -> DealCalcResult<Financing> {
    let price = inputs.purchase_price();
    let down_payment_amount = round_money(price * inputs.down_payment_percent() / dec!(100));
    let loan_amount = price - down_payment_amount;
    let monthly_mortgage_payment =
        monthly_payment(loan_amount, inputs.interest_rate(), inputs.loan_term())?;

    Ok(Financing {
        down_payment_amount,
        loan_amount,
        monthly_mortgage_payment,
    })
}

/// Year-by-year schedule. Interest accrues on the outstanding balance each
/// month and is rounded to the cent; the final payment absorbs any residue so
/// the loan closes at exactly zero.
pub fn amortization_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> DealCalcResult<Vec<AmortizationYear>> {
    Ok(loan_summary(principal, annual_rate_percent, term_years)?.schedule)
}

/// Payment, lifetime totals and yearly schedule for a loan.
pub fn loan_summary(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> DealCalcResult<LoanSummary> {
    let payment = monthly_payment(principal, annual_rate_percent, term_years)?;

    if principal <= Decimal::ZERO {
        return Ok(LoanSummary {
            principal: Decimal::ZERO,
            monthly_payment: Decimal::ZERO,
            number_of_payments: 0,
            total_paid: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            schedule: Vec::new(),
        });
    }

    let rate = monthly_rate(annual_rate_percent);
    let total_months = months_in_term(term_years)?;

    let mut schedule = Vec::with_capacity(term_years as usize);
    let mut balance = principal;
    let mut total_paid = Decimal::ZERO;

    for year in 1..=term_years {
        let mut principal_paid = Decimal::ZERO;
        let mut interest_paid = Decimal::ZERO;

        for month in 1..=MONTHS_PER_YEAR {
            let interest = round_money(balance * rate);
            let is_last = (year - 1) * MONTHS_PER_YEAR + month == total_months;
            let mut principal_part = payment - interest;
            if is_last || principal_part > balance {
                principal_part = balance;
            }

            balance -= principal_part;
            principal_paid += principal_part;
            interest_paid += interest;
            total_paid += principal_part + interest;
        }

        schedule.push(AmortizationYear {
            year,
            principal_paid,
            interest_paid,
            ending_balance: balance,
        });
    }

    Ok(LoanSummary {
        principal,
        monthly_payment: payment,
        number_of_payments: total_months,
        total_paid,
        total_interest: total_paid - principal,
        schedule,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

fn months_in_term(term_years: u32) -> DealCalcResult<u32> {
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| DealCalcError::invalid("loanTerm", "Loan term is too long"))
}

fn overflow() -> DealCalcError {
    DealCalcError::invalid("loanAmount", "Loan terms exceed decimal range")
}

/// Computed as `P * r * c / (c - 1)` with `c = (1 + r)^n`, dividing before
/// multiplying by the principal so large loans at high rates stay in range.
fn unrounded_payment(principal: Money, rate: Decimal, total_months: u32) -> DealCalcResult<Money> {
    if rate.is_zero() {
        return Ok(principal / Decimal::from(total_months));
    }

    // (1 + r)^n via iterative multiplication
    let growth = Decimal::ONE + rate;
    let mut compound = Decimal::ONE;
    for _ in 0..total_months {
        compound = compound.checked_mul(growth).ok_or_else(overflow)?;
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(DealCalcError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    let factor = compound.checked_div(denominator).ok_or_else(overflow)?;
    let payment = principal
        .checked_mul(rate)
        .and_then(|p| p.checked_mul(factor))
        .ok_or_else(overflow)?;

    // lifetime totals are summed from the payment; make sure they fit too
    payment
        .checked_mul(Decimal::from(total_months))
        .ok_or_else(overflow)?;
    Ok(payment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_thirty_year_payment() {
        let payment = monthly_payment(dec!(220000), dec!(7.5), 30).unwrap();
        assert_eq!(payment, dec!(1538.27));
    }

    #[test]
    fn test_fifteen_year_payment() {
        let payment = monthly_payment(dec!(100000), dec!(5), 15).unwrap();
        assert_eq!(payment, dec!(790.79));
    }

    #[test]
    fn test_payment_near_half_cent_rounds_down() {
        // unrounded 1330.60499...
        let payment = monthly_payment(dec!(200000), dec!(7), 30).unwrap();
        assert_eq!(payment, dec!(1330.60));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = monthly_payment(dec!(360000), Decimal::ZERO, 30).unwrap();
        assert_eq!(payment, dec!(1000));

        let payment = monthly_payment(dec!(200000), Decimal::ZERO, 30).unwrap();
        // 200000 / 360 = 555.555...
        assert_eq!(payment, dec!(555.56));
    }

    #[test]
    fn test_no_principal_pays_nothing() {
        assert_eq!(monthly_payment(Decimal::ZERO, dec!(7), 30).unwrap(), Decimal::ZERO);
        assert_eq!(monthly_payment(dec!(-5), dec!(7), 30).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = monthly_payment(dec!(100000), dec!(6), 0).unwrap_err();
        assert!(matches!(err, DealCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_finance_purchase_twenty_percent_down() {
        use crate::inputs::PropertyInputsDraft;

        let inputs = PropertyInputs::new(PropertyInputsDraft {
            purchase_price: dec!(275000),
            down_payment_percent: dec!(20),
            interest_rate: dec!(7.5),
            loan_term: 30,
            ..Default::default()
        })
        .unwrap();
        let financing = finance_purchase(&inputs).unwrap();
        assert_eq!(
            financing,
            Financing {
                down_payment_amount: dec!(55000),
                loan_amount: dec!(220000),
                monthly_mortgage_payment: dec!(1538.27),
            }
        );
    }

    #[test]
    fn test_schedule_closes_at_zero() {
        let summary = loan_summary(dec!(220000), dec!(7.5), 30).unwrap();
        assert_eq!(summary.schedule.len(), 30);
        assert_eq!(summary.number_of_payments, 360);

        let last = summary.schedule.last().unwrap();
        assert_eq!(last.ending_balance, Decimal::ZERO);

        let principal_total: Decimal = summary.schedule.iter().map(|y| y.principal_paid).sum();
        assert_eq!(principal_total, dec!(220000));

        let interest_total: Decimal = summary.schedule.iter().map(|y| y.interest_paid).sum();
        assert_eq!(summary.total_interest, interest_total);
        assert_eq!(summary.total_paid, dec!(220000) + interest_total);
    }

    #[test]
    fn test_schedule_balance_declines_each_year() {
        let schedule = amortization_schedule(dec!(150000), dec!(6), 30).unwrap();
        for pair in schedule.windows(2) {
            assert!(pair[1].ending_balance < pair[0].ending_balance);
            // principal share grows as interest shrinks
            assert!(pair[1].principal_paid > pair[0].principal_paid);
        }
    }

    #[test]
    fn test_zero_rate_schedule() {
        let schedule = amortization_schedule(dec!(360000), Decimal::ZERO, 30).unwrap();
        assert_eq!(schedule[0].principal_paid, dec!(12000));
        assert_eq!(schedule[0].interest_paid, Decimal::ZERO);
        assert_eq!(schedule[0].ending_balance, dec!(348000));
        assert_eq!(schedule[29].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_no_loan_summary() {
        let summary = loan_summary(Decimal::ZERO, dec!(7), 30).unwrap();
        assert!(summary.schedule.is_empty());
        assert_eq!(summary.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_terms_rejected() {
        for (rate, term) in [(dec!(100), 100), (dec!(6), u32::MAX), (dec!(150), 30), (dec!(-1), 30)] {
            let err = monthly_payment(dec!(250000), rate, term).unwrap_err();
            assert!(matches!(err, DealCalcError::InvalidInput { .. }), "{rate}% over {term}y");
            assert!(loan_summary(dec!(250000), rate, term).is_err());
        }
    }

    #[test]
    fn test_largest_accepted_loan_at_highest_rate() {
        let summary = loan_summary(MAX_AMOUNT, dec!(100), MAX_LOAN_TERM_YEARS).unwrap();
        // interest alone is P * 100% / 12; the payment sits a hair above it
        assert!(summary.monthly_payment >= dec!(83333333333333.33));
        assert_eq!(summary.number_of_payments, MAX_LOAN_TERM_YEARS * 12);
        assert_eq!(summary.schedule.len(), MAX_LOAN_TERM_YEARS as usize);
        assert_eq!(summary.schedule.last().unwrap().ending_balance, Decimal::ZERO);
        assert!(summary.total_interest > Decimal::ZERO);
    }

    #[test]
    fn test_loan_above_maximum_rejected() {
        let err = monthly_payment(MAX_AMOUNT + Decimal::ONE, dec!(6), 30).unwrap_err();
        assert!(matches!(err, DealCalcError::InvalidInput { .. }));
    }
}
