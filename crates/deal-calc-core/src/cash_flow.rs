//! Monthly operating expenses, cash flow and NOI.
//!
//! NOI excludes debt service; cash flow includes it. The operating-expense
//! total is rounded to the cent once, before anything is derived from it, so
//! the three figures reconcile exactly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inputs::PropertyInputs;
use crate::types::{round_money, Money};

const MONTHS: Decimal = dec!(12);

/// Aggregated operating figures for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingCashFlow {
    pub monthly_operating_expenses: Money,
    /// Rent minus operating expenses minus debt service. Negative for a losing deal.
    pub monthly_cash_flow: Money,
    /// Annual rent minus annual operating expenses, before debt service.
    #[serde(rename = "annualNOI")]
    pub annual_noi: Money,
}

/// Sum recurring monthly costs and net them against rent and the mortgage.
pub fn aggregate_cash_flow(
    inputs: &PropertyInputs,
    monthly_mortgage_payment: Money,
) -> OperatingCashFlow {
    let monthly_operating_expenses = monthly_operating_expenses(inputs);
    let rent = inputs.monthly_rent();

    let monthly_cash_flow = rent - monthly_operating_expenses - monthly_mortgage_payment;
    let annual_noi = rent * MONTHS - monthly_operating_expenses * MONTHS;

    debug!(
        opex = %monthly_operating_expenses,
        cash_flow = %monthly_cash_flow,
        noi = %annual_noi,
        "operating cash flow"
    );

    OperatingCashFlow {
        monthly_operating_expenses,
        monthly_cash_flow,
        annual_noi,
    }
}

/// Tax and insurance are annual and spread over twelve months; the rest are
/// already monthly.
pub fn monthly_operating_expenses(inputs: &PropertyInputs) -> Money {
    round_money(
        inputs.annual_property_tax() / MONTHS
            + inputs.annual_insurance() / MONTHS
            + inputs.monthly_hoa()
            + inputs.monthly_utilities()
            + inputs.monthly_maintenance()
            + inputs.monthly_vacancy()
            + inputs.monthly_capex(),
    )
}
