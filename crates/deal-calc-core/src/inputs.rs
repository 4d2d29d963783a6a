//! The validated property/financing record every analysis starts from.
//!
//! `PropertyInputs` can only be obtained through [`PropertyInputs::new`] (or
//! `TryFrom<PropertyInputsDraft>`, which deserialization goes through), so a
//! value that exists has already passed every range check below. Bad values
//! are rejected, never clamped.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DealCalcError;
use crate::types::{Money, Percent};
use crate::DealCalcResult;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Investment strategy. Carried through for presentation; it does not change
/// any computed metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    BuyHold,
    Flip,
    Brrrr,
    HouseHack,
    ShortTermRental,
}

/// Neighbourhood class. A-tier markets trade at lower cap rates than C-tier,
/// so the tier selects the cap-rate ramp and flag threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketTier {
    #[serde(alias = "a")]
    A,
    #[default]
    #[serde(alias = "b")]
    B,
    #[serde(alias = "c")]
    C,
}

impl std::fmt::Display for MarketTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for MarketTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            other => Err(format!("unknown market tier '{other}' (expected A, B or C)")),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy-hold" | "buy-and-hold" => Ok(Self::BuyHold),
            "flip" => Ok(Self::Flip),
            "brrrr" => Ok(Self::Brrrr),
            "house-hack" => Ok(Self::HouseHack),
            "short-term-rental" | "str" => Ok(Self::ShortTermRental),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Longest loan term accepted, in years.
pub const MAX_LOAN_TERM_YEARS: u32 = 50;

/// Largest amount accepted for any money field. Keeps every derived figure
/// (annualized totals, lifetime interest) inside `Decimal` range.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);

// ---------------------------------------------------------------------------
// Draft (unvalidated) and validated records
// ---------------------------------------------------------------------------

/// Raw, unvalidated inputs as they arrive from a form, file or JSON payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyInputsDraft {
    pub purchase_price: Money,
    pub down_payment_percent: Percent,
    /// Annual nominal rate, in percent
    pub interest_rate: Percent,
    /// Loan term in years
    pub loan_term: u32,
    pub monthly_rent: Money,
    pub annual_property_tax: Money,
    pub annual_insurance: Money,
    #[serde(rename = "monthlyHOA", alias = "monthlyHoa")]
    pub monthly_hoa: Money,
    pub monthly_utilities: Money,
    pub monthly_maintenance: Money,
    pub monthly_vacancy: Money,
    #[serde(rename = "monthlyCapEx", alias = "monthlyCapex")]
    pub monthly_capex: Money,
    pub closing_costs: Money,
    pub rehab_costs: Money,
    pub strategy: Strategy,
    pub market_tier: MarketTier,
}

/// Validated property inputs. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PropertyInputsDraft", into = "PropertyInputsDraft")]
pub struct PropertyInputs {
    purchase_price: Money,
    down_payment_percent: Percent,
    interest_rate: Percent,
    loan_term: u32,
    monthly_rent: Money,
    annual_property_tax: Money,
    annual_insurance: Money,
    monthly_hoa: Money,
    monthly_utilities: Money,
    monthly_maintenance: Money,
    monthly_vacancy: Money,
    monthly_capex: Money,
    closing_costs: Money,
    rehab_costs: Money,
    strategy: Strategy,
    market_tier: MarketTier,
}

impl PropertyInputs {
    /// Validate a draft and freeze it.
    pub fn new(draft: PropertyInputsDraft) -> DealCalcResult<Self> {
        if let Err(e) = validate_draft(&draft) {
            warn!(error = %e, "rejected property inputs");
            return Err(e);
        }

        Ok(Self {
            purchase_price: draft.purchase_price,
            down_payment_percent: draft.down_payment_percent,
            interest_rate: draft.interest_rate,
            loan_term: draft.loan_term,
            monthly_rent: draft.monthly_rent,
            annual_property_tax: draft.annual_property_tax,
            annual_insurance: draft.annual_insurance,
            monthly_hoa: draft.monthly_hoa,
            monthly_utilities: draft.monthly_utilities,
            monthly_maintenance: draft.monthly_maintenance,
            monthly_vacancy: draft.monthly_vacancy,
            monthly_capex: draft.monthly_capex,
            closing_costs: draft.closing_costs,
            rehab_costs: draft.rehab_costs,
            strategy: draft.strategy,
            market_tier: draft.market_tier,
        })
    }

    /// Copy the values back out, e.g. to tweak one field and re-validate.
    pub fn to_draft(&self) -> PropertyInputsDraft {
        PropertyInputsDraft::from(self.clone())
    }

    pub fn purchase_price(&self) -> Money {
        self.purchase_price
    }

    pub fn down_payment_percent(&self) -> Percent {
        self.down_payment_percent
    }

    pub fn interest_rate(&self) -> Percent {
        self.interest_rate
    }

    pub fn loan_term(&self) -> u32 {
        self.loan_term
    }

    pub fn monthly_rent(&self) -> Money {
        self.monthly_rent
    }

    pub fn annual_property_tax(&self) -> Money {
        self.annual_property_tax
    }

    pub fn annual_insurance(&self) -> Money {
        self.annual_insurance
    }

    pub fn monthly_hoa(&self) -> Money {
        self.monthly_hoa
    }

    pub fn monthly_utilities(&self) -> Money {
        self.monthly_utilities
    }

    pub fn monthly_maintenance(&self) -> Money {
        self.monthly_maintenance
    }

    pub fn monthly_vacancy(&self) -> Money {
        self.monthly_vacancy
    }

    pub fn monthly_capex(&self) -> Money {
        self.monthly_capex
    }

    pub fn closing_costs(&self) -> Money {
        self.closing_costs
    }

    pub fn rehab_costs(&self) -> Money {
        self.rehab_costs
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn market_tier(&self) -> MarketTier {
        self.market_tier
    }
}

impl TryFrom<PropertyInputsDraft> for PropertyInputs {
    type Error = DealCalcError;

    fn try_from(draft: PropertyInputsDraft) -> Result<Self, Self::Error> {
        PropertyInputs::new(draft)
    }
}

impl From<PropertyInputs> for PropertyInputsDraft {
    fn from(inputs: PropertyInputs) -> Self {
        PropertyInputsDraft {
            purchase_price: inputs.purchase_price,
            down_payment_percent: inputs.down_payment_percent,
            interest_rate: inputs.interest_rate,
            loan_term: inputs.loan_term,
            monthly_rent: inputs.monthly_rent,
            annual_property_tax: inputs.annual_property_tax,
            annual_insurance: inputs.annual_insurance,
            monthly_hoa: inputs.monthly_hoa,
            monthly_utilities: inputs.monthly_utilities,
            monthly_maintenance: inputs.monthly_maintenance,
            monthly_vacancy: inputs.monthly_vacancy,
            monthly_capex: inputs.monthly_capex,
            closing_costs: inputs.closing_costs,
            rehab_costs: inputs.rehab_costs,
            strategy: inputs.strategy,
            market_tier: inputs.market_tier,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_draft(draft: &PropertyInputsDraft) -> DealCalcResult<()> {
    if draft.purchase_price <= Decimal::ZERO {
        return Err(DealCalcError::invalid(
            "purchasePrice",
            "Purchase price must be positive",
        ));
    }

    check_percent("downPaymentPercent", draft.down_payment_percent)?;
    check_percent("interestRate", draft.interest_rate)?;

    if draft.loan_term == 0 || draft.loan_term > MAX_LOAN_TERM_YEARS {
        return Err(DealCalcError::invalid(
            "loanTerm",
            format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
        ));
    }
    if draft.purchase_price > MAX_AMOUNT {
        return Err(DealCalcError::invalid(
            "purchasePrice",
            "Amount exceeds the supported maximum",
        ));
    }

    let money_fields = [
        ("monthlyRent", draft.monthly_rent),
        ("annualPropertyTax", draft.annual_property_tax),
        ("annualInsurance", draft.annual_insurance),
        ("monthlyHOA", draft.monthly_hoa),
        ("monthlyUtilities", draft.monthly_utilities),
        ("monthlyMaintenance", draft.monthly_maintenance),
        ("monthlyVacancy", draft.monthly_vacancy),
        ("monthlyCapEx", draft.monthly_capex),
        ("closingCosts", draft.closing_costs),
        ("rehabCosts", draft.rehab_costs),
    ];
    for (field, value) in money_fields {
        if value < Decimal::ZERO {
            return Err(DealCalcError::invalid(field, "Amount cannot be negative"));
        }
        if value > MAX_AMOUNT {
            return Err(DealCalcError::invalid(
                field,
                "Amount exceeds the supported maximum",
            ));
        }
    }

    Ok(())
}

fn check_percent(field: &str, value: Percent) -> DealCalcResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(DealCalcError::invalid(field, "Must be between 0 and 100"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
