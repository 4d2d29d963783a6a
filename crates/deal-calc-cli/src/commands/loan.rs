use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use deal_calc_core::amortization::{loan_summary, monthly_payment};

/// Arguments for a monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term: u32,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = monthly_payment(args.principal, args.rate, args.term)?;
    Ok(json!({
        "principal": args.principal,
        "interestRate": args.rate,
        "loanTerm": args.term,
        "monthlyPayment": payment,
    }))
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term: u32,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let summary = loan_summary(args.principal, args.rate, args.term)?;
    Ok(serde_json::to_value(summary)?)
}
