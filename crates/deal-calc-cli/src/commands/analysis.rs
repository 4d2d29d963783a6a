use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use deal_calc_core::analysis::{analyze_deal, calculate_metrics_with, CalculatedMetrics};
use deal_calc_core::format::{format_currency, format_optional_percent, format_percent};
use deal_calc_core::inputs::{MarketTier, PropertyInputs, PropertyInputsDraft, Strategy};

use crate::config;
use crate::input;

/// Property and financing inputs, from a JSON file, stdin or individual flags
#[derive(Args)]
pub struct PropertyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment as a percent of price
    #[arg(long, default_value = "20")]
    pub down: Decimal,

    /// Annual interest rate in percent (e.g. 7.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term: u32,

    /// Gross monthly rent
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Annual property tax
    #[arg(long, default_value = "0")]
    pub tax: Decimal,

    /// Annual insurance premium
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Monthly HOA dues
    #[arg(long, default_value = "0")]
    pub hoa: Decimal,

    /// Monthly owner-paid utilities
    #[arg(long, default_value = "0")]
    pub utilities: Decimal,

    /// Monthly maintenance reserve
    #[arg(long, default_value = "0")]
    pub maintenance: Decimal,

    /// Monthly vacancy allowance
    #[arg(long, default_value = "0")]
    pub vacancy: Decimal,

    /// Monthly capital expenditure reserve
    #[arg(long, default_value = "0")]
    pub capex: Decimal,

    /// One-time closing costs
    #[arg(long, default_value = "0")]
    pub closing: Decimal,

    /// One-time rehab costs
    #[arg(long, default_value = "0")]
    pub rehab: Decimal,

    /// Market tier: A, B or C
    #[arg(long, default_value = "B")]
    pub tier: MarketTier,

    /// Strategy: buy-hold, flip, brrrr, house-hack, short-term-rental
    #[arg(long, default_value = "buy-hold")]
    pub strategy: Strategy,
}

impl PropertyArgs {
    pub fn resolve(&self) -> Result<PropertyInputs, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(inputs) = input::stdin::read_stdin()? {
            return Ok(inputs);
        }

        let draft = PropertyInputsDraft {
            purchase_price: self.price.ok_or("--price is required (or provide --input)")?,
            down_payment_percent: self.down,
            interest_rate: self.rate.ok_or("--rate is required (or provide --input)")?,
            loan_term: self.term,
            monthly_rent: self.rent.ok_or("--rent is required (or provide --input)")?,
            annual_property_tax: self.tax,
            annual_insurance: self.insurance,
            monthly_hoa: self.hoa,
            monthly_utilities: self.utilities,
            monthly_maintenance: self.maintenance,
            monthly_vacancy: self.vacancy,
            monthly_capex: self.capex,
            closing_costs: self.closing,
            rehab_costs: self.rehab,
            strategy: self.strategy,
            market_tier: self.tier,
        };
        Ok(PropertyInputs::new(draft)?)
    }
}

/// Arguments for a full deal analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub property: PropertyArgs,

    /// Scoring/flag config file (YAML or JSON)
    #[arg(long, env = "DEALCALC_CONFIG")]
    pub config: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.property.resolve()?;
    let config = config::load_config(args.config.as_deref())?;
    let result = analyze_deal(&inputs, &config)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for metrics only
#[derive(Args)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub property: PropertyArgs,

    /// Scoring config file (YAML or JSON)
    #[arg(long, env = "DEALCALC_CONFIG")]
    pub config: Option<String>,

    /// Render money and percentages as display strings ($1,234.56 / 5.83%)
    #[arg(long)]
    pub formatted: bool,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = args.property.resolve()?;
    let config = config::load_config(args.config.as_deref())?;
    let (metrics, _) = calculate_metrics_with(&inputs, &config.scoring)?;

    if args.formatted {
        Ok(formatted_metrics(&metrics))
    } else {
        Ok(serde_json::to_value(metrics)?)
    }
}

fn formatted_metrics(m: &CalculatedMetrics) -> Value {
    let ratio = |v: Option<Decimal>| v.map(|r| format!("{r:.2}x")).unwrap_or_else(|| "N/A".into());
    json!({
        "dealScore": m.deal_score,
        "monthlyMortgagePayment": format_currency(m.monthly_mortgage_payment),
        "monthlyOperatingExpenses": format_currency(m.monthly_operating_expenses),
        "monthlyCashFlow": format_currency(m.monthly_cash_flow),
        "annualNOI": format_currency(m.annual_noi),
        "downPaymentAmount": format_currency(m.down_payment_amount),
        "loanAmount": format_currency(m.loan_amount),
        "totalCashInvested": format_currency(m.total_cash_invested),
        "capRate": format_percent(m.cap_rate),
        "cashOnCashReturn": format_optional_percent(m.cash_on_cash_return),
        "rentToPriceRatio": format_percent(m.rent_to_price_ratio),
        "debtServiceCoverageRatio": ratio(m.debt_service_coverage_ratio),
        "loanToValue": format_percent(m.loan_to_value),
        "marketTier": m.market_tier.to_string(),
        "onePercentRule": m.rent_to_price_ratio >= dec!(1),
    })
}
