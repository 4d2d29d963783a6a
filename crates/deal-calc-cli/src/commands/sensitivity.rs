use clap::Args;
use serde::de::DeserializeOwned;
use serde_json::Value;

use deal_calc_core::inputs::PropertyInputs;
use deal_calc_core::sensitivity::{
    run_sensitivity as run_grid, SensitivityDriver, SensitivityInput, SensitivityMetric,
    SensitivityVariable,
};

use crate::config;
use crate::input;

/// Arguments for a two-way sensitivity grid (at most 10,000 cells)
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON file with base case property inputs (or pipe via stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Row variable as driver:min:max:step
    /// (e.g. "monthly-rent:1800:2400:100")
    #[arg(long)]
    pub var1: String,

    /// Column variable as driver:min:max:step
    /// (e.g. "interest-rate:5:8:0.5")
    #[arg(long)]
    pub var2: String,

    /// Output metric: deal-score, monthly-cash-flow, cap-rate, cash-on-cash-return
    #[arg(long, default_value = "deal-score")]
    pub metric: String,

    /// Scoring config file (YAML or JSON)
    #[arg(long, env = "DEALCALC_CONFIG")]
    pub config: Option<String>,
}

/// Parse a kebab-case enum name through its serde representation.
fn parse_name<T: DeserializeOwned>(name: &str) -> Result<T, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| format!("Unknown name '{}'", name).into())
}

fn parse_sens_var(spec: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be driver:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    let driver: SensitivityDriver = parse_name(parts[0]).map_err(|_| {
        format!(
            "Unknown driver '{}'. Available: monthly-rent, interest-rate, purchase-price, down-payment-percent",
            parts[0]
        )
    })?;
    Ok(SensitivityVariable {
        driver,
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base_inputs: PropertyInputs = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(inputs) = input::stdin::read_stdin()? {
        inputs
    } else {
        return Err("--input <file.json> or stdin required for sensitivity".into());
    };

    let output_metric: SensitivityMetric = parse_name(&args.metric)?;
    let config = config::load_config(args.config.as_deref())?;

    let grid_input = SensitivityInput {
        base_inputs,
        variable_1: parse_sens_var(&args.var1)?,
        variable_2: parse_sens_var(&args.var2)?,
        output_metric,
        scoring: config.scoring,
    };

    let result = run_grid(&grid_input)?;
    Ok(serde_json::to_value(result)?)
}
