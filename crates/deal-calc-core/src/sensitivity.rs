use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use crate::analysis::{calculate_metrics_with, CalculatedMetrics};
use crate::error::DealCalcError;
use crate::inputs::{PropertyInputs, PropertyInputsDraft};
use crate::scoring::ScoringConfig;
use crate::types::*;
use crate::DealCalcResult;

/// Input a sensitivity sweep can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensitivityDriver {
    MonthlyRent,
    InterestRate,
    PurchasePrice,
    DownPaymentPercent,
}

impl SensitivityDriver {
    pub fn as_str(self) -> &'static str {
        match self {
            SensitivityDriver::MonthlyRent => "monthly-rent",
            SensitivityDriver::InterestRate => "interest-rate",
            SensitivityDriver::PurchasePrice => "purchase-price",
            SensitivityDriver::DownPaymentPercent => "down-payment-percent",
        }
    }

    fn base_value(self, inputs: &PropertyInputs) -> Decimal {
        match self {
            SensitivityDriver::MonthlyRent => inputs.monthly_rent(),
            SensitivityDriver::InterestRate => inputs.interest_rate(),
            SensitivityDriver::PurchasePrice => inputs.purchase_price(),
            SensitivityDriver::DownPaymentPercent => inputs.down_payment_percent(),
        }
    }

    fn apply(self, draft: &mut PropertyInputsDraft, value: Decimal) {
        match self {
            SensitivityDriver::MonthlyRent => draft.monthly_rent = value,
            SensitivityDriver::InterestRate => draft.interest_rate = value,
            SensitivityDriver::PurchasePrice => draft.purchase_price = value,
            SensitivityDriver::DownPaymentPercent => draft.down_payment_percent = value,
        }
    }
}

impl fmt::Display for SensitivityDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output metric read from each cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensitivityMetric {
    #[default]
    DealScore,
    MonthlyCashFlow,
    CapRate,
    CashOnCashReturn,
}

impl SensitivityMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            SensitivityMetric::DealScore => "deal-score",
            SensitivityMetric::MonthlyCashFlow => "monthly-cash-flow",
            SensitivityMetric::CapRate => "cap-rate",
            SensitivityMetric::CashOnCashReturn => "cash-on-cash-return",
        }
    }

    /// `None` only for cash-on-cash when nothing is invested.
    fn read(self, metrics: &CalculatedMetrics) -> Option<Decimal> {
        match self {
            SensitivityMetric::DealScore => Some(Decimal::from(metrics.deal_score)),
            SensitivityMetric::MonthlyCashFlow => Some(metrics.monthly_cash_flow),
            SensitivityMetric::CapRate => Some(metrics.cap_rate),
            SensitivityMetric::CashOnCashReturn => metrics.cash_on_cash_return,
        }
    }
}

impl fmt::Display for SensitivityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One swept axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub driver: SensitivityDriver,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Input for a 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityInput {
    pub base_inputs: PropertyInputs,
    /// Rows
    pub variable_1: SensitivityVariable,
    /// Columns
    pub variable_2: SensitivityVariable,
    #[serde(default)]
    pub output_metric: SensitivityMetric,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Output of a 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: SensitivityMetric,
    /// matrix[i][j] = metric when variable_1 = values_1[i] and variable_2 = values_2[j]
    pub matrix: Vec<Vec<Option<Decimal>>>,
    pub base_case_value: Option<Decimal>,
    /// (row, col) of the cell closest to the base inputs
    pub base_case_position: (usize, usize),
}

/// Largest grid (rows x columns) a single sweep may evaluate.
pub const MAX_GRID_CELLS: usize = 10_000;

/// Number of values a sweep produces, counted before anything is allocated.
fn sweep_len(var: &SensitivityVariable) -> DealCalcResult<usize> {
    let field = format!("variable:{}", var.driver);
    if var.step <= Decimal::ZERO {
        return Err(DealCalcError::invalid(&field, "Step must be positive"));
    }
    if var.min > var.max {
        return Err(DealCalcError::invalid(&field, "Min must be <= max"));
    }

    let too_many = || {
        DealCalcError::invalid(
            &field,
            format!("Sweep exceeds {MAX_GRID_CELLS} values; widen the step"),
        )
    };
    let span = var.max.checked_sub(var.min).ok_or_else(too_many)?;
    let full_steps = span
        .checked_div(var.step)
        .and_then(|q| q.floor().to_usize())
        .ok_or_else(too_many)?;
    let remainder = span.checked_rem(var.step).ok_or_else(too_many)?;
    let len = if remainder.is_zero() {
        full_steps.saturating_add(1)
    } else {
        full_steps.saturating_add(2)
    };
    if len > MAX_GRID_CELLS {
        return Err(too_many());
    }
    Ok(len)
}

/// Sweep values from min to max by step. Max is always included.
fn generate_sweep_values(var: &SensitivityVariable) -> DealCalcResult<Vec<Decimal>> {
    let mut values = Vec::with_capacity(sweep_len(var)?);
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Index of the value closest to target. Ties go to the earlier value.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Re-run the full pipeline for every (row, col) pair of driver values.
///
/// Grids larger than [`MAX_GRID_CELLS`] are rejected with `InvalidInput`
/// before any cell is evaluated.
///
/// Each cell goes back through input validation, so a sweep that leaves the
/// valid range (a zero price, a rate above 100) fails the whole grid with
/// `InvalidInput` rather than producing a partial matrix.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> DealCalcResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variable_1.driver == input.variable_2.driver {
        return Err(DealCalcError::invalid(
            "variable_2",
            "Must sweep a different driver than variable_1",
        ));
    }
    input.scoring.validate()?;

    let cells = sweep_len(&input.variable_1)?
        .checked_mul(sweep_len(&input.variable_2)?)
        .filter(|&n| n <= MAX_GRID_CELLS);
    if cells.is_none() {
        return Err(DealCalcError::invalid(
            "variable_2",
            format!("Grid exceeds {MAX_GRID_CELLS} cells; narrow a range or widen a step"),
        ));
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;
    let base = input.base_inputs.to_draft();

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let mut draft = base.clone();
            input.variable_1.driver.apply(&mut draft, *v1);
            input.variable_2.driver.apply(&mut draft, *v2);
            let cell = PropertyInputs::new(draft)?;
            let (metrics, _) = calculate_metrics_with(&cell, &input.scoring)?;
            row.push(input.output_metric.read(&metrics));
        }
        matrix.push(row);
    }

    let base_row = closest_index(
        &v1_values,
        input.variable_1.driver.base_value(&input.base_inputs),
    );
    let base_col = closest_index(
        &v2_values,
        input.variable_2.driver.base_value(&input.base_inputs),
    );
    let base_case_value = matrix[base_row][base_col];

    if matrix.iter().flatten().any(Option::is_none) {
        warnings.push(format!(
            "{} is undefined (N/A) where no cash is invested",
            input.output_metric
        ));
    }

    debug!(
        rows = v1_values.len(),
        cols = v2_values.len(),
        metric = %input.output_metric,
        "sensitivity grid evaluated"
    );

    let output = SensitivityOutput {
        variable_1_name: input.variable_1.driver.to_string(),
        variable_2_name: input.variable_2.driver.to_string(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Deal Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1.driver,
            "variable_2": input.variable_2.driver,
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
