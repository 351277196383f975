use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HangarFinanceError;
use crate::finance::analysis::validate_input;
use crate::finance::model::{compute_finance_model, FinanceKpis};
use crate::finance::state::FinanceModelInput;
use crate::types::{with_metadata, ComputationOutput};
use crate::HangarFinanceResult;

/// Upper bound on sweep points per axis
const MAX_SWEEP_POINTS: usize = 200;

/// Input that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensitivityParameter {
    TarifTb,
    TarifAcc,
    PartAccPct,
    InterestRatePct,
    DownPayment,
    MaintenanceEurPerKwc,
    ProductibleKwhPerKwc,
    IsRatePct,
}

impl SensitivityParameter {
    pub fn name(&self) -> &'static str {
        match self {
            SensitivityParameter::TarifTb => "tarifTb",
            SensitivityParameter::TarifAcc => "tarifAcc",
            SensitivityParameter::PartAccPct => "partAccPct",
            SensitivityParameter::InterestRatePct => "interestRatePct",
            SensitivityParameter::DownPayment => "downPayment",
            SensitivityParameter::MaintenanceEurPerKwc => "maintenanceEurPerKwc",
            SensitivityParameter::ProductibleKwhPerKwc => "productibleKwhPerKwc",
            SensitivityParameter::IsRatePct => "isRatePct",
        }
    }

    fn current(&self, input: &FinanceModelInput) -> f64 {
        let s = &input.state;
        match self {
            SensitivityParameter::TarifTb => s.tarif_tb,
            SensitivityParameter::TarifAcc => s.tarif_acc,
            SensitivityParameter::PartAccPct => s.part_acc_pct,
            SensitivityParameter::InterestRatePct => s.interest_rate_pct,
            SensitivityParameter::DownPayment => s.down_payment,
            SensitivityParameter::MaintenanceEurPerKwc => s.maintenance_eur_per_kwc,
            SensitivityParameter::ProductibleKwhPerKwc => input.productible_kwh_per_kwc,
            SensitivityParameter::IsRatePct => s.fiscal.is_rate_pct,
        }
    }

    fn apply(&self, input: &mut FinanceModelInput, value: f64) {
        let s = &mut input.state;
        match self {
            SensitivityParameter::TarifTb => s.tarif_tb = value,
            SensitivityParameter::TarifAcc => s.tarif_acc = value,
            SensitivityParameter::PartAccPct => s.part_acc_pct = value,
            SensitivityParameter::InterestRatePct => s.interest_rate_pct = value,
            SensitivityParameter::DownPayment => s.down_payment = value,
            SensitivityParameter::MaintenanceEurPerKwc => s.maintenance_eur_per_kwc = value,
            SensitivityParameter::ProductibleKwhPerKwc => input.productible_kwh_per_kwc = value,
            SensitivityParameter::IsRatePct => s.fiscal.is_rate_pct = value,
        }
    }
}

/// KPI read out of each grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinanceMetric {
    Irr,
    AvgDscr,
    MinDscr,
    Payback,
    PaybackWithoutAcc,
}

impl FinanceMetric {
    pub fn read(&self, kpis: &FinanceKpis) -> Option<f64> {
        match self {
            FinanceMetric::Irr => kpis.irr_pct,
            FinanceMetric::AvgDscr => Some(kpis.avg_dscr),
            FinanceMetric::MinDscr => Some(kpis.min_dscr),
            FinanceMetric::Payback => kpis.payback_years,
            FinanceMetric::PaybackWithoutAcc => kpis.payback_years_without_acc,
        }
    }
}

/// Sweep specification for one axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityVariable {
    pub parameter: SensitivityParameter,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Input for 2-way sensitivity analysis of the business plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSensitivityInput {
    pub base: FinanceModelInput,
    pub variable_1: SensitivityVariable,
    pub variable_2: SensitivityVariable,
    pub output_metric: FinanceMetric,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: FinanceMetric,
    /// matrix[i][j] = metric when variable_1 = values_1[i] and variable_2 = values_2[j];
    /// `None` where the KPI is not computable or the combination is invalid
    pub matrix: Vec<Vec<Option<f64>>>,
    /// Metric for the unmodified base input
    pub base_case_value: Option<f64>,
    /// Grid cell closest to the base input (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> HangarFinanceResult<Vec<Decimal>> {
    let field = format!("variable:{}", var.parameter.name());
    if var.step <= Decimal::ZERO {
        return Err(HangarFinanceError::invalid(field, "Step must be positive"));
    }
    if var.min > var.max {
        return Err(HangarFinanceError::invalid(field, "Min must be <= max"));
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(HangarFinanceError::invalid(
                field,
                format!("Sweep exceeds {MAX_SWEEP_POINTS} points"),
            ));
        }
        values.push(current);
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: f64) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (a.to_f64().unwrap_or(f64::MAX) - target).abs();
            let db = (b.to_f64().unwrap_or(f64::MAX) - target).abs();
            da.total_cmp(&db)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Sweep two inputs of the business plan and tabulate one KPI.
pub fn run_finance_sensitivity(
    input: &FinanceSensitivityInput,
) -> HangarFinanceResult<ComputationOutput<FinanceSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variable_1.parameter == input.variable_2.parameter {
        return Err(HangarFinanceError::invalid(
            "variable_2",
            "Both axes sweep the same parameter",
        ));
    }
    validate_input(&input.base)?;

    let p1 = input.variable_1.parameter;
    let p2 = input.variable_2.parameter;
    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let mut cell = input.base.clone();
            p1.apply(&mut cell, v1.to_f64().unwrap_or(f64::NAN));
            p2.apply(&mut cell, v2.to_f64().unwrap_or(f64::NAN));

            match validate_input(&cell) {
                Ok(()) => {
                    let out = compute_finance_model(
                        cell.kwc,
                        cell.productible_kwh_per_kwc,
                        &cell.state,
                    );
                    row.push(input.output_metric.read(&out.kpis));
                }
                Err(e) => {
                    warnings.push(format!("Evaluation skipped at ({v1}, {v2}): {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    let base_out = compute_finance_model(
        input.base.kwc,
        input.base.productible_kwh_per_kwc,
        &input.base.state,
    );
    let base_case_value = input.output_metric.read(&base_out.kpis);
    let base_row = closest_index(&v1_values, p1.current(&input.base));
    let base_col = closest_index(&v2_values, p2.current(&input.base));

    let output = FinanceSensitivityOutput {
        variable_1_name: p1.name().to_string(),
        variable_2_name: p2.name().to_string(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Sensitivity Analysis (business plan)",
        &serde_json::json!({
            "variable_1": p1.name(),
            "variable_2": p2.name(),
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::state::{FinanceState, ProjectCosts};
    use rust_decimal_macros::dec;

    fn sample_input() -> FinanceSensitivityInput {
        FinanceSensitivityInput {
            base: FinanceModelInput {
                kwc: 200.0,
                productible_kwh_per_kwc: 1200.0,
                state: FinanceState {
                    tarif_tb: 0.11,
                    tarif_acc: 0.18,
                    part_acc_pct: 20.0,
                    interest_rate_pct: 4.0,
                    costs: ProjectCosts {
                        building: 150_000.0,
                        pv_system: 110_000.0,
                        grid_connection: 15_000.0,
                        ..Default::default()
                    },
                    maintenance_eur_per_kwc: 10.0,
                    ..Default::default()
                },
            },
            variable_1: SensitivityVariable {
                parameter: SensitivityParameter::TarifTb,
                min: dec!(0.09),
                max: dec!(0.13),
                step: dec!(0.01),
            },
            variable_2: SensitivityVariable {
                parameter: SensitivityParameter::ProductibleKwhPerKwc,
                min: dec!(1000),
                max: dec!(1400),
                step: dec!(100),
            },
            output_metric: FinanceMetric::Irr,
        }
    }

    #[test]
    fn test_grid_shape_and_base_case() {
        let result = run_finance_sensitivity(&sample_input()).unwrap();
        let out = &result.result;

        assert_eq!(out.variable_1_name, "tarifTb");
        assert_eq!(out.variable_1_values.len(), 5);
        assert_eq!(out.variable_2_values.len(), 5);
        assert_eq!(out.matrix.len(), 5);
        assert_eq!(out.matrix[0].len(), 5);
        // 0.11 and 1200 sit in the middle of both sweeps
        assert_eq!(out.base_case_position, (2, 2));
        assert_eq!(out.matrix[2][2], out.base_case_value);
    }

    #[test]
    fn test_irr_monotonic_in_tariff_and_yield() {
        let result = run_finance_sensitivity(&sample_input()).unwrap();
        let m = &result.result.matrix;
        for i in 0..m.len() - 1 {
            assert!(m[i][2].unwrap() < m[i + 1][2].unwrap());
        }
        for j in 0..m[0].len() - 1 {
            assert!(m[2][j].unwrap() < m[2][j + 1].unwrap());
        }
    }

    #[test]
    fn test_invalid_cells_become_none() {
        let mut input = sample_input();
        input.variable_2 = SensitivityVariable {
            parameter: SensitivityParameter::PartAccPct,
            min: dec!(80),
            max: dec!(120),
            step: dec!(20),
        };
        let result = run_finance_sensitivity(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.variable_2_values, vec![dec!(80), dec!(100), dec!(120)]);
        assert!(out.matrix.iter().all(|row| row[2].is_none()));
        assert!(out.matrix.iter().all(|row| row[0].is_some()));
        assert_eq!(result.warnings.len(), 5);
    }

    #[test]
    fn test_sweep_with_non_exact_step() {
        let var = SensitivityVariable {
            parameter: SensitivityParameter::TarifAcc,
            min: dec!(0),
            max: dec!(1),
            step: dec!(0.3),
        };
        let vals = generate_sweep_values(&var).unwrap();
        // 0, 0.3, 0.6, 0.9, 1.0 (max appended)
        assert_eq!(vals.len(), 5);
        assert_eq!(*vals.last().unwrap(), dec!(1));
    }

    #[test]
    fn test_rejects_same_parameter_twice() {
        let mut input = sample_input();
        input.variable_2.parameter = SensitivityParameter::TarifTb;
        assert!(run_finance_sensitivity(&input).is_err());
    }

    #[test]
    fn test_rejects_zero_step() {
        let mut input = sample_input();
        input.variable_1.step = dec!(0);
        assert!(run_finance_sensitivity(&input).is_err());
    }

    #[test]
    fn test_rejects_oversized_sweep() {
        let mut input = sample_input();
        input.variable_1.step = dec!(0.00001);
        assert!(run_finance_sensitivity(&input).is_err());
    }
}
