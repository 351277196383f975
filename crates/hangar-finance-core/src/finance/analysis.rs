use std::time::Instant;

use crate::error::HangarFinanceError;
use crate::finance::model::{compute_finance_model, FinanceModelResult};
use crate::finance::state::FinanceModelInput;
use crate::types::{with_metadata, ComputationOutput};
use crate::HangarFinanceResult;

/// Minimum DSCR a lender usually covenants on
const DSCR_COVENANT: f64 = 1.2;

/// Run the business plan with its preconditions enforced.
///
/// [`compute_finance_model`] accepts anything and leaves validation to the
/// caller; this is that caller. Rejects negative power / yield / costs,
/// a self-consumption share outside 0–100, non-finite values and a zero
/// horizon, then attaches warnings about the result.
pub fn analyze_finance_model(
    input: &FinanceModelInput,
) -> HangarFinanceResult<ComputationOutput<FinanceModelResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    tracing::debug!(
        kwc = input.kwc,
        productible = input.productible_kwh_per_kwc,
        years = input.state.fiscal.duration_years,
        "running finance model"
    );

    let state = &input.state;
    let out = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, state);

    // ── Warnings ─────────────────────────────────────────────────────
    if state.down_payment > out.total_cost {
        warnings.push(format!(
            "Down payment of {} exceeds total cost {}; clamped, nothing is borrowed",
            state.down_payment, out.total_cost
        ));
    }
    if out.kpis.irr_pct.is_none() {
        warnings.push("IRR could not be computed for these cash flows".to_string());
    }
    if out.kpis.payback_years.is_none() {
        warnings.push(format!(
            "Total cost is not recovered within {} years",
            state.fiscal.duration_years
        ));
    }
    // Without borrowing DSCR is 0 by convention and no covenant applies
    if out.capital_emprunte > 0.0 && out.kpis.min_dscr < DSCR_COVENANT {
        warnings.push(format!(
            "Minimum DSCR of {} is below the {DSCR_COVENANT}x lender covenant",
            out.kpis.min_dscr
        ));
    }
    for w in &warnings {
        tracing::warn!("{w}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Solar canopy business plan (straight-line loan, loss carry-forward)",
        &serde_json::json!({
            "kwc": input.kwc,
            "productible_kwh_per_kwc": input.productible_kwh_per_kwc,
            "duration_years": state.fiscal.duration_years,
            "total_cost": out.total_cost,
            "part_acc_pct": state.part_acc_pct,
            "interest_rate_pct": state.interest_rate_pct,
        }),
        warnings,
        elapsed,
        out,
    ))
}

/// Validate all input constraints.
pub fn validate_input(input: &FinanceModelInput) -> HangarFinanceResult<()> {
    non_negative("kwc", input.kwc)?;
    non_negative("productibleKwhPerKwc", input.productible_kwh_per_kwc)?;

    let state = &input.state;
    if state.fiscal.duration_years < 1 {
        return Err(HangarFinanceError::invalid(
            "fiscal.durationYears",
            "Business plan must span at least 1 year",
        ));
    }

    finite("partAccPct", state.part_acc_pct)?;
    if !(0.0..=100.0).contains(&state.part_acc_pct) {
        return Err(HangarFinanceError::invalid(
            "partAccPct",
            "Self-consumption share must be between 0 and 100",
        ));
    }

    non_negative("tarifTb", state.tarif_tb)?;
    non_negative("tarifAcc", state.tarif_acc)?;
    non_negative("downPayment", state.down_payment)?;
    non_negative("maintenanceEurPerKwc", state.maintenance_eur_per_kwc)?;
    non_negative("interestRatePct", state.interest_rate_pct)?;
    non_negative("fiscal.isRatePct", state.fiscal.is_rate_pct)?;
    non_negative("fiscal.iferEurPerKwc", state.fiscal.ifer_eur_per_kwc)?;

    for (name, value) in state.costs.components() {
        non_negative(&format!("costs.{name}"), value)?;
    }
    for (name, value) in state.options.components() {
        non_negative(&format!("options.{name}"), value)?;
    }
    for (name, value) in state.inflation.components() {
        finite(&format!("inflation.{name}"), value)?;
        if value <= -100.0 {
            return Err(HangarFinanceError::invalid(
                format!("inflation.{name}"),
                "Inflation rate must be greater than -100%",
            ));
        }
    }

    Ok(())
}

fn finite(field: &str, value: f64) -> HangarFinanceResult<()> {
    if !value.is_finite() {
        return Err(HangarFinanceError::invalid(field, "Value must be finite"));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> HangarFinanceResult<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(HangarFinanceError::invalid(field, "Value cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::state::{FinanceState, FiscalParams, ProjectCosts};

    fn standard_input() -> FinanceModelInput {
        FinanceModelInput {
            kwc: 250.0,
            productible_kwh_per_kwc: 1250.0,
            state: FinanceState {
                tarif_tb: 0.11,
                tarif_acc: 0.19,
                part_acc_pct: 30.0,
                interest_rate_pct: 4.5,
                down_payment: 40_000.0,
                costs: ProjectCosts {
                    building: 180_000.0,
                    foundations: 25_000.0,
                    pv_system: 120_000.0,
                    grid_connection: 25_000.0,
                    earthworks: 8_000.0,
                    engineering: 9_000.0,
                    permitting: 3_000.0,
                    contingency: 10_000.0,
                },
                maintenance_eur_per_kwc: 9.0,
                fiscal: FiscalParams::default(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_valid_project_runs() {
        let output = analyze_finance_model(&standard_input()).unwrap();
        let out = &output.result;
        assert_eq!(out.series.len(), 20);
        assert!(out.kpis.irr_pct.unwrap() > 0.0);
        assert_eq!(output.metadata.precision, "ieee754_f64");
        assert_eq!(output.assumptions["duration_years"], 20);
    }

    #[test]
    fn test_rejects_zero_duration() {
        let mut input = standard_input();
        input.state.fiscal.duration_years = 0;
        match analyze_finance_model(&input).unwrap_err() {
            HangarFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "fiscal.durationYears");
            }
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_self_consumption() {
        let mut input = standard_input();
        input.state.part_acc_pct = 120.0;
        assert!(analyze_finance_model(&input).is_err());
        input.state.part_acc_pct = -1.0;
        assert!(analyze_finance_model(&input).is_err());
    }

    #[test]
    fn test_rejects_negative_cost_component() {
        let mut input = standard_input();
        input.state.costs.earthworks = -5.0;
        match analyze_finance_model(&input).unwrap_err() {
            HangarFinanceError::InvalidInput { field, .. } => {
                assert_eq!(field, "costs.earthworks");
            }
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_finite_power() {
        let mut input = standard_input();
        input.kwc = f64::NAN;
        assert!(analyze_finance_model(&input).is_err());
    }

    #[test]
    fn test_warns_on_clamped_down_payment() {
        let mut input = standard_input();
        input.state.down_payment = 1_000_000.0;
        let output = analyze_finance_model(&input).unwrap();
        assert_eq!(output.result.capital_emprunte, 0.0);
        assert!(output.warnings.iter().any(|w| w.contains("clamped")));
    }

    #[test]
    fn test_warns_when_never_recovered() {
        let mut input = standard_input();
        input.state.tarif_tb = 0.01;
        input.state.tarif_acc = 0.01;
        let output = analyze_finance_model(&input).unwrap();
        assert_eq!(output.result.kpis.payback_years, None);
        assert!(output.warnings.iter().any(|w| w.contains("not recovered")));
    }

    #[test]
    fn test_warns_on_negative_dscr_when_borrowing() {
        let input = FinanceModelInput {
            kwc: 150.0,
            productible_kwh_per_kwc: 1100.0,
            state: FinanceState {
                tarif_tb: 0.01,
                interest_rate_pct: 4.0,
                costs: ProjectCosts {
                    building: 120_000.0,
                    pv_system: 80_000.0,
                    ..Default::default()
                },
                maintenance_eur_per_kwc: 10.0,
                fiscal: FiscalParams::default(),
                ..Default::default()
            },
        };
        let output = analyze_finance_model(&input).unwrap();
        assert_eq!(output.result.capital_emprunte, 200_000.0);
        assert!(output.result.kpis.min_dscr < 0.0);
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("Minimum DSCR") && w.contains("covenant")));
    }

    #[test]
    fn test_no_dscr_warning_without_debt() {
        let mut input = standard_input();
        input.state.down_payment = input.state.total_cost();
        let output = analyze_finance_model(&input).unwrap();
        assert_eq!(output.result.kpis.min_dscr, 0.0);
        assert!(!output.warnings.iter().any(|w| w.contains("Minimum DSCR")));
    }
}
