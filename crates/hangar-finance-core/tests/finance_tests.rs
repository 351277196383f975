use hangar_finance_core::finance::state::{FiscalParams, InflationRates, ProjectCosts, ProjectOptions};
use hangar_finance_core::finance::{
    analyze_finance_model, clamp_down_payment, compute_finance_model, FinanceModelInput,
    FinanceState,
};
use hangar_finance_core::time_value::{compute_irr, compute_payback, irr};
use pretty_assertions::assert_eq;

// ===========================================================================
// Fixtures
// ===========================================================================

fn hundred_k_costs() -> ProjectCosts {
    ProjectCosts {
        building: 52_000.0,
        foundations: 9_000.0,
        pv_system: 27_000.0,
        grid_connection: 7_000.0,
        earthworks: 1_500.0,
        engineering: 2_000.0,
        permitting: 500.0,
        contingency: 1_000.0,
    }
}

/// Typical 20-year agricultural hangar: 300 kWc, 40% self-consumed.
fn farm_hangar() -> FinanceModelInput {
    FinanceModelInput {
        kwc: 300.0,
        productible_kwh_per_kwc: 1_180.0,
        state: FinanceState {
            tarif_tb: 0.105,
            tarif_acc: 0.19,
            part_acc_pct: 40.0,
            interest_rate_pct: 4.2,
            down_payment: 50_000.0,
            costs: ProjectCosts {
                building: 240_000.0,
                foundations: 30_000.0,
                pv_system: 165_000.0,
                grid_connection: 28_000.0,
                earthworks: 12_000.0,
                engineering: 9_000.0,
                permitting: 2_500.0,
                contingency: 14_000.0,
            },
            options: ProjectOptions {
                cladding: 18_000.0,
                gutters: 4_000.0,
                lighting: 0.0,
            },
            maintenance_eur_per_kwc: 9.5,
            inflation: InflationRates {
                tarif_tb: 0.5,
                tarif_acc: 2.0,
                maintenance: 2.0,
                insurance: 2.0,
                misc: 1.5,
                ifer: 1.0,
            },
            fiscal: FiscalParams {
                is_rate_pct: 25.0,
                ifer_eur_per_kwc: 8.36,
                duration_years: 20,
            },
        },
    }
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_reference_scenario_five_years() {
    let state = FinanceState {
        tarif_tb: 0.13,
        costs: hundred_k_costs(),
        fiscal: FiscalParams {
            is_rate_pct: 25.0,
            ifer_eur_per_kwc: 8.36,
            duration_years: 5,
        },
        ..Default::default()
    };
    let out = compute_finance_model(100.0, 1200.0, &state);

    assert_eq!(out.production_annual_kwh, 120_000.0);
    assert_eq!(out.total_cost, 100_000.0);
    assert_eq!(out.capital_emprunte, 100_000.0);
    assert!((out.series[0].ca_tb - 15_600.0).abs() < 1e-6);
    for row in &out.series {
        assert_eq!(row.amortissement, 20_000.0);
        assert_eq!(row.interets, 0.0);
    }
    let y1 = &out.series[0];
    assert!((y1.dscr - y1.ebe / 20_000.0).abs() < 1e-12);
}

// ===========================================================================
// Properties on a realistic project
// ===========================================================================

#[test]
fn test_conservation_and_schedule_on_farm_hangar() {
    let input = farm_hangar();
    let out = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, &input.state);
    let n = out.series.len();
    assert_eq!(n, 20);
    assert_eq!(out.total_cost, 522_500.0);
    assert_eq!(out.capital_emprunte, 472_500.0);

    let amort = out.capital_emprunte / n as f64;
    for (i, row) in out.series.iter().enumerate() {
        assert_eq!(row.year as usize, i + 1);
        assert!((row.total_ca - (row.ca_acc + row.ca_tb)).abs() < 1e-9);
        assert!((row.ebe - (row.total_ca - row.charges.total_charges)).abs() < 1e-9);
        assert!((row.dach - (out.capital_emprunte - amort * i as f64)).abs() < 1e-6);
        assert!(row.is >= 0.0);
        assert_eq!(row.amortissement, amort);
    }
    assert!((out.series[n - 1].dach - amort).abs() < 1e-6);
    // 300 kWc is above the IFER threshold
    assert!(out.series[0].charges.ifer > 0.0);
    // Self-consumption tariff inflates faster than export
    assert!(out.series[19].ca_acc / out.series[0].ca_acc > out.series[19].ca_tb / out.series[0].ca_tb);
}

#[test]
fn test_kpis_consistent_with_solvers() {
    let input = farm_hangar();
    let out = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, &input.state);

    let mut flows = vec![-out.total_cost];
    flows.extend(out.series.iter().map(|r| r.ebe));
    let raw_irr = irr(&flows).unwrap();
    assert!((out.kpis.irr_pct.unwrap() - raw_irr).abs() <= 0.005 + 1e-12);

    let raw_payback = compute_payback(out.total_cost, &out.cumulative.ca_with_acc).unwrap();
    assert!((out.kpis.payback_years.unwrap() - raw_payback).abs() <= 0.05 + 1e-12);

    let raw_without = compute_payback(out.total_cost, &out.cumulative.ca_tb_only).unwrap();
    assert!((out.kpis.payback_years_without_acc.unwrap() - raw_without).abs() <= 0.05 + 1e-12);
    assert!(raw_payback < raw_without);
}

#[test]
fn test_down_payment_above_cost() {
    let mut input = farm_hangar();
    input.state.down_payment = 900_000.0;
    let out = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, &input.state);
    assert_eq!(out.down_payment, out.total_cost);
    assert_eq!(out.down_payment, clamp_down_payment(900_000.0, out.total_cost));
    assert_eq!(out.capital_emprunte, 0.0);
    assert!(out.series.iter().all(|r| r.interets == 0.0 && r.dscr == 0.0));
}

#[test]
fn test_bit_identical_reruns() {
    let input = farm_hangar();
    let a = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, &input.state);
    let b = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, &input.state);
    for (ra, rb) in a.series.iter().zip(&b.series) {
        assert_eq!(ra.resultat_net.to_bits(), rb.resultat_net.to_bits());
        assert_eq!(ra.dscr.to_bits(), rb.dscr.to_bits());
    }
    assert_eq!(a, b);
}

// ===========================================================================
// Solvers
// ===========================================================================

#[test]
fn test_irr_reference_values() {
    assert!((irr(&[-1000.0, 1100.0]).unwrap() - 10.0).abs() < 0.01);
    assert_eq!(irr(&[100.0, 200.0]), None);
    assert_eq!(irr(&[-1000.0]), None);
    // -100 then +300 three years later: 3^(1/3) - 1 ≈ 44.22%
    let r = compute_irr(&[-100.0, 0.0, 0.0, 300.0], 200, 1e-8).unwrap();
    assert!((r - 44.22).abs() < 0.01, "got {r}");
}

#[test]
fn test_payback_reference_values() {
    assert_eq!(compute_payback(1000.0, &[1000.0]), Some(1.0));
    assert_eq!(compute_payback(1000.0, &[500.0, 1500.0]), Some(1.5));
    assert_eq!(compute_payback(1000.0, &[100.0, 200.0, 300.0]), None);
}

// ===========================================================================
// Serialization boundary
// ===========================================================================

#[test]
fn test_result_uses_camel_case_keys() {
    let input = farm_hangar();
    let out = analyze_finance_model(&input).unwrap();
    let json = serde_json::to_value(&out.result).unwrap();

    assert!(json.get("capitalEmprunte").is_some());
    assert!(json["kpis"].get("irrPct").is_some());
    assert!(json["kpis"].get("paybackYearsWithoutAcc").is_some());
    assert!(json["series"][0].get("resultatNet").is_some());
    assert!(json["series"][0]["charges"].get("totalCharges").is_some());
    assert!(json["cumulative"].get("costLine").is_some());
    assert_eq!(json["series"].as_array().unwrap().len(), 20);
}

#[test]
fn test_input_round_trips_through_json() {
    let input = farm_hangar();
    let json = serde_json::to_string(&input).unwrap();
    let back: FinanceModelInput = serde_json::from_str(&json).unwrap();
    assert_eq!(back, input);
}
