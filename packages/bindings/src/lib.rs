use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use hangar_finance_core::finance::{analyze_finance_model, compute_finance_model, FinanceModelInput};
use hangar_finance_core::pricing::{
    build_default_state, lookup_building_cost, BuildingSpec, BuildingType, FinanceDefaults,
    TariffGrid,
};
use hangar_finance_core::scenarios::{run_finance_sensitivity, FinanceSensitivityInput};
use hangar_finance_core::time_value;

fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<'a, T: Deserialize<'a>>(json: &'a str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

fn grid_or_builtin(grid_json: Option<String>) -> NapiResult<TariffGrid> {
    match grid_json {
        Some(json) => TariffGrid::from_json(&json).map_err(to_napi_error),
        None => Ok(TariffGrid::builtin()),
    }
}

// ---------------------------------------------------------------------------
// Finance model
// ---------------------------------------------------------------------------

/// Raw business plan: `{ kwc, productibleKwhPerKwc, state }` in, result out.
#[napi(js_name = "computeFinanceModel")]
pub fn compute_finance_model_json(input_json: String) -> NapiResult<String> {
    let input: FinanceModelInput = parse(&input_json)?;
    let output = compute_finance_model(input.kwc, input.productible_kwh_per_kwc, &input.state);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Validated business plan wrapped with warnings and metadata.
#[napi(js_name = "analyzeFinanceModel")]
pub fn analyze_finance_model_json(input_json: String) -> NapiResult<String> {
    let input: FinanceModelInput = parse(&input_json)?;
    let output = analyze_finance_model(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn finance_sensitivity(input_json: String) -> NapiResult<String> {
    let input: FinanceSensitivityInput = parse(&input_json)?;
    let output = run_finance_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// IRR in percent, or `null` when the solver does not converge.
#[napi]
pub fn compute_irr(cash_flows: Vec<f64>, max_iter: Option<u32>, tol: Option<f64>) -> Option<f64> {
    time_value::compute_irr(
        &cash_flows,
        max_iter.unwrap_or(time_value::DEFAULT_IRR_MAX_ITER),
        tol.unwrap_or(time_value::DEFAULT_IRR_TOLERANCE),
    )
}

/// Years to recover `total_cost`, or `null` if never reached.
#[napi]
pub fn compute_payback(total_cost: f64, cumulative_revenue: Vec<f64>) -> Option<f64> {
    time_value::compute_payback(total_cost, &cumulative_revenue)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    building_type: BuildingType,
    width_m: Decimal,
    spans: u32,
}

/// `{ buildingType, widthM, spans }` against the built-in grid or a custom one.
#[napi(js_name = "lookupBuildingCost")]
pub fn lookup_building_cost_json(
    request_json: String,
    grid_json: Option<String>,
) -> NapiResult<Option<String>> {
    let req: LookupRequest = parse(&request_json)?;
    let grid = grid_or_builtin(grid_json)?;
    lookup_building_cost(&grid, req.building_type, req.width_m, req.spans)
        .map(|hit| serde_json::to_string(&hit).map_err(to_napi_error))
        .transpose()
}

#[napi(js_name = "buildDefaultState")]
pub fn build_default_state_json(
    spec_json: String,
    defaults_json: Option<String>,
    grid_json: Option<String>,
) -> NapiResult<String> {
    let spec: BuildingSpec = parse(&spec_json)?;
    let defaults: FinanceDefaults = match defaults_json {
        Some(json) => parse(&json)?,
        None => FinanceDefaults::default(),
    };
    let grid = grid_or_builtin(grid_json)?;
    let output = build_default_state(&grid, &spec, &defaults).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
