use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HangarFinanceError;
use crate::finance::state::{
    FinanceState, FiscalParams, InflationRates, ProjectCosts, ProjectOptions,
};
use crate::pricing::tariff_grid::{BuildingCostLookup, BuildingType, TariffGrid};
use crate::types::{Kwc, Money, Pct};
use crate::HangarFinanceResult;

/// Building configuration chosen in the configurator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSpec {
    pub building_type: BuildingType,
    pub width_m: Decimal,
    pub spans: u32,
}

/// Commercial assumptions used to pre-fill a new project's finance state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinanceDefaults {
    pub tarif_tb: Money,
    pub tarif_acc: Money,
    pub part_acc_pct: Pct,
    pub interest_rate_pct: Pct,
    pub down_payment: Money,
    pub maintenance_eur_per_kwc: Money,
    /// Modules, inverters and cabling per installed kWc
    pub pv_cost_per_kwc: Money,
    pub foundations: Money,
    pub grid_connection: Money,
    pub earthworks: Money,
    pub engineering: Money,
    pub permitting: Money,
    /// Contingency as a share of every other cost component
    pub contingency_pct: Pct,
    pub inflation: InflationRates,
    pub fiscal: FiscalParams,
}

impl Default for FinanceDefaults {
    fn default() -> Self {
        FinanceDefaults {
            tarif_tb: 0.11,
            tarif_acc: 0.18,
            part_acc_pct: 0.0,
            interest_rate_pct: 4.5,
            down_payment: 0.0,
            maintenance_eur_per_kwc: 10.0,
            pv_cost_per_kwc: 550.0,
            foundations: 0.0,
            grid_connection: 15_000.0,
            earthworks: 0.0,
            engineering: 4_500.0,
            permitting: 1_500.0,
            contingency_pct: 3.0,
            inflation: InflationRates {
                tarif_tb: 0.0,
                tarif_acc: 2.0,
                maintenance: 2.0,
                insurance: 2.0,
                misc: 2.0,
                ifer: 1.0,
            },
            fiscal: FiscalParams::default(),
        }
    }
}

/// A pre-filled finance state and the pricing it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultState {
    /// Installed power read from the grid's reference configuration
    pub kwc: Kwc,
    pub pricing: BuildingCostLookup,
    pub state: FinanceState,
}

fn to_money(field: &str, value: Decimal) -> HangarFinanceResult<Money> {
    value.to_f64().ok_or_else(|| {
        HangarFinanceError::invalid(field, format!("{value} is not representable as f64"))
    })
}

/// Pre-fill a finance state for `spec` from the tariff grid.
///
/// The building line is the grid tariff, the PV system is priced per
/// reference kWc, and contingency is a percentage of the other components.
pub fn build_default_state(
    grid: &TariffGrid,
    spec: &BuildingSpec,
    defaults: &FinanceDefaults,
) -> HangarFinanceResult<DefaultState> {
    if defaults.contingency_pct < 0.0 {
        return Err(HangarFinanceError::invalid(
            "contingencyPct",
            "Contingency cannot be negative",
        ));
    }

    let pricing = grid
        .lookup(spec.building_type, spec.width_m, spec.spans)
        .ok_or_else(|| HangarFinanceError::PricingUnavailable {
            building_type: spec.building_type.to_string(),
            width: spec.width_m.to_string(),
        })?;

    let kwc = to_money("kwcGrid", pricing.kwc_grid)?;
    let mut costs = ProjectCosts {
        building: to_money("tarif", pricing.tarif)?,
        foundations: defaults.foundations,
        pv_system: kwc * defaults.pv_cost_per_kwc,
        grid_connection: defaults.grid_connection,
        earthworks: defaults.earthworks,
        engineering: defaults.engineering,
        permitting: defaults.permitting,
        contingency: 0.0,
    };
    costs.contingency = costs.total() * defaults.contingency_pct / 100.0;

    tracing::debug!(
        building_type = %spec.building_type,
        spans = spec.spans,
        kwc,
        interpolated = pricing.interpolated,
        "built default finance state"
    );

    Ok(DefaultState {
        kwc,
        pricing,
        state: FinanceState {
            tarif_tb: defaults.tarif_tb,
            tarif_acc: defaults.tarif_acc,
            part_acc_pct: defaults.part_acc_pct,
            interest_rate_pct: defaults.interest_rate_pct,
            down_payment: defaults.down_payment,
            costs,
            options: ProjectOptions::default(),
            maintenance_eur_per_kwc: defaults.maintenance_eur_per_kwc,
            inflation: defaults.inflation.clone(),
            fiscal: defaults.fiscal.clone(),
        },
    })
}
