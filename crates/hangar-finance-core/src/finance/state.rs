use serde::{Deserialize, Serialize};

use crate::types::{Kwc, Money, Pct};

/// Capital expenditure breakdown. Components sum to the uninflated base
/// project cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectCosts {
    /// Steel frame and roofing of the canopy
    pub building: Money,
    pub foundations: Money,
    /// Modules, inverters, mounting and cabling
    pub pv_system: Money,
    /// Utility connection fee
    pub grid_connection: Money,
    pub earthworks: Money,
    /// Design office and structural studies
    pub engineering: Money,
    /// Building permit and administrative filings
    pub permitting: Money,
    pub contingency: Money,
}

impl ProjectCosts {
    pub fn total(&self) -> Money {
        self.building
            + self.foundations
            + self.pv_system
            + self.grid_connection
            + self.earthworks
            + self.engineering
            + self.permitting
            + self.contingency
    }

    /// Named components in declaration order, for validation and display.
    pub fn components(&self) -> [(&'static str, Money); 8] {
        [
            ("building", self.building),
            ("foundations", self.foundations),
            ("pvSystem", self.pv_system),
            ("gridConnection", self.grid_connection),
            ("earthworks", self.earthworks),
            ("engineering", self.engineering),
            ("permitting", self.permitting),
            ("contingency", self.contingency),
        ]
    }
}

/// Optional capex line items, zero unless selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectOptions {
    /// Side cladding
    pub cladding: Money,
    pub gutters: Money,
    pub lighting: Money,
}

impl ProjectOptions {
    pub fn total(&self) -> Money {
        self.cladding + self.gutters + self.lighting
    }

    pub fn components(&self) -> [(&'static str, Money); 3] {
        [
            ("cladding", self.cladding),
            ("gutters", self.gutters),
            ("lighting", self.lighting),
        ]
    }
}

/// Annual inflation rates (%), each compounding independently from year 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InflationRates {
    pub tarif_tb: Pct,
    pub tarif_acc: Pct,
    pub maintenance: Pct,
    pub insurance: Pct,
    pub misc: Pct,
    pub ifer: Pct,
}

impl InflationRates {
    pub fn components(&self) -> [(&'static str, Pct); 6] {
        [
            ("tarifTb", self.tarif_tb),
            ("tarifAcc", self.tarif_acc),
            ("maintenance", self.maintenance),
            ("insurance", self.insurance),
            ("misc", self.misc),
            ("ifer", self.ifer),
        ]
    }
}

/// Tax parameters and business-plan horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalParams {
    /// Corporate income tax rate (%)
    pub is_rate_pct: Pct,
    /// IFER per-kWc annual tax, only due above 100 kWc
    pub ifer_eur_per_kwc: Money,
    pub duration_years: u32,
}

impl Default for FiscalParams {
    fn default() -> Self {
        FiscalParams {
            is_rate_pct: 25.0,
            ifer_eur_per_kwc: 8.36,
            duration_years: 20,
        }
    }
}

/// Editable financing assumptions of a project. Immutable for the duration
/// of one model run; installed power and specific yield are passed alongside
/// it, never inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceState {
    /// Export tariff (€/kWh)
    pub tarif_tb: Money,
    /// Self-consumption value (€/kWh)
    pub tarif_acc: Money,
    /// Share of production self-consumed (0–100)
    pub part_acc_pct: Pct,
    pub interest_rate_pct: Pct,
    pub down_payment: Money,
    #[serde(default)]
    pub costs: ProjectCosts,
    #[serde(default)]
    pub options: ProjectOptions,
    pub maintenance_eur_per_kwc: Money,
    #[serde(default)]
    pub inflation: InflationRates,
    #[serde(default)]
    pub fiscal: FiscalParams,
}

impl FinanceState {
    /// Uninflated capex: cost components plus selected options.
    pub fn total_cost(&self) -> Money {
        self.costs.total() + self.options.total()
    }
}

/// A model run request: the state plus the two read-only quantities supplied
/// by the building configuration and the production estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceModelInput {
    pub kwc: Kwc,
    pub productible_kwh_per_kwc: f64,
    pub state: FinanceState,
}

/// The down payment actually applied: never more than the project costs.
/// Excess is dropped silently; the borrowed capital is then zero.
pub fn clamp_down_payment(down_payment: Money, total_cost: Money) -> Money {
    down_payment.min(total_cost)
}
