pub mod defaults;
pub mod tariff_grid;

pub use defaults::{build_default_state, BuildingSpec, DefaultState, FinanceDefaults};
pub use tariff_grid::{lookup_building_cost, BuildingCostLookup, BuildingType, TariffGrid};
