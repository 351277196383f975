use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use hangar_finance_core::pricing::{
    build_default_state, lookup_building_cost, BuildingSpec, BuildingType, FinanceDefaults,
    TariffGrid,
};

use crate::input;

/// Arguments for a tariff lookup
#[derive(Args)]
pub struct PricingArgs {
    /// Building type: single_slope, double_slope or carport
    #[arg(long, value_parser = parse_building_type)]
    pub building_type: BuildingType,

    /// Building width in metres
    #[arg(long)]
    pub width: Decimal,

    /// Number of spans
    #[arg(long)]
    pub spans: u32,

    /// Tariff grid JSON file (defaults to the built-in grid)
    #[arg(long)]
    pub grid: Option<String>,
}

/// Arguments for default finance state construction
#[derive(Args)]
pub struct DefaultsArgs {
    #[command(flatten)]
    pub building: PricingArgs,

    /// Commercial assumptions JSON/YAML file (defaults to built-in values)
    #[arg(long)]
    pub config: Option<String>,
}

fn parse_building_type(s: &str) -> Result<BuildingType, String> {
    serde_json::from_value(Value::String(s.to_string()))
        .map_err(|_| format!("unknown building type '{s}' (single_slope, double_slope, carport)"))
}

fn load_grid(path: Option<&str>) -> Result<TariffGrid, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(TariffGrid::from_json(&input::file::read_text(p)?)?),
        None => Ok(TariffGrid::builtin()),
    }
}

pub fn run_pricing(args: PricingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let grid = load_grid(args.grid.as_deref())?;
    let lookup = lookup_building_cost(&grid, args.building_type, args.width, args.spans)
        .ok_or_else(|| {
            format!(
                "No tariff table for {} at width {} m",
                args.building_type, args.width
            )
        })?;
    Ok(serde_json::to_value(lookup)?)
}

pub fn run_defaults(args: DefaultsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let grid = load_grid(args.building.grid.as_deref())?;
    let defaults: FinanceDefaults = match args.config.as_deref() {
        Some(path) => input::file::read_input(path)?,
        None => FinanceDefaults::default(),
    };
    let spec = BuildingSpec {
        building_type: args.building.building_type,
        width_m: args.building.width,
        spans: args.building.spans,
    };
    let result = build_default_state(&grid, &spec, &defaults)?;
    Ok(serde_json::to_value(result)?)
}
