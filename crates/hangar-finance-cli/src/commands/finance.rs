use chrono::Utc;
use clap::Args;
use serde_json::Value;

use hangar_finance_core::finance::snapshot::FinanceSnapshot;
use hangar_finance_core::finance::{self, FinanceModelInput};

use crate::input;

/// Arguments for the business plan
#[derive(Args)]
pub struct ModelArgs {
    /// Path to JSON/YAML input file: { kwc, productibleKwhPerKwc, state }
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for an audit snapshot
#[derive(Args)]
pub struct SnapshotArgs {
    /// Path to JSON/YAML input file: { kwc, productibleKwhPerKwc, state }
    #[arg(long)]
    pub input: Option<String>,

    /// Free-text label stored with the snapshot
    #[arg(long)]
    pub label: Option<String>,
}

fn read_model_input(path: Option<&str>) -> Result<FinanceModelInput, Box<dyn std::error::Error>> {
    input::read_structured(path)?
        .ok_or_else(|| "--input <file> or stdin required for the business plan".into())
}

pub fn run_model(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model_input = read_model_input(args.input.as_deref())?;
    let result = finance::compute_finance_model(
        model_input.kwc,
        model_input.productible_kwh_per_kwc,
        &model_input.state,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_analyze(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model_input = read_model_input(args.input.as_deref())?;
    let result = finance::analyze_finance_model(&model_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_snapshot(args: SnapshotArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model_input = read_model_input(args.input.as_deref())?;
    let output = finance::analyze_finance_model(&model_input)?;
    let snapshot = FinanceSnapshot::capture(&model_input, &output.result, Utc::now(), args.label);
    Ok(serde_json::to_value(snapshot)?)
}
