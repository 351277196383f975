use clap::Args;
use serde_json::Value;

use hangar_finance_core::scenarios::sensitivity::{self, FinanceSensitivityInput};

use crate::input;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON/YAML input file: { base, variable1, variable2, outputMetric }
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: FinanceSensitivityInput = input::read_structured(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for sensitivity analysis")?;
    let result = sensitivity::run_finance_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}
