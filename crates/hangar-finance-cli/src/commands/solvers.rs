use clap::Args;
use serde_json::{json, Value};

use hangar_finance_core::time_value;

/// Arguments for IRR
#[derive(Args)]
pub struct IrrArgs {
    /// Cash flows, initial outlay first (comma-separated, e.g. "-1000,400,400,400")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<f64>,

    /// Newton-Raphson iteration cap
    #[arg(long, default_value_t = time_value::DEFAULT_IRR_MAX_ITER)]
    pub max_iter: u32,

    /// Convergence tolerance on the rate step
    #[arg(long, default_value_t = time_value::DEFAULT_IRR_TOLERANCE)]
    pub tol: f64,
}

/// Arguments for payback
#[derive(Args)]
pub struct PaybackArgs {
    /// Amount to recover
    #[arg(long)]
    pub total_cost: f64,

    /// Cumulative revenue at the end of each year (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cumulative: Vec<f64>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr = time_value::compute_irr(&args.cash_flows, args.max_iter, args.tol);
    Ok(json!({
        "irr": irr,
        "converged": irr.is_some(),
        "periods": args.cash_flows.len().saturating_sub(1),
    }))
}

pub fn run_payback(args: PaybackArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payback = time_value::compute_payback(args.total_cost, &args.cumulative);
    Ok(json!({
        "paybackYears": payback,
        "recovered": payback.is_some(),
        "horizonYears": args.cumulative.len(),
    }))
}
