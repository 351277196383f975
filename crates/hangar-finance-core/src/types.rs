use serde::{Deserialize, Serialize};

/// Currency amounts in plain units (euros), never minor units.
///
/// The business plan runs in binary floating point so that two runs over the
/// same inputs are bit-identical; exact decimal money is only used for the
/// tariff grid (see `pricing`).
pub type Money = f64;

/// Percentages as entered by the user (4.5 = 4.5%). Divided by 100 at use.
pub type Pct = f64;

/// Installed peak power in kilowatt-peak
pub type Kwc = f64;

/// Year fractions or counts
pub type Years = f64;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

/// Round half-up (towards +inf) to `decimals` places.
///
/// Only for presentation values; never call inside a simulation loop.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}
