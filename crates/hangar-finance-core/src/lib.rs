pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "finance")]
pub mod finance;

#[cfg(feature = "pricing")]
pub mod pricing;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::HangarFinanceError;
pub use types::*;

/// Standard result type for all checked hangar-finance operations
pub type HangarFinanceResult<T> = Result<T, HangarFinanceError>;
