pub mod analysis;
pub mod model;
#[cfg(feature = "snapshot")]
pub mod snapshot;
pub mod state;

pub use analysis::analyze_finance_model;
pub use model::{compute_finance_model, FinanceKpis, FinanceModelResult, YearRow};
pub use state::{clamp_down_payment, FinanceModelInput, FinanceState};
