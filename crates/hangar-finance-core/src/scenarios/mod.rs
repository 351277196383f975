pub mod sensitivity;

pub use sensitivity::{
    run_finance_sensitivity, FinanceMetric, FinanceSensitivityInput, FinanceSensitivityOutput,
    SensitivityParameter, SensitivityVariable,
};
