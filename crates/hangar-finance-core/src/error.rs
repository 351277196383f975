use thiserror::Error;

#[derive(Debug, Error)]
pub enum HangarFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No tariff table for building type {building_type} at width {width} m")]
    PricingUnavailable { building_type: String, width: String },

    #[error("Invalid tariff grid: {0}")]
    InvalidTariffGrid(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl HangarFinanceError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        HangarFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HangarFinanceError {
    fn from(e: serde_json::Error) -> Self {
        HangarFinanceError::SerializationError(e.to_string())
    }
}
