use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenderCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TenderCalcError {
    fn from(e: serde_json::Error) -> Self {
        TenderCalcError::SerializationError(e.to_string())
    }
}
