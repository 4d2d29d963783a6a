use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DealCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DealCalcError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DealCalcError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DealCalcError {
    fn from(e: serde_json::Error) -> Self {
        DealCalcError::SerializationError(e.to_string())
    }
}
