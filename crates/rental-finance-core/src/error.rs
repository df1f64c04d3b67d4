use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentalFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RentalFinanceError {
    fn from(e: serde_json::Error) -> Self {
        RentalFinanceError::SerializationError(e.to_string())
    }
}

impl RentalFinanceError {
    /// Shorthand for the most common validation failure.
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RentalFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A figure too large to represent as a `Decimal`.
    pub(crate) fn overflow(field: impl Into<String>) -> Self {
        Self::invalid(field, "Amount is too large to compute")
    }
}
