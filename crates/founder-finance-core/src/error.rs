use thiserror::Error;

#[derive(Debug, Error)]
pub enum FounderFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Advisor failure: {0}")]
    Advisor(String),
}

impl From<serde_json::Error> for FounderFinanceError {
    fn from(e: serde_json::Error) -> Self {
        FounderFinanceError::SerializationError(e.to_string())
    }
}
