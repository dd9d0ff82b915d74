//! Error types for the record adapter

use proposal_domain::{AmountError, ArithmeticError, ProposalError};
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while turning stored records into proposals
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Failed to read proposal records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed proposal records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record {id} is missing {field}")]
    MissingField { id: String, field: &'static str },

    #[error("Invalid numeric column: {0}")]
    Amount(#[from] AmountError),

    #[error("Failed to derive default quorum: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error(transparent)]
    Proposal(#[from] ProposalError),
}

impl AdapterError {
    /// Stable code, shared with [`ProposalError::code`] for domain failures.
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::Proposal(e) => e.code(),
            AdapterError::Io(_) | AdapterError::Json(_) => "RECORD_READ_ERROR",
            AdapterError::MissingField { .. }
            | AdapterError::Amount(_)
            | AdapterError::Arithmetic(_) => "INVALID_RECORD",
        }
    }
}

/// Records rejected before reaching the factory are reported alongside
/// domain failures; non-domain errors become validation failures.
impl From<AdapterError> for ProposalError {
    fn from(error: AdapterError) -> Self {
        match error {
            AdapterError::Proposal(e) => e,
            other => ProposalError::Validation(other.to_string()),
        }
    }
}
