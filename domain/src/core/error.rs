//! Domain error types
//!
//! Every error carries a stable machine-readable code (see [`ProposalError::code`])
//! so callers at the boundary can branch on the kind without matching on
//! message text.

use thiserror::Error;

/// Failure inside vote/percentage arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("overflow in {0}")]
    Overflow(&'static str),

    #[error("{0} does not fit in the percentage range")]
    OutOfRange(&'static str),
}

/// Failure to coerce a raw value into an [`Amount`](crate::core::amount::Amount).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("{field}: negative values are not allowed ({value})")]
    Negative { field: String, value: String },

    #[error("{field}: '{value}' is not an unsigned integer")]
    Malformed { field: String, value: String },

    #[error("{field}: value does not fit in 256 bits")]
    TooLarge { field: String },

    #[error("{field}: {value} is above the maximum of {max}")]
    OutOfRange { field: String, value: String, max: u64 },
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Invalid proposal ID: {0}")]
    InvalidProposalId(String),

    #[error("Invalid {proposal_type} proposal data: {details}")]
    InvalidProposalData {
        proposal_type: String,
        details: String,
    },

    #[error("Unknown proposal type: {0}")]
    UnknownProposalType(String),

    #[error("Failed to calculate {calculation} for proposal {id}: {cause}")]
    Calculation {
        id: String,
        calculation: &'static str,
        #[source]
        cause: ArithmeticError,
    },

    #[error("Proposal not found: {0}")]
    NotFound(String),

    #[error("Proposal validation failed: {0}")]
    Validation(String),
}

impl ProposalError {
    /// Shorthand for [`ProposalError::InvalidProposalData`].
    pub fn invalid_data(proposal_type: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidProposalData {
            proposal_type: proposal_type.into(),
            details: details.into(),
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ProposalError::InvalidProposalId(_) => "INVALID_PROPOSAL_ID",
            ProposalError::InvalidProposalData { .. } => "INVALID_PROPOSAL_DATA",
            ProposalError::UnknownProposalType(_) => "UNKNOWN_PROPOSAL_TYPE",
            ProposalError::Calculation { .. } => "PROPOSAL_CALCULATION_ERROR",
            ProposalError::NotFound(_) => "PROPOSAL_NOT_FOUND",
            ProposalError::Validation(_) => "PROPOSAL_VALIDATION_ERROR",
        }
    }

    /// Parsing and validation errors point at malformed upstream data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ProposalError::InvalidProposalId(_)
                | ProposalError::InvalidProposalData { .. }
                | ProposalError::UnknownProposalType(_)
                | ProposalError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            ProposalError::InvalidProposalId("x".into()).code(),
            "INVALID_PROPOSAL_ID"
        );
        assert_eq!(
            ProposalError::invalid_data("STANDARD", "bad").code(),
            "INVALID_PROPOSAL_DATA"
        );
        assert_eq!(
            ProposalError::UnknownProposalType("FOO".into()).code(),
            "UNKNOWN_PROPOSAL_TYPE"
        );
        assert_eq!(
            ProposalError::NotFound("1".into()).code(),
            "PROPOSAL_NOT_FOUND"
        );
        assert_eq!(
            ProposalError::Validation("x".into()).code(),
            "PROPOSAL_VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_calculation_error_display() {
        let error = ProposalError::Calculation {
            id: "42".to_string(),
            calculation: "metrics",
            cause: ArithmeticError::Overflow("vote total"),
        };
        assert_eq!(error.code(), "PROPOSAL_CALCULATION_ERROR");
        assert_eq!(
            error.to_string(),
            "Failed to calculate metrics for proposal 42: overflow in vote total"
        );
        assert!(!error.is_input_error());
    }

    #[test]
    fn test_invalid_data_display() {
        let error = ProposalError::invalid_data("APPROVAL", "Option at index 0 missing title");
        assert_eq!(
            error.to_string(),
            "Invalid APPROVAL proposal data: Option at index 0 missing title"
        );
        assert!(error.is_input_error());
    }
}
