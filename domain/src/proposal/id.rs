//! Proposal identifier value object.

use crate::core::error::ProposalError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DECIMAL_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static HEX_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").unwrap());

/// Validated proposal identifier.
///
/// Either a decimal number (on-chain governor ids) or a `0x`-prefixed hex
/// string (attestation/off-chain ids).
///
/// ```
/// use proposal_domain::ProposalId;
///
/// assert!(ProposalId::new("1234").is_ok());
/// assert!(ProposalId::new("0xdeadBEEF").is_ok());
/// assert!(ProposalId::new("proposal-7").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalId(String);

impl ProposalId {
    pub fn new(id: impl Into<String>) -> Result<Self, ProposalError> {
        let id = id.into();
        if DECIMAL_ID.is_match(&id) || HEX_ID.is_match(&id) {
            Ok(Self(id))
        } else {
            Err(ProposalError::InvalidProposalId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProposalId {
    type Error = ProposalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProposalId> for String {
    fn from(id: ProposalId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_ids() {
        assert!(ProposalId::new("0").is_ok());
        assert!(ProposalId::new(
            "103606400798595803012644966342403441743733355496979747669804254618774477345292"
        )
        .is_ok());
    }

    #[test]
    fn test_hex_ids() {
        assert!(ProposalId::new("0xABCdef0123").is_ok());
        assert!(ProposalId::new("0x").is_err());
        assert!(ProposalId::new("0xZZ").is_err());
    }

    #[test]
    fn test_invalid_ids() {
        for bad in ["", " 12", "12 ", "-1", "1.5", "abc"] {
            let err = ProposalId::new(bad).unwrap_err();
            assert_eq!(err, ProposalError::InvalidProposalId(bad.to_string()));
        }
    }

    #[test]
    fn test_equality_by_value() {
        assert_eq!(ProposalId::new("42").unwrap(), ProposalId::new("42").unwrap());
        assert_ne!(ProposalId::new("42").unwrap(), ProposalId::new("0x42").unwrap());
    }

    #[test]
    fn test_serde_validates() {
        let id: ProposalId = serde_json::from_str("\"77\"").unwrap();
        assert_eq!(id.as_str(), "77");
        assert!(serde_json::from_str::<ProposalId>("\"x77\"").is_err());
    }
}
