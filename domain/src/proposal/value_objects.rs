//! Proposal value objects - immutable types describing a proposal.
//!
//! # Classification
//! - [`ProposalType`] - closed set of twelve proposal variants
//! - [`BaseType`] - the algorithm family a variant belongs to
//! - [`ProposalStatus`] - derived lifecycle status
//!
//! # Figures
//! - [`ProposalResults`] - aggregate for/against/abstain tallies
//! - [`ProposalTimeline`] - block positions of lifecycle events

use crate::core::amount::{Amount, checked_sum};
use crate::core::error::{ArithmeticError, ProposalError};
use serde::{Deserialize, Serialize};

/// Proposal variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalType {
    Standard,
    Approval,
    Optimistic,
    Snapshot,
    OffchainStandard,
    OffchainApproval,
    OffchainOptimistic,
    OffchainOptimisticTiered,
    HybridStandard,
    HybridApproval,
    HybridOptimistic,
    HybridOptimisticTiered,
}

impl ProposalType {
    pub const ALL: [ProposalType; 12] = [
        ProposalType::Standard,
        ProposalType::Approval,
        ProposalType::Optimistic,
        ProposalType::Snapshot,
        ProposalType::OffchainStandard,
        ProposalType::OffchainApproval,
        ProposalType::OffchainOptimistic,
        ProposalType::OffchainOptimisticTiered,
        ProposalType::HybridStandard,
        ProposalType::HybridApproval,
        ProposalType::HybridOptimistic,
        ProposalType::HybridOptimisticTiered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::Standard => "STANDARD",
            ProposalType::Approval => "APPROVAL",
            ProposalType::Optimistic => "OPTIMISTIC",
            ProposalType::Snapshot => "SNAPSHOT",
            ProposalType::OffchainStandard => "OFFCHAIN_STANDARD",
            ProposalType::OffchainApproval => "OFFCHAIN_APPROVAL",
            ProposalType::OffchainOptimistic => "OFFCHAIN_OPTIMISTIC",
            ProposalType::OffchainOptimisticTiered => "OFFCHAIN_OPTIMISTIC_TIERED",
            ProposalType::HybridStandard => "HYBRID_STANDARD",
            ProposalType::HybridApproval => "HYBRID_APPROVAL",
            ProposalType::HybridOptimistic => "HYBRID_OPTIMISTIC",
            ProposalType::HybridOptimisticTiered => "HYBRID_OPTIMISTIC_TIERED",
        }
    }

    /// Algorithm family of this variant.
    pub fn base_type(&self) -> BaseType {
        match self {
            ProposalType::Standard
            | ProposalType::Snapshot
            | ProposalType::OffchainStandard
            | ProposalType::HybridStandard => BaseType::Standard,
            ProposalType::Approval
            | ProposalType::OffchainApproval
            | ProposalType::HybridApproval => BaseType::Approval,
            ProposalType::Optimistic
            | ProposalType::OffchainOptimistic
            | ProposalType::OffchainOptimisticTiered
            | ProposalType::HybridOptimistic
            | ProposalType::HybridOptimisticTiered => BaseType::Optimistic,
        }
    }

    pub fn is_hybrid(&self) -> bool {
        matches!(
            self,
            ProposalType::HybridStandard
                | ProposalType::HybridApproval
                | ProposalType::HybridOptimistic
                | ProposalType::HybridOptimisticTiered
        )
    }

    pub fn is_offchain(&self) -> bool {
        matches!(
            self,
            ProposalType::Snapshot
                | ProposalType::OffchainStandard
                | ProposalType::OffchainApproval
                | ProposalType::OffchainOptimistic
                | ProposalType::OffchainOptimisticTiered
        )
    }

    /// The hybrid variant an on-chain type becomes when an off-chain twin
    /// is attached. Other types map to themselves.
    pub fn to_hybrid(self) -> Self {
        match self {
            ProposalType::Standard => ProposalType::HybridStandard,
            ProposalType::Approval => ProposalType::HybridApproval,
            ProposalType::Optimistic => ProposalType::HybridOptimistic,
            other => other,
        }
    }
}

impl std::fmt::Display for ProposalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProposalType {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProposalType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ProposalError::UnknownProposalType(s.to_string()))
    }
}

/// Algorithm family shared by on-chain, off-chain and hybrid variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseType {
    Standard,
    Approval,
    Optimistic,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Standard => "STANDARD",
            BaseType::Approval => "APPROVAL",
            BaseType::Optimistic => "OPTIMISTIC",
        }
    }

    pub fn hybrid_label(&self) -> &'static str {
        match self {
            BaseType::Standard => "HYBRID_STANDARD",
            BaseType::Approval => "HYBRID_APPROVAL",
            BaseType::Optimistic => "HYBRID_OPTIMISTIC",
        }
    }
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status, always derived and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Active,
    Cancelled,
    Queued,
    Executed,
    Succeeded,
    Defeated,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "PENDING",
            ProposalStatus::Active => "ACTIVE",
            ProposalStatus::Cancelled => "CANCELLED",
            ProposalStatus::Queued => "QUEUED",
            ProposalStatus::Executed => "EXECUTED",
            ProposalStatus::Succeeded => "SUCCEEDED",
            ProposalStatus::Defeated => "DEFEATED",
        }
    }

    /// Whether voting is over and the outcome can no longer change.
    pub fn is_final(&self) -> bool {
        !matches!(self, ProposalStatus::Pending | ProposalStatus::Active)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate vote tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResults {
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub for_votes: Amount,
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub against_votes: Amount,
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub abstain_votes: Amount,
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub total_votes: Amount,
}

impl ProposalResults {
    /// All-zero tallies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build tallies whose total is the sum of the three buckets.
    pub fn from_tallies(
        for_votes: Amount,
        against_votes: Amount,
        abstain_votes: Amount,
    ) -> Result<Self, ArithmeticError> {
        let total_votes = checked_sum([for_votes, against_votes, abstain_votes], "total votes")?;
        Ok(Self {
            for_votes,
            against_votes,
            abstain_votes,
            total_votes,
        })
    }
}

/// Block positions of lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalTimeline {
    pub created_block: Amount,
    pub start_block: Amount,
    pub end_block: Amount,
    pub queued_block: Option<Amount>,
    pub executed_block: Option<Amount>,
    pub cancelled_block: Option<Amount>,
}

impl ProposalTimeline {
    /// Timeline with only the voting window set.
    pub fn new(created_block: Amount, start_block: Amount, end_block: Amount) -> Result<Self, ProposalError> {
        let timeline = Self {
            created_block,
            start_block,
            end_block,
            queued_block: None,
            executed_block: None,
            cancelled_block: None,
        };
        timeline.validate()?;
        Ok(timeline)
    }

    pub fn with_queued(mut self, block: Amount) -> Self {
        self.queued_block = Some(block);
        self
    }

    pub fn with_executed(mut self, block: Amount) -> Self {
        self.executed_block = Some(block);
        self
    }

    pub fn with_cancelled(mut self, block: Amount) -> Self {
        self.cancelled_block = Some(block);
        self
    }

    /// `start_block <= end_block`.
    pub fn validate(&self) -> Result<(), ProposalError> {
        if self.start_block > self.end_block {
            return Err(ProposalError::Validation(format!(
                "start block {} is after end block {}",
                self.start_block, self.end_block
            )));
        }
        Ok(())
    }

    pub fn is_active_at(&self, block: Amount) -> bool {
        block >= self.start_block && block <= self.end_block
    }

    pub fn has_ended_at(&self, block: Amount) -> bool {
        block > self.end_block
    }
}
