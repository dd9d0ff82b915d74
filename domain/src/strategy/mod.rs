//! Proposal evaluation strategies.
//!
//! The set of algorithms is closed, so dispatch is an exhaustive `match` over
//! [`ProposalStrategy`] rather than trait objects. Adding a variant forces
//! every operation below to handle it.
//!
//! | Strategy | Data shape | Ended status |
//! |----------|------------|--------------|
//! | `Standard` | transaction arrays | quorum and strict majority |
//! | `Approval` | options + settings | quorum and at least one winner |
//! | `Optimistic` | transaction arrays | not vetoed at 50% of supply |
//! | `Hybrid` | on/off-chain + groups | 3 of 4 groups and 30% weighted approval |
//! | `HybridOptimisticTiered` | on/off-chain + groups | no veto tier reached |

pub mod approval;
pub mod base;
pub mod hybrid;
pub mod optimistic;
pub mod standard;
pub mod tiered;

pub use base::{TimelineState, timeline_state};
pub use hybrid::HybridStrategy;

use crate::core::amount::Amount;
use crate::core::error::ProposalError;
use crate::proposal::{
    BaseType, Proposal, ProposalData, ProposalMetrics, ProposalResults, ProposalStatus,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStrategy {
    Standard,
    Approval,
    Optimistic,
    Hybrid(HybridStrategy),
    HybridOptimisticTiered(HybridStrategy),
}

impl ProposalStrategy {
    /// Plain strategy for an algorithm family.
    pub fn for_base(base: BaseType) -> Self {
        match base {
            BaseType::Standard => ProposalStrategy::Standard,
            BaseType::Approval => ProposalStrategy::Approval,
            BaseType::Optimistic => ProposalStrategy::Optimistic,
        }
    }

    pub fn hybrid(base: BaseType) -> Self {
        ProposalStrategy::Hybrid(HybridStrategy::new(base))
    }

    pub fn hybrid_optimistic_tiered() -> Self {
        ProposalStrategy::HybridOptimisticTiered(HybridStrategy::new(BaseType::Optimistic))
    }

    /// Family name used in data errors.
    pub fn label(&self) -> &'static str {
        match self {
            ProposalStrategy::Standard => "STANDARD",
            ProposalStrategy::Approval => "APPROVAL",
            ProposalStrategy::Optimistic => "OPTIMISTIC",
            ProposalStrategy::Hybrid(h) | ProposalStrategy::HybridOptimisticTiered(h) => h.label(),
        }
    }

    pub fn parse_data(&self, raw: &Value) -> Result<ProposalData, ProposalError> {
        match self {
            ProposalStrategy::Standard | ProposalStrategy::Optimistic => {
                standard::parse_transaction_set(raw, self.label()).map(ProposalData::Standard)
            }
            ProposalStrategy::Approval => approval::parse_data(raw).map(ProposalData::Approval),
            ProposalStrategy::Hybrid(h) | ProposalStrategy::HybridOptimisticTiered(h) => {
                h.parse_data(raw).map(ProposalData::Hybrid)
            }
        }
    }

    /// Parse raw tallies. `data` is the raw proposal data, consulted for
    /// hybrid group tallies.
    pub fn parse_results(
        &self,
        raw: &Value,
        data: Option<&Value>,
    ) -> Result<ProposalResults, ProposalError> {
        match self {
            ProposalStrategy::Standard | ProposalStrategy::Approval | ProposalStrategy::Optimistic => {
                base::parse_results(raw, data, self.label())
            }
            ProposalStrategy::Hybrid(h) | ProposalStrategy::HybridOptimisticTiered(h) => {
                h.parse_results(raw, data)
            }
        }
    }

    pub fn validate_data(&self, data: &ProposalData) -> bool {
        match self {
            ProposalStrategy::Standard | ProposalStrategy::Optimistic => standard::validate(data),
            ProposalStrategy::Approval => approval::validate(data),
            ProposalStrategy::Hybrid(h) | ProposalStrategy::HybridOptimisticTiered(h) => {
                h.validate(data)
            }
        }
    }

    pub fn calculate_metrics(&self, proposal: &Proposal) -> Result<ProposalMetrics, ProposalError> {
        match self {
            ProposalStrategy::Standard => standard::calculate_metrics(proposal),
            ProposalStrategy::Approval => approval::calculate_metrics(proposal),
            ProposalStrategy::Optimistic => optimistic::calculate_metrics(proposal),
            ProposalStrategy::Hybrid(h) => hybrid::calculate_metrics(proposal, h),
            ProposalStrategy::HybridOptimisticTiered(h) => tiered::calculate_metrics(proposal, h),
        }
    }

    /// Status at `current_block`. Metrics are only computed once voting has
    /// ended and no lifecycle marker is set.
    pub fn determine_status(
        &self,
        proposal: &Proposal,
        current_block: Amount,
    ) -> Result<ProposalStatus, ProposalError> {
        match timeline_state(proposal, current_block) {
            TimelineState::Settled(status) => Ok(status),
            TimelineState::Ended => {
                let metrics = self.calculate_metrics(proposal)?;
                Ok(self.ended_status(&metrics))
            }
        }
    }

    pub fn ended_status(&self, metrics: &ProposalMetrics) -> ProposalStatus {
        match self {
            ProposalStrategy::Standard => standard::ended_status(metrics),
            ProposalStrategy::Approval => approval::ended_status(metrics),
            ProposalStrategy::Optimistic => optimistic::ended_status(metrics),
            ProposalStrategy::Hybrid(_) => hybrid::ended_status(metrics),
            ProposalStrategy::HybridOptimisticTiered(_) => tiered::ended_status(metrics),
        }
    }

    pub fn type_description(&self) -> String {
        match self {
            ProposalStrategy::Standard => {
                "Standard on-chain proposal with simple FOR/AGAINST/ABSTAIN voting".to_string()
            }
            ProposalStrategy::Approval => {
                "Approval voting proposal for selecting multiple options with budget allocation"
                    .to_string()
            }
            ProposalStrategy::Optimistic => {
                "Optimistic proposal that passes unless vetoed by sufficient against votes"
                    .to_string()
            }
            ProposalStrategy::Hybrid(h) => h.type_description(),
            ProposalStrategy::HybridOptimisticTiered(_) => {
                "Hybrid optimistic proposal with tiered veto thresholds across stakeholder groups"
                    .to_string()
            }
        }
    }
}
