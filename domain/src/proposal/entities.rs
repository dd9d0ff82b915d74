//! Proposal aggregate.

use crate::core::amount::Amount;
use crate::core::error::ProposalError;
use crate::proposal::context::ProposalContext;
use crate::proposal::data::ProposalData;
use crate::proposal::id::ProposalId;
use crate::proposal::metrics::ProposalMetrics;
use crate::proposal::value_objects::{ProposalResults, ProposalStatus, ProposalTimeline, ProposalType};
use crate::strategy::ProposalStrategy;

/// A governance proposal with its tallies and the strategy that evaluates it.
///
/// Every field is fixed after construction. Status and metrics are derived on
/// each call from the current results, the timeline and the caller's block.
/// A tally refresh produces a new `Proposal` via [`Proposal::refreshed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    id: ProposalId,
    proposal_type: ProposalType,
    strategy: ProposalStrategy,
    proposal_number: Option<String>,
    title: String,
    description: String,
    proposer: String,
    data: ProposalData,
    results: ProposalResults,
    timeline: ProposalTimeline,
    quorum_votes: Amount,
    approval_threshold: Amount,
    votable_supply: Amount,
    context: ProposalContext,
}

impl Proposal {
    /// Create a proposal with empty tallies and zero thresholds.
    pub fn new(
        id: ProposalId,
        proposal_type: ProposalType,
        strategy: ProposalStrategy,
        data: ProposalData,
        timeline: ProposalTimeline,
    ) -> Result<Self, ProposalError> {
        timeline.validate()?;
        Ok(Self {
            id,
            proposal_type,
            strategy,
            proposal_number: None,
            title: String::new(),
            description: String::new(),
            proposer: String::new(),
            data,
            results: ProposalResults::empty(),
            timeline,
            quorum_votes: Amount::zero(),
            approval_threshold: Amount::zero(),
            votable_supply: Amount::zero(),
            context: ProposalContext::default(),
        })
    }

    // ==================== Builder ====================

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_proposer(mut self, proposer: impl Into<String>) -> Self {
        self.proposer = proposer.into();
        self
    }

    pub fn with_proposal_number(mut self, number: Option<String>) -> Self {
        self.proposal_number = number;
        self
    }

    pub fn with_results(mut self, results: ProposalResults) -> Self {
        self.results = results;
        self
    }

    pub fn with_quorum_votes(mut self, quorum_votes: Amount) -> Self {
        self.quorum_votes = quorum_votes;
        self
    }

    pub fn with_approval_threshold(mut self, approval_threshold: Amount) -> Self {
        self.approval_threshold = approval_threshold;
        self
    }

    pub fn with_votable_supply(mut self, votable_supply: Amount) -> Self {
        self.votable_supply = votable_supply;
        self
    }

    pub fn with_context(mut self, context: ProposalContext) -> Self {
        self.context = context;
        self
    }

    /// Copy of this proposal carrying new tallies.
    pub fn refreshed(&self, results: ProposalResults) -> Self {
        self.clone().with_results(results)
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &ProposalId {
        &self.id
    }

    pub fn proposal_type(&self) -> ProposalType {
        self.proposal_type
    }

    pub fn strategy(&self) -> ProposalStrategy {
        self.strategy
    }

    pub fn proposal_number(&self) -> Option<&str> {
        self.proposal_number.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn proposer(&self) -> &str {
        &self.proposer
    }

    pub fn data(&self) -> &ProposalData {
        &self.data
    }

    pub fn results(&self) -> &ProposalResults {
        &self.results
    }

    pub fn timeline(&self) -> &ProposalTimeline {
        &self.timeline
    }

    pub fn quorum_votes(&self) -> Amount {
        self.quorum_votes
    }

    pub fn approval_threshold(&self) -> Amount {
        self.approval_threshold
    }

    pub fn votable_supply(&self) -> Amount {
        self.votable_supply
    }

    pub fn context(&self) -> &ProposalContext {
        &self.context
    }

    // ==================== Lifecycle ====================

    pub fn is_cancelled(&self) -> bool {
        self.timeline.cancelled_block.is_some()
    }

    pub fn is_executed(&self) -> bool {
        self.timeline.executed_block.is_some()
    }

    pub fn is_queued(&self) -> bool {
        self.timeline.queued_block.is_some()
    }

    pub fn is_active(&self, current_block: Amount) -> bool {
        self.timeline.is_active_at(current_block)
    }

    pub fn has_ended(&self, current_block: Amount) -> bool {
        self.timeline.has_ended_at(current_block)
    }

    pub fn metrics(&self) -> Result<ProposalMetrics, ProposalError> {
        self.strategy.calculate_metrics(self)
    }

    pub fn status(&self, current_block: Amount) -> Result<ProposalStatus, ProposalError> {
        self.strategy.determine_status(self, current_block)
    }
}
