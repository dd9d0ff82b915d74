//! Proposal construction from inbound payloads.
//!
//! [`ProposalFactory`] is the single entry point turning a loosely-typed
//! [`ProposalPayload`] into a validated [`Proposal`]: registry lookup, data
//! parsing, validation, numeric coercion, then results parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::amount::{Amount, NumericInput};
use crate::core::error::{AmountError, ProposalError};
use crate::core::percentage::Percentage;
use crate::proposal::{
    Proposal, ProposalContext, ProposalId, ProposalResults, ProposalTimeline, ProposalType,
};
use crate::registry::ProposalTypeRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePayload {
    pub created_block: NumericInput,
    pub start_block: NumericInput,
    pub end_block: NumericInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_block: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_block: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_block: Option<NumericInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPayload {
    pub tenant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_options: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate_quorum: Option<NumericInput>,
    /// Whole percent of votable supply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disapproval_threshold: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_change_date: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v6_upgrade_block: Option<NumericInput>,
}

/// Proposal as delivered by the record adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_number: Option<String>,
    #[serde(rename = "type")]
    pub proposal_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub proposer: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    pub timeline: TimelinePayload,
    pub quorum_votes: NumericInput,
    pub approval_threshold: NumericInput,
    pub votable_supply: NumericInput,
    #[serde(default)]
    pub context: ContextPayload,
}

/// Builds proposals using the strategies of a registry.
#[derive(Debug, Clone, Copy)]
pub struct ProposalFactory<'r> {
    registry: &'r ProposalTypeRegistry,
}

impl ProposalFactory<'static> {
    /// Factory over the process-wide registry.
    pub fn shared() -> Self {
        Self::new(ProposalTypeRegistry::shared())
    }
}

impl<'r> ProposalFactory<'r> {
    pub fn new(registry: &'r ProposalTypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r ProposalTypeRegistry {
        self.registry
    }

    /// Build a proposal from a payload.
    ///
    /// Typed domain errors propagate unchanged. Numeric coercion failures are
    /// reported as invalid data for the payload's type.
    pub fn create_proposal(&self, payload: &ProposalPayload) -> Result<Proposal, ProposalError> {
        let proposal_type: ProposalType = payload.proposal_type.parse()?;
        let config = self.registry.get_config(proposal_type)?;
        let strategy = config.strategy;

        let data = strategy.parse_data(&payload.data)?;
        if !strategy.validate_data(&data) {
            return Err(ProposalError::invalid_data(
                proposal_type.as_str(),
                "Failed validation after parsing",
            ));
        }

        let wrap = |e: AmountError| {
            ProposalError::invalid_data(
                proposal_type.as_str(),
                format!("Failed to create proposal: {e}"),
            )
        };
        let timeline = coerce_timeline(&payload.timeline).map_err(wrap)?;
        let context = coerce_context(&payload.context).map_err(wrap)?;
        let quorum_votes = payload.quorum_votes.to_amount("quorumVotes").map_err(wrap)?;
        let approval_threshold = payload
            .approval_threshold
            .to_amount("approvalThreshold")
            .map_err(wrap)?;
        let votable_supply = payload.votable_supply.to_amount("votableSupply").map_err(wrap)?;

        let results = match &payload.results {
            Some(raw) if !raw.is_null() => strategy.parse_results(raw, Some(&payload.data))?,
            _ => ProposalResults::empty(),
        };

        let proposal = Proposal::new(
            ProposalId::new(payload.id.as_str())?,
            proposal_type,
            strategy,
            data,
            timeline,
        )?
        .with_proposal_number(payload.proposal_number.clone())
        .with_title(payload.title.as_str())
        .with_description(payload.description.as_str())
        .with_proposer(payload.proposer.as_str())
        .with_results(results)
        .with_quorum_votes(quorum_votes)
        .with_approval_threshold(approval_threshold)
        .with_votable_supply(votable_supply)
        .with_context(context);

        debug!(
            id = %proposal.id(),
            proposal_type = %proposal_type,
            strategy = strategy.label(),
            "Created proposal"
        );
        Ok(proposal)
    }

    /// Build each payload independently. One failure does not affect the
    /// others.
    pub fn create_many<'p, I>(&self, payloads: I) -> Vec<Result<Proposal, ProposalError>>
    where
        I: IntoIterator<Item = &'p ProposalPayload>,
    {
        payloads
            .into_iter()
            .map(|payload| self.create_proposal(payload))
            .collect()
    }
}

/// Absent and empty-string inputs are unset. Zero is a real block.
fn optional_amount(input: &Option<NumericInput>, field: &str) -> Result<Option<Amount>, AmountError> {
    match input {
        None => Ok(None),
        Some(NumericInput::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => value.to_amount(field).map(Some),
    }
}

fn coerce_timeline(t: &TimelinePayload) -> Result<ProposalTimeline, AmountError> {
    Ok(ProposalTimeline {
        created_block: t.created_block.to_amount("createdBlock")?,
        start_block: t.start_block.to_amount("startBlock")?,
        end_block: t.end_block.to_amount("endBlock")?,
        queued_block: optional_amount(&t.queued_block, "queuedBlock")?,
        executed_block: optional_amount(&t.executed_block, "executedBlock")?,
        cancelled_block: optional_amount(&t.cancelled_block, "cancelledBlock")?,
    })
}

fn coerce_context(c: &ContextPayload) -> Result<ProposalContext, AmountError> {
    Ok(ProposalContext {
        tenant: c.tenant.clone(),
        calculation_options: c.calculation_options,
        delegate_quorum: optional_amount(&c.delegate_quorum, "delegateQuorum")?,
        disapproval_threshold: c
            .disapproval_threshold
            .map(|percent| {
                Percentage::checked_from_whole(percent).ok_or_else(|| AmountError::OutOfRange {
                    field: "disapprovalThreshold".to_string(),
                    value: percent.to_string(),
                    max: 100,
                })
            })
            .transpose()?,
        budget_change_date: optional_amount(&c.budget_change_date, "budgetChangeDate")?,
        v6_upgrade_block: optional_amount(&c.v6_upgrade_block, "v6UpgradeBlock")?,
    })
}
