//! Standard FOR/AGAINST/ABSTAIN voting.

use super::base::{calculation_error, parse_amount_array, parse_string_array, participation_votes};
use crate::core::amount::checked_sum;
use crate::core::error::ProposalError;
use crate::core::percentage::safe_percentage;
use crate::proposal::{
    MetricsDetail, Proposal, ProposalData, ProposalMetrics, ProposalStatus, TransactionSet,
};
use serde_json::Value;

/// Parse the four parallel transaction arrays. `label` names the proposal
/// family in errors, since optimistic proposals share this shape.
pub fn parse_transaction_set(raw: &Value, label: &str) -> Result<TransactionSet, ProposalError> {
    let set = TransactionSet {
        targets: parse_string_array(raw.get("targets"), "targets", label)?,
        values: parse_amount_array(raw.get("values"), "values", label)?,
        signatures: parse_string_array(raw.get("signatures"), "signatures", label)?,
        calldatas: parse_string_array(raw.get("calldatas"), "calldatas", label)?,
    };

    if set.is_empty() {
        return Ok(TransactionSet::default());
    }
    if !set.is_aligned() {
        return Err(ProposalError::invalid_data(
            label,
            "Transaction array lengths do not match",
        ));
    }
    Ok(set)
}

pub fn validate(data: &ProposalData) -> bool {
    matches!(data, ProposalData::Standard(set) if set.is_aligned())
}

pub fn calculate_metrics(proposal: &Proposal) -> Result<ProposalMetrics, ProposalError> {
    let wrap = calculation_error(proposal, "metrics");
    let results = proposal.results();

    let participation = participation_votes(proposal).map_err(&wrap)?;
    let quorum_met = participation >= proposal.quorum_votes();

    let opinion_votes =
        checked_sum([results.for_votes, results.against_votes], "opinion votes").map_err(&wrap)?;
    let approval_rate = safe_percentage(results.for_votes, opinion_votes).map_err(&wrap)?;
    let approval_met = results.for_votes > results.against_votes;

    let participation_rate =
        safe_percentage(participation, proposal.votable_supply()).map_err(&wrap)?;

    Ok(ProposalMetrics {
        quorum_met,
        approval_met,
        participation_rate,
        approval_rate,
        detail: MetricsDetail::Standard {
            participation_votes: participation,
        },
    })
}

/// Quorum first, then strict majority.
pub fn ended_status(metrics: &ProposalMetrics) -> ProposalStatus {
    if !metrics.quorum_met {
        return ProposalStatus::Defeated;
    }
    if metrics.approval_met {
        ProposalStatus::Succeeded
    } else {
        ProposalStatus::Defeated
    }
}
