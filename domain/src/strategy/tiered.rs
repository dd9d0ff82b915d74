//! Hybrid optimistic voting with tiered veto thresholds.
//!
//! A veto needs a number of groups whose against share reaches a tier. The
//! tiers are checked in a fixed order (all four groups, then three, then
//! two) and the first one reached decides.

use super::base::calculation_error;
use super::hybrid::{Eligible, HybridStrategy, delegate_quorum, hybrid_data};
use crate::core::amount::checked_sum;
use crate::core::error::{ArithmeticError, ProposalError};
use crate::core::percentage::Percentage;
use crate::proposal::{
    GroupMetrics, GroupTally, HybridMetrics, MetricsDetail, Proposal, ProposalMetrics,
    ProposalStatus, ProposalType, TierStatus, TieredMetrics, VetoBranch, VetoTiers, VotingGroups,
};

/// Tiers from the proposal data, else the default for the proposal type.
pub fn effective_tiers(proposal_type: ProposalType, configured: Option<VetoTiers>) -> VetoTiers {
    configured.unwrap_or(match proposal_type {
        ProposalType::HybridOptimisticTiered => VetoTiers::TIERED_DEFAULT,
        _ => VetoTiers::FLAT_DEFAULT,
    })
}

pub fn calculate_metrics(
    proposal: &Proposal,
    strategy: &HybridStrategy,
) -> Result<ProposalMetrics, ProposalError> {
    let data = hybrid_data(proposal, strategy.label())?;
    let tiers = effective_tiers(proposal.proposal_type(), data.tiers);
    tiered_metrics(proposal, &data.voting_groups, tiers)
        .map_err(calculation_error(proposal, "hybrid optimistic tiered metrics"))
}

fn tiered_metrics(
    proposal: &Proposal,
    groups: &VotingGroups,
    tiers: VetoTiers,
) -> Result<ProposalMetrics, ArithmeticError> {
    let dq = delegate_quorum(proposal);

    let group_tallies = groups
        .iter()
        .map(|(name, group)| {
            Ok(GroupTally {
                group: name,
                veto_percentage: Eligible::for_group(name, dq)?.share(group.against_votes)?,
                against_votes: group.against_votes,
            })
        })
        .collect::<Result<Vec<_>, ArithmeticError>>()?;

    let tier_statuses: Vec<TierStatus> = VetoBranch::CHECK_ORDER
        .iter()
        .map(|branch| {
            let threshold = Percentage::from_whole(branch.threshold(&tiers));
            let groups_at_threshold = group_tallies
                .iter()
                .filter(|t| t.veto_percentage >= threshold)
                .count();
            TierStatus {
                branch: *branch,
                threshold,
                required_groups: branch.required_groups(),
                groups_at_threshold,
                is_triggered: groups_at_threshold >= branch.required_groups(),
            }
        })
        .collect();

    let veto_branch = tier_statuses
        .iter()
        .find(|t| t.is_triggered)
        .map(|t| t.branch);
    let veto_triggered = veto_branch.is_some();

    let total_against = checked_sum(group_tallies.iter().map(|t| t.against_votes), "against votes")?;
    let participation_rate = Eligible::total(dq)?.share(total_against)?;

    let outcome_rate = if veto_triggered {
        Percentage::ZERO
    } else {
        Percentage::HUNDRED
    };

    let hybrid = HybridMetrics {
        groups: group_tallies
            .iter()
            .map(|t| GroupMetrics {
                group: t.group,
                participation_rate: t.veto_percentage,
                approval_rate: t.veto_percentage.complement(),
                meets_minimum: true,
            })
            .collect(),
        weighted_approval_rate: outcome_rate,
    };

    Ok(ProposalMetrics {
        quorum_met: true,
        approval_met: !veto_triggered,
        participation_rate,
        approval_rate: outcome_rate,
        detail: MetricsDetail::HybridOptimisticTiered(TieredMetrics {
            hybrid,
            group_tallies,
            veto_triggered,
            veto_branch,
            thresholds: tiers,
            tiers: tier_statuses,
        }),
    })
}

pub fn ended_status(metrics: &ProposalMetrics) -> ProposalStatus {
    if metrics.approval_met {
        ProposalStatus::Succeeded
    } else {
        ProposalStatus::Defeated
    }
}
