//! Optimistic proposals: pass unless enough against votes veto them.
//!
//! Two bars are tracked over against votes. The display bar
//! (`disapproval_threshold`, 12% of votable supply by default) feeds
//! `is_vetoed` and `veto_progress`. Only the status bar (50% of supply)
//! decides the outcome.

use super::base::calculation_error;
use crate::core::error::ProposalError;
use crate::core::percentage::{Percentage, safe_percentage};
use crate::proposal::{MetricsDetail, OptimisticMetrics, Proposal, ProposalMetrics, ProposalStatus};

pub const DEFAULT_DISAPPROVAL_THRESHOLD: Percentage = Percentage::from_whole(12);
pub const STATUS_DISAPPROVAL_THRESHOLD: Percentage = Percentage::from_whole(50);

pub fn calculate_metrics(proposal: &Proposal) -> Result<ProposalMetrics, ProposalError> {
    let wrap = calculation_error(proposal, "optimistic metrics");
    let supply = proposal.votable_supply();
    let against = proposal.results().against_votes;

    let display_bar = proposal
        .context()
        .disapproval_threshold
        .filter(|t| *t != Percentage::ZERO)
        .unwrap_or(DEFAULT_DISAPPROVAL_THRESHOLD);
    let veto_threshold = display_bar.of(supply).map_err(&wrap)?;
    let status_veto_threshold = STATUS_DISAPPROVAL_THRESHOLD.of(supply).map_err(&wrap)?;

    let is_vetoed = against >= veto_threshold;
    let is_vetoed_for_status = against >= status_veto_threshold;

    Ok(ProposalMetrics {
        quorum_met: true,
        approval_met: !is_vetoed_for_status,
        participation_rate: safe_percentage(against, supply).map_err(&wrap)?,
        approval_rate: if is_vetoed_for_status {
            Percentage::ZERO
        } else {
            Percentage::HUNDRED
        },
        detail: MetricsDetail::Optimistic(OptimisticMetrics {
            veto_threshold,
            veto_progress: safe_percentage(against, veto_threshold).map_err(&wrap)?,
            is_vetoed,
            status_veto_threshold,
            is_vetoed_for_status,
        }),
    })
}

pub fn ended_status(metrics: &ProposalMetrics) -> ProposalStatus {
    match &metrics.detail {
        MetricsDetail::Optimistic(o) if o.is_vetoed_for_status => ProposalStatus::Defeated,
        MetricsDetail::Optimistic(_) => ProposalStatus::Succeeded,
        _ if metrics.approval_met => ProposalStatus::Succeeded,
        _ => ProposalStatus::Defeated,
    }
}
