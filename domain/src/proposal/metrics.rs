//! Derived proposal metrics.

use crate::core::amount::Amount;
use crate::core::percentage::Percentage;
use crate::proposal::data::{GroupName, VetoTiers};
use crate::proposal::value_objects::ProposalStatus;
use serde::Serialize;

/// Outcome of a metrics calculation. Never stored on the proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMetrics {
    pub quorum_met: bool,
    pub approval_met: bool,
    pub participation_rate: Percentage,
    pub approval_rate: Percentage,
    pub detail: MetricsDetail,
}

/// Strategy-specific figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MetricsDetail {
    #[serde(rename_all = "camelCase")]
    Standard {
        #[serde(with = "crate::core::amount::serde_decimal")]
        participation_votes: Amount,
    },
    Approval(ApprovalMetrics),
    Optimistic(OptimisticMetrics),
    Hybrid(HybridMetrics),
    HybridOptimisticTiered(TieredMetrics),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalMetrics {
    pub top_options: Vec<String>,
    pub options_meeting_criteria: Vec<String>,
    pub budget_utilization: BudgetUtilization,
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub total_option_votes: Amount,
}

/// Budget consumed by the winning options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum BudgetUtilization {
    /// No budget amount was set.
    NoBudget,
    Computed(Percentage),
    /// Proposal predates the budget change; no formula exists for it.
    LegacyUnavailable,
}

impl BudgetUtilization {
    pub fn percentage(&self) -> Option<Percentage> {
        match self {
            BudgetUtilization::Computed(p) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimisticMetrics {
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub veto_threshold: Amount,
    pub veto_progress: Percentage,
    pub is_vetoed: bool,
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub status_veto_threshold: Amount,
    pub is_vetoed_for_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetrics {
    pub group: GroupName,
    pub participation_rate: Percentage,
    pub approval_rate: Percentage,
    pub meets_minimum: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridMetrics {
    pub groups: Vec<GroupMetrics>,
    pub weighted_approval_rate: Percentage,
}

impl HybridMetrics {
    pub fn group(&self, name: GroupName) -> Option<&GroupMetrics> {
        self.groups.iter().find(|g| g.group == name)
    }

    pub fn qualifying_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.meets_minimum).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTally {
    pub group: GroupName,
    pub veto_percentage: Percentage,
    #[serde(with = "crate::core::amount::serde_decimal")]
    pub against_votes: Amount,
}

/// Tier check that decided a veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VetoBranch {
    FourGroups,
    ThreeGroups,
    TwoGroups,
}

impl VetoBranch {
    /// Order in which tiers are checked.
    pub const CHECK_ORDER: [VetoBranch; 3] = [
        VetoBranch::FourGroups,
        VetoBranch::ThreeGroups,
        VetoBranch::TwoGroups,
    ];

    pub fn required_groups(&self) -> usize {
        match self {
            VetoBranch::FourGroups => 4,
            VetoBranch::ThreeGroups => 3,
            VetoBranch::TwoGroups => 2,
        }
    }

    pub fn threshold(&self, tiers: &VetoTiers) -> u64 {
        match self {
            VetoBranch::FourGroups => tiers.four_groups,
            VetoBranch::ThreeGroups => tiers.three_groups,
            VetoBranch::TwoGroups => tiers.two_groups,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStatus {
    pub branch: VetoBranch,
    pub threshold: Percentage,
    pub required_groups: usize,
    pub groups_at_threshold: usize,
    pub is_triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredMetrics {
    pub hybrid: HybridMetrics,
    pub group_tallies: Vec<GroupTally>,
    pub veto_triggered: bool,
    /// Branch that fired, `None` when no tier was reached.
    pub veto_branch: Option<VetoBranch>,
    pub thresholds: VetoTiers,
    /// Tiers in check order.
    pub tiers: Vec<TierStatus>,
}

impl TieredMetrics {
    /// Tier shown to voters: the one that fired, otherwise the one needing
    /// the fewest additional groups (earliest in check order on ties).
    pub fn active_tier(&self) -> Option<&TierStatus> {
        if let Some(fired) = self.tiers.iter().find(|t| t.is_triggered) {
            return Some(fired);
        }
        self.tiers.iter().min_by_key(|t| {
            t.required_groups.saturating_sub(t.groups_at_threshold)
        })
    }

    pub fn highest_veto_percentage(&self) -> Percentage {
        self.group_tallies
            .iter()
            .map(|t| t.veto_percentage)
            .max()
            .unwrap_or_default()
    }

    /// One-line summary pairing the largest against share with the active bar.
    pub fn status_text(&self, status: ProposalStatus) -> String {
        let verdict = match (self.veto_triggered, status.is_final()) {
            (true, false) => "Override threshold reached",
            (true, true) => "Proposal vetoed",
            (false, false) => "Below threshold",
            (false, true) => "Proposal approved",
        };
        match self.active_tier() {
            Some(tier) => format!(
                "{} against / {} with {} groups - {}",
                self.highest_veto_percentage(),
                tier.threshold,
                tier.required_groups,
                verdict
            ),
            None => verdict.to_string(),
        }
    }
}
