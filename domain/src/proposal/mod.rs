//! Proposal aggregate and its value objects.

pub mod context;
pub mod data;
pub mod entities;
pub mod id;
pub mod metrics;
pub mod value_objects;

pub use context::{ParticipationRule, ProposalContext};
pub use data::{
    ApprovalCriteria, ApprovalData, ApprovalOption, GroupName, HybridData, ProposalData,
    Transaction, TransactionKind, TransactionSet, VetoTiers, VotingGroup, VotingGroups,
};
pub use entities::Proposal;
pub use id::ProposalId;
pub use metrics::{
    ApprovalMetrics, BudgetUtilization, GroupMetrics, GroupTally, HybridMetrics, MetricsDetail,
    OptimisticMetrics, ProposalMetrics, TierStatus, TieredMetrics, VetoBranch,
};
pub use value_objects::{BaseType, ProposalResults, ProposalStatus, ProposalTimeline, ProposalType};
