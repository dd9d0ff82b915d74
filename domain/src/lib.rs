//! Domain layer for proposal-engine
//!
//! This crate evaluates DAO governance proposals: it turns loosely-typed
//! payloads into validated [`Proposal`] aggregates and derives their metrics
//! and lifecycle status. It has no I/O and no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Strategies
//!
//! Every [`ProposalType`] is evaluated by one [`ProposalStrategy`]:
//!
//! - **Standard**: quorum plus strict for/against majority
//! - **Approval**: multi-option voting with threshold or top-N selection
//! - **Optimistic**: passes unless against votes reach half the supply
//! - **Hybrid**: on-chain delegates plus three off-chain groups under fixed weights
//! - **Hybrid optimistic tiered**: group vetoes with tiered thresholds
//!
//! ## Construction
//!
//! [`ProposalTypeRegistry`] maps types to strategies and
//! [`ProposalFactory`] builds proposals from [`ProposalPayload`]s.
//!
//! ## Arithmetic
//!
//! Tallies are 256-bit [`Amount`]s and rates are fixed-point
//! [`Percentage`]s. Thresholds are never compared in floating point.

pub mod config;
pub mod core;
pub mod factory;
pub mod proposal;
pub mod registry;
pub mod strategy;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    amount::{Amount, NumericInput},
    error::{AmountError, ArithmeticError, ProposalError},
    percentage::{Percentage, safe_percentage},
};
pub use factory::{ContextPayload, ProposalFactory, ProposalPayload, TimelinePayload};
pub use proposal::{
    ApprovalCriteria, ApprovalData, ApprovalMetrics, ApprovalOption, BaseType, BudgetUtilization,
    GroupMetrics, GroupName, GroupTally, HybridData, HybridMetrics, MetricsDetail,
    OptimisticMetrics, ParticipationRule, Proposal, ProposalContext, ProposalData, ProposalId,
    ProposalMetrics, ProposalResults, ProposalStatus, ProposalTimeline, ProposalType,
    TierStatus, TieredMetrics, Transaction, TransactionKind, TransactionSet, VetoBranch,
    VetoTiers, VotingGroup, VotingGroups,
};
pub use registry::{FeatureFlags, ProposalTypeConfig, ProposalTypeRegistry};
pub use strategy::{HybridStrategy, ProposalStrategy};
