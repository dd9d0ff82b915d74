//! Proposal type registry
//!
//! Maps every [`ProposalType`] to the strategy that evaluates it, plus the
//! display metadata the UI needs. Registries are plain values: build one with
//! [`ProposalTypeRegistry::with_defaults`] and hand it to the factory. A
//! process-wide instance is available through [`ProposalTypeRegistry::shared`],
//! built exactly once on first access.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::core::error::ProposalError;
use crate::proposal::{BaseType, ProposalType};
use crate::strategy::ProposalStrategy;

/// UI capabilities of a proposal type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub has_voting_reason: bool,
    pub has_approval_options: bool,
    pub has_optimistic_veto: bool,
    pub has_offchain_component: bool,
    pub has_hybrid_voting: bool,
}

impl FeatureFlags {
    /// Flags implied by the algorithm family and provenance of a type.
    fn derive(proposal_type: ProposalType) -> Self {
        let base = proposal_type.base_type();
        Self {
            has_voting_reason: true,
            has_approval_options: base == BaseType::Approval,
            has_optimistic_veto: base == BaseType::Optimistic,
            has_offchain_component: proposal_type.is_offchain() || proposal_type.is_hybrid(),
            has_hybrid_voting: proposal_type.is_hybrid(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalTypeConfig {
    pub proposal_type: ProposalType,
    pub strategy: ProposalStrategy,
    pub display_name: &'static str,
    pub description: &'static str,
    pub features: FeatureFlags,
}

impl ProposalTypeConfig {
    pub fn new(
        proposal_type: ProposalType,
        strategy: ProposalStrategy,
        display_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            proposal_type,
            strategy,
            display_name,
            description,
            features: FeatureFlags::derive(proposal_type),
        }
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }
}

/// (type, display name, description) for every built-in registration.
const BUILTIN_TYPES: [(ProposalType, &str, &str); 12] = [
    (
        ProposalType::Standard,
        "Standard Proposal",
        "Standard on-chain proposal with simple FOR/AGAINST/ABSTAIN voting",
    ),
    (
        ProposalType::Approval,
        "Approval Voting",
        "Multi-choice voting for budget allocation and grant selection",
    ),
    (
        ProposalType::Optimistic,
        "Optimistic Proposal",
        "Proposal that passes unless vetoed by sufficient against votes",
    ),
    (
        ProposalType::OffchainStandard,
        "Off-chain Standard",
        "Off-chain voting with standard FOR/AGAINST/ABSTAIN options",
    ),
    (
        ProposalType::OffchainApproval,
        "Off-chain Approval",
        "Off-chain multi-choice voting for selections",
    ),
    (
        ProposalType::OffchainOptimistic,
        "Off-chain Optimistic",
        "Off-chain optimistic proposal with veto mechanism",
    ),
    (
        ProposalType::OffchainOptimisticTiered,
        "Off-chain Optimistic Tiered",
        "Off-chain optimistic with different veto thresholds by tier",
    ),
    (
        ProposalType::HybridStandard,
        "Hybrid Standard",
        "Combined on-chain/off-chain voting with weighted stakeholder groups",
    ),
    (
        ProposalType::HybridApproval,
        "Hybrid Approval",
        "Multi-stakeholder approval voting with weighted groups",
    ),
    (
        ProposalType::HybridOptimistic,
        "Hybrid Optimistic",
        "Multi-stakeholder optimistic proposal with veto across groups",
    ),
    (
        ProposalType::HybridOptimisticTiered,
        "Hybrid Optimistic Tiered",
        "Hybrid optimistic with different veto thresholds per group",
    ),
    (
        ProposalType::Snapshot,
        "Snapshot Proposal",
        "Off-chain social signaling vote via Snapshot platform",
    ),
];

/// Strategy used for a built-in type.
///
/// Off-chain types reuse the on-chain algorithm of their family, since
/// provenance does not change how votes are counted. Snapshot votes are
/// counted as standard proposals.
pub fn builtin_strategy(proposal_type: ProposalType) -> ProposalStrategy {
    match proposal_type {
        ProposalType::HybridOptimisticTiered => ProposalStrategy::hybrid_optimistic_tiered(),
        t if t.is_hybrid() => ProposalStrategy::hybrid(t.base_type()),
        t => ProposalStrategy::for_base(t.base_type()),
    }
}

static SHARED: OnceLock<ProposalTypeRegistry> = OnceLock::new();

/// Registry of proposal type configurations
#[derive(Debug, Clone, Default)]
pub struct ProposalTypeRegistry {
    configs: HashMap<ProposalType, ProposalTypeConfig>,
}

impl ProposalTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in proposal type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.initialize();
        registry
    }

    /// Process-wide registry with the built-in types, initialized once.
    pub fn shared() -> &'static ProposalTypeRegistry {
        SHARED.get_or_init(Self::with_defaults)
    }

    /// Clear and rebuild the built-in registrations.
    pub fn initialize(&mut self) {
        self.clear();
        for (proposal_type, display_name, description) in BUILTIN_TYPES {
            self.register(ProposalTypeConfig::new(
                proposal_type,
                builtin_strategy(proposal_type),
                display_name,
                description,
            ));
        }
        debug!(types = self.configs.len(), "Initialized proposal type registry");
    }

    /// Populate the built-in types unless something is already registered.
    pub fn ensure_initialized(&mut self) {
        if self.configs.is_empty() {
            self.initialize();
        }
    }

    /// Register a configuration, replacing any previous one for the type.
    pub fn register(&mut self, config: ProposalTypeConfig) {
        debug!(
            proposal_type = %config.proposal_type,
            strategy = config.strategy.label(),
            "Registered proposal type"
        );
        self.configs.insert(config.proposal_type, config);
    }

    pub fn get_config(&self, proposal_type: ProposalType) -> Result<&ProposalTypeConfig, ProposalError> {
        self.configs
            .get(&proposal_type)
            .ok_or_else(|| ProposalError::UnknownProposalType(proposal_type.to_string()))
    }

    /// Look up a configuration by its wire name.
    pub fn get_config_by_name(&self, name: &str) -> Result<&ProposalTypeConfig, ProposalError> {
        let proposal_type: ProposalType = name.parse()?;
        self.get_config(proposal_type)
    }

    pub fn has_type(&self, name: &str) -> bool {
        name.parse::<ProposalType>()
            .is_ok_and(|t| self.configs.contains_key(&t))
    }

    /// Registered types in declaration order.
    pub fn types(&self) -> Vec<ProposalType> {
        ProposalType::ALL
            .iter()
            .copied()
            .filter(|t| self.configs.contains_key(t))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn clear(&mut self) {
        self.configs.clear();
    }
}
