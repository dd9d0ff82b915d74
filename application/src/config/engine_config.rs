//! Engine configuration: tenant knobs and payload defaults.
//!
//! [`EngineConfig`] is the application-side view of the `[engine]` config
//! section. It produces the [`ProposalContext`] attached to every proposal
//! and the defaults the record adapter falls back to when a record lacks a
//! quorum or approval threshold.

use proposal_domain::{Amount, ArithmeticError, Percentage, ProposalContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Tenant namespace, e.g. `optimism`, `uniswap`, `scroll`.
    pub tenant: String,
    pub calculation_options: Option<u8>,
    pub delegate_quorum: Option<Amount>,
    /// Display veto bar for optimistic proposals, whole percent of supply.
    pub disapproval_threshold: Option<u64>,
    pub budget_change_date: Option<Amount>,
    pub v6_upgrade_block: Option<Amount>,
    /// Quorum as a whole percent of votable supply when a record has none.
    pub default_quorum_percent: u64,
    /// Approval threshold used when a record has none.
    pub default_approval_threshold: Amount,
    /// Votable supply used when a record has none.
    pub votable_supply: Option<Amount>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tenant: "optimism".to_string(),
            calculation_options: None,
            delegate_quorum: None,
            disapproval_threshold: None,
            budget_change_date: None,
            v6_upgrade_block: None,
            default_quorum_percent: 4,
            default_approval_threshold: Amount::from(5000u64),
            votable_supply: None,
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn with_calculation_options(mut self, options: u8) -> Self {
        self.calculation_options = Some(options);
        self
    }

    pub fn with_delegate_quorum(mut self, quorum: Amount) -> Self {
        self.delegate_quorum = Some(quorum);
        self
    }

    pub fn with_disapproval_threshold(mut self, percent: u64) -> Self {
        self.disapproval_threshold = Some(percent);
        self
    }

    pub fn with_budget_change_date(mut self, block: Amount) -> Self {
        self.budget_change_date = Some(block);
        self
    }

    pub fn with_v6_upgrade_block(mut self, block: Amount) -> Self {
        self.v6_upgrade_block = Some(block);
        self
    }

    pub fn with_default_quorum_percent(mut self, percent: u64) -> Self {
        self.default_quorum_percent = percent;
        self
    }

    pub fn with_default_approval_threshold(mut self, threshold: Amount) -> Self {
        self.default_approval_threshold = threshold;
        self
    }

    pub fn with_votable_supply(mut self, supply: Amount) -> Self {
        self.votable_supply = Some(supply);
        self
    }

    // ==================== Derived Values ====================

    /// Context attached to every proposal evaluated under this config.
    pub fn to_context(&self) -> ProposalContext {
        ProposalContext {
            tenant: self.tenant.clone(),
            calculation_options: self.calculation_options,
            delegate_quorum: self.delegate_quorum,
            disapproval_threshold: self.disapproval_threshold.map(Percentage::from_whole),
            budget_change_date: self.budget_change_date,
            v6_upgrade_block: self.v6_upgrade_block,
        }
    }

    /// Fallback quorum: `default_quorum_percent` of `votable_supply`.
    pub fn default_quorum(&self, votable_supply: Amount) -> Result<Amount, ArithmeticError> {
        Percentage::from_whole(self.default_quorum_percent).of(votable_supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tenant, "optimism");
        assert_eq!(config.default_quorum_percent, 4);
        assert_eq!(config.default_approval_threshold, Amount::from(5000u64));
        assert_eq!(config.to_context(), ProposalContext::new("optimism"));
    }

    #[test]
    fn test_default_quorum_is_four_percent() {
        let config = EngineConfig::default();
        assert_eq!(
            config.default_quorum(Amount::from(1_000_000u64)).unwrap(),
            Amount::from(40_000u64)
        );
        assert_eq!(config.default_quorum(Amount::zero()).unwrap(), Amount::zero());
    }

    #[test]
    fn test_context_carries_every_knob() {
        let config = EngineConfig::default()
            .with_tenant("scroll")
            .with_calculation_options(1)
            .with_delegate_quorum(Amount::from(300u64))
            .with_disapproval_threshold(20)
            .with_budget_change_date(Amount::from(7u64))
            .with_v6_upgrade_block(Amount::from(9u64));
        let context = config.to_context();
        assert_eq!(
            context,
            ProposalContext::new("scroll")
                .with_calculation_options(1)
                .with_delegate_quorum(Amount::from(300u64))
                .with_disapproval_threshold(Percentage::from_whole(20))
                .with_budget_change_date(Amount::from(7u64))
                .with_v6_upgrade_block(Amount::from(9u64))
        );
    }
}
