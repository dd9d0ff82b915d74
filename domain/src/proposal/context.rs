//! Tenant context and tenant-specific vote counting.

use crate::core::amount::{Amount, checked_sum};
use crate::core::error::ArithmeticError;
use crate::core::percentage::Percentage;
use crate::proposal::value_objects::ProposalResults;

/// Tenant identity plus the knobs that tune strategy arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposalContext {
    pub tenant: String,
    pub calculation_options: Option<u8>,
    pub delegate_quorum: Option<Amount>,
    /// Display veto bar for optimistic proposals, as a share of votable supply.
    pub disapproval_threshold: Option<Percentage>,
    pub budget_change_date: Option<Amount>,
    /// Governor upgrade block; earlier approval results use the legacy layout.
    pub v6_upgrade_block: Option<Amount>,
}

impl ProposalContext {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            ..Default::default()
        }
    }

    pub fn with_calculation_options(mut self, options: u8) -> Self {
        self.calculation_options = Some(options);
        self
    }

    pub fn with_delegate_quorum(mut self, quorum: Amount) -> Self {
        self.delegate_quorum = Some(quorum);
        self
    }

    pub fn with_disapproval_threshold(mut self, threshold: Percentage) -> Self {
        self.disapproval_threshold = Some(threshold);
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

    /// Vote-counting rule used for quorum checks under this context.
    pub fn participation_rule(&self) -> ParticipationRule {
        ParticipationRule::for_context(self)
    }
}

/// Which vote buckets count toward quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationRule {
    ForOnly,
    ForAndAbstain,
    AllVotes,
}

/// `(tenant, required calculation_options, rule)`; `None` matches any value.
const TENANT_PARTICIPATION_RULES: &[(&str, Option<u8>, ParticipationRule)] = &[
    ("uniswap", None, ParticipationRule::ForOnly),
    ("scroll", None, ParticipationRule::AllVotes),
    ("optimism", Some(1), ParticipationRule::ForOnly),
];

impl ParticipationRule {
    /// First matching table row wins; unmatched tenants count FOR + ABSTAIN.
    pub fn for_context(context: &ProposalContext) -> Self {
        TENANT_PARTICIPATION_RULES
            .iter()
            .find(|(tenant, options, _)| {
                *tenant == context.tenant
                    && options.is_none_or(|o| context.calculation_options == Some(o))
            })
            .map(|(_, _, rule)| *rule)
            .unwrap_or(ParticipationRule::ForAndAbstain)
    }

    pub fn count(
        self,
        for_votes: Amount,
        against_votes: Amount,
        abstain_votes: Amount,
    ) -> Result<Amount, ArithmeticError> {
        match self {
            ParticipationRule::ForOnly => Ok(for_votes),
            ParticipationRule::ForAndAbstain => {
                checked_sum([for_votes, abstain_votes], "participation votes")
            }
            ParticipationRule::AllVotes => checked_sum(
                [for_votes, against_votes, abstain_votes],
                "participation votes",
            ),
        }
    }

    pub fn count_results(self, results: &ProposalResults) -> Result<Amount, ArithmeticError> {
        self.count(results.for_votes, results.against_votes, results.abstain_votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> ProposalResults {
        ProposalResults::from_tallies(Amount::from(10u64), Amount::from(20u64), Amount::from(5u64))
            .unwrap()
    }

    #[test]
    fn test_tenant_table() {
        let cases = [
            (ProposalContext::new("uniswap"), 10u64),
            (ProposalContext::new("scroll"), 35),
            (ProposalContext::new("optimism").with_calculation_options(1), 10),
            (ProposalContext::new("optimism"), 15),
            (ProposalContext::new("optimism").with_calculation_options(0), 15),
            (ProposalContext::new("ens"), 15),
        ];
        for (context, expected) in cases {
            let votes = context.participation_rule().count_results(&results()).unwrap();
            assert_eq!(votes, Amount::from(expected), "tenant {}", context.tenant);
        }
    }

    #[test]
    fn test_calculation_options_only_applies_to_named_tenant() {
        let context = ProposalContext::new("ens").with_calculation_options(1);
        assert_eq!(context.participation_rule(), ParticipationRule::ForAndAbstain);
    }

    #[test]
    fn test_uniswap_ignores_calculation_options() {
        let context = ProposalContext::new("uniswap").with_calculation_options(0);
        assert_eq!(context.participation_rule(), ParticipationRule::ForOnly);
    }
}
