//! Hybrid voting: on-chain delegates plus three off-chain stakeholder groups.
//!
//! Each group is measured against its own eligible population. Delegates
//! are back-derived from the delegate quorum (a 30% figure); apps, users and
//! chains use fixed populations. A group qualifies when it clears its
//! minimum vote count and 30% participation. Quorum needs three qualifying
//! groups; approval is the weighted mean of qualifying groups' approval
//! rates, renormalized over those groups only.

use super::ProposalStrategy;
use super::base::{calculation_error, combine_hybrid_results, invalid, is_blank};
use crate::core::amount::{Amount, checked_mul, checked_sum, first_amount};
use crate::core::error::{AmountError, ArithmeticError, ProposalError};
use crate::core::percentage::{Percentage, safe_percentage};
use crate::proposal::{
    BaseType, GroupMetrics, GroupName, HybridData, HybridMetrics, MetricsDetail, Proposal,
    ProposalData, ProposalMetrics, ProposalResults, ProposalStatus, VetoTiers, VotingGroup,
    VotingGroups,
};
use primitive_types::U512;
use serde_json::Value;

pub const GROUP_QUORUM: Percentage = Percentage::from_whole(30);
pub const APPROVAL_THRESHOLD: Percentage = Percentage::from_whole(30);
pub const DEFAULT_DELEGATE_QUORUM: u64 = 100_000;
pub const REQUIRED_QUALIFYING_GROUPS: usize = 3;

/// Hybrid wrapper around two strategies of the same base family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridStrategy {
    base: BaseType,
}

impl HybridStrategy {
    pub fn new(base: BaseType) -> Self {
        Self { base }
    }

    pub fn base(&self) -> BaseType {
        self.base
    }

    pub fn label(&self) -> &'static str {
        self.base.hybrid_label()
    }

    pub fn onchain(&self) -> ProposalStrategy {
        ProposalStrategy::for_base(self.base)
    }

    pub fn offchain(&self) -> ProposalStrategy {
        ProposalStrategy::for_base(self.base)
    }

    pub fn parse_data(&self, raw: &Value) -> Result<HybridData, ProposalError> {
        let label = self.label();
        let pick = |keys: [&str; 2]| {
            keys.iter()
                .map(|k| raw.get(k))
                .find(|v| !is_blank(*v))
                .flatten()
        };
        let (Some(onchain_raw), Some(offchain_raw)) =
            (pick(["onchainData", "onchain"]), pick(["offchainData", "offchain"]))
        else {
            return Err(ProposalError::invalid_data(label, "Missing onchain or offchain data"));
        };

        let onchain = self.onchain().parse_data(onchain_raw)?;
        let offchain = self.offchain().parse_data(offchain_raw)?;
        let voting_groups = parse_voting_groups(raw.get("votingGroups")).map_err(invalid(label))?;
        let tiers = parse_tiers(raw.get("tiers"), label)?;

        Ok(HybridData {
            base: self.base,
            onchain: Box::new(onchain),
            offchain: Box::new(offchain),
            voting_groups,
            tiers,
            offchain_proposal_id: raw
                .get("offchainProposalId")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn parse_results(&self, raw: &Value, data: Option<&Value>) -> Result<ProposalResults, ProposalError> {
        combine_hybrid_results(raw, data).map_err(invalid(self.label()))
    }

    pub fn validate(&self, data: &ProposalData) -> bool {
        let ProposalData::Hybrid(hybrid) = data else {
            return false;
        };
        hybrid.base == self.base
            && !matches!(*hybrid.onchain, ProposalData::Hybrid(_))
            && !matches!(*hybrid.offchain, ProposalData::Hybrid(_))
            && self.onchain().validate_data(&hybrid.onchain)
            && self.offchain().validate_data(&hybrid.offchain)
    }

    pub fn type_description(&self) -> String {
        format!(
            "Hybrid {} proposal with weighted voting across multiple stakeholder groups",
            self.base.as_str().to_lowercase()
        )
    }
}

fn parse_voting_groups(raw: Option<&Value>) -> Result<VotingGroups, AmountError> {
    let mut groups = VotingGroups::default();
    let Some(raw) = raw else {
        return Ok(groups);
    };
    for name in GroupName::ALL {
        let Some(group) = raw.get(name.key()) else {
            continue;
        };
        *groups.get_mut(name) = VotingGroup {
            for_votes: first_amount(group, &["forVotes", "for"])?,
            against_votes: first_amount(group, &["againstVotes", "against"])?,
            abstain_votes: first_amount(group, &["abstainVotes", "abstain"])?,
            total_eligible: first_amount(group, &["totalEligible"])?,
        };
    }
    Ok(groups)
}

fn parse_tiers(raw: Option<&Value>, label: &str) -> Result<Option<VetoTiers>, ProposalError> {
    if is_blank(raw) {
        return Ok(None);
    }
    let tiers: Option<Vec<u64>> = raw
        .and_then(Value::as_array)
        .and_then(|items| items.iter().map(Value::as_u64).collect::<Option<Vec<_>>>());
    match tiers.as_deref() {
        Some(&[two, three, four]) if [two, three, four].iter().all(|t| *t <= 100) => {
            Ok(Some(VetoTiers::new([two, three, four])))
        }
        _ => Err(ProposalError::invalid_data(
            label,
            "tiers must hold three percentages",
        )),
    }
}

/// Eligible population of a group as a fraction, so the delegate figure
/// (`quorum * 100 / 30`) stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligible {
    numerator: Amount,
    denominator: Amount,
}

impl Eligible {
    pub fn for_group(group: GroupName, delegate_quorum: Amount) -> Result<Self, ArithmeticError> {
        let fixed = |n: u64| Self {
            numerator: Amount::from(n),
            denominator: Amount::one(),
        };
        Ok(match group {
            GroupName::Delegates => Self {
                numerator: checked_mul(delegate_quorum, Amount::from(100u64), "eligible delegates")?,
                denominator: Amount::from(GROUP_QUORUM.hundredths() / 100),
            },
            GroupName::Apps => fixed(100),
            GroupName::Users => fixed(1_000),
            GroupName::Chains => fixed(15),
        })
    }

    /// Sum of all four populations.
    pub fn total(delegate_quorum: Amount) -> Result<Self, ArithmeticError> {
        let delegates = Self::for_group(GroupName::Delegates, delegate_quorum)?;
        let mut numerator = delegates.numerator;
        for group in [GroupName::Apps, GroupName::Users, GroupName::Chains] {
            let fixed = Self::for_group(group, delegate_quorum)?;
            let scaled = checked_mul(fixed.numerator, delegates.denominator, "eligible total")?;
            numerator = checked_sum([numerator, scaled], "eligible total")?;
        }
        Ok(Self {
            numerator,
            denominator: delegates.denominator,
        })
    }

    /// `votes / eligible` as a percentage.
    pub fn share(&self, votes: Amount) -> Result<Percentage, ArithmeticError> {
        let scaled = checked_mul(votes, self.denominator, "group share")?;
        safe_percentage(scaled, self.numerator)
    }

    /// Whole-voter approximation for display.
    pub fn approximate(&self) -> Amount {
        if self.denominator.is_zero() {
            return Amount::zero();
        }
        self.numerator / self.denominator
    }
}

/// Fixed minimum vote count for the off-chain groups.
pub fn minimum_votes(group: GroupName) -> Option<Amount> {
    match group {
        GroupName::Delegates => None,
        GroupName::Apps => Some(Amount::from(100u64)),
        GroupName::Users => Some(Amount::from(1_000u64)),
        GroupName::Chains => Some(Amount::from(15u64)),
    }
}

pub fn delegate_quorum(proposal: &Proposal) -> Amount {
    proposal
        .context()
        .delegate_quorum
        .filter(|q| !q.is_zero())
        .unwrap_or_else(|| Amount::from(DEFAULT_DELEGATE_QUORUM))
}

pub(crate) fn hybrid_data<'a>(proposal: &'a Proposal, label: &str) -> Result<&'a HybridData, ProposalError> {
    proposal
        .data()
        .as_hybrid()
        .ok_or_else(|| ProposalError::invalid_data(label, "Proposal data is not hybrid data"))
}

pub fn calculate_metrics(proposal: &Proposal, strategy: &HybridStrategy) -> Result<ProposalMetrics, ProposalError> {
    let data = hybrid_data(proposal, strategy.label())?;
    group_metrics(proposal, &data.voting_groups).map_err(calculation_error(proposal, "hybrid metrics"))
}

fn group_metrics(proposal: &Proposal, groups: &VotingGroups) -> Result<ProposalMetrics, ArithmeticError> {
    let rule = proposal.context().participation_rule();
    let dq = delegate_quorum(proposal);

    let mut metrics = Vec::with_capacity(GroupName::ALL.len());
    let mut weighted = WeightedApproval::default();

    for (name, group) in groups.iter() {
        let eligible = Eligible::for_group(name, dq)?;
        let quorum_votes = rule.count(group.for_votes, group.against_votes, group.abstain_votes)?;
        let opinion = checked_sum([group.for_votes, group.against_votes], "group opinion votes")?;

        let participation_rate = eligible.share(quorum_votes)?;
        let approval_rate = safe_percentage(group.for_votes, opinion)?;
        let meets_minimum = minimum_votes(name).is_none_or(|min| quorum_votes >= min)
            && participation_rate >= GROUP_QUORUM;

        if meets_minimum {
            weighted.add(name.weight_sixths(), group.for_votes, opinion);
        }

        metrics.push(GroupMetrics {
            group: name,
            participation_rate,
            approval_rate,
            meets_minimum,
        });
    }

    let weighted_approval_rate = weighted.rate()?;
    let approval_met = weighted.reaches(APPROVAL_THRESHOLD)?;

    let qualifying = metrics.iter().filter(|m| m.meets_minimum).count();
    let cast = checked_sum(
        groups.iter().flat_map(|(_, g)| [g.for_votes, g.against_votes]),
        "hybrid votes",
    )?;
    let total = Eligible::total(dq)?;

    Ok(ProposalMetrics {
        quorum_met: qualifying >= REQUIRED_QUALIFYING_GROUPS,
        approval_met,
        participation_rate: total.share(cast)?,
        approval_rate: weighted_approval_rate,
        detail: MetricsDetail::Hybrid(HybridMetrics {
            groups: metrics,
            weighted_approval_rate,
        }),
    })
}

/// Weighted mean of qualifying groups' approval rates, held as an exact
/// fraction so the approval bar is compared without rounding.
///
/// With group weights `w_i` and approval `f_i / o_i`, the mean is
/// `sum(w_i * f_i * P / o_i) / (sum(w_i) * P)` where `P` is the product of
/// the non-zero `o_i`. Four 256-bit opinions fit in 512 bits.
#[derive(Debug, Default)]
struct WeightedApproval {
    terms: Vec<(u64, Amount, Amount)>,
}

impl WeightedApproval {
    fn add(&mut self, weight: u64, for_votes: Amount, opinion: Amount) {
        self.terms.push((weight, for_votes, opinion));
    }

    /// `(numerator, denominator)`, `None` when no group qualified.
    fn fraction(&self) -> Result<Option<(U512, U512)>, ArithmeticError> {
        let total_weight: u64 = self.terms.iter().map(|(w, _, _)| w).sum();
        if total_weight == 0 {
            return Ok(None);
        }

        let product = self
            .terms
            .iter()
            .filter(|(_, _, o)| !o.is_zero())
            .try_fold(U512::one(), |acc, (_, _, o)| mul512(acc, U512::from(*o)))?;

        let mut numerator = U512::zero();
        for (w, f, o) in self.terms.iter().filter(|(_, _, o)| !o.is_zero()) {
            let term = mul512(U512::from(*f), product / U512::from(*o))?;
            let term = mul512(term, U512::from(*w))?;
            numerator = numerator
                .checked_add(term)
                .ok_or(ArithmeticError::Overflow("weighted approval"))?;
        }
        let denominator = mul512(product, U512::from(total_weight))?;
        Ok(Some((numerator, denominator)))
    }

    /// Truncated to hundredths for display.
    fn rate(&self) -> Result<Percentage, ArithmeticError> {
        let Some((numerator, denominator)) = self.fraction()? else {
            return Ok(Percentage::ZERO);
        };
        let hundredths = mul512(numerator, U512::from(10_000u64))? / denominator;
        Ok(Percentage::from_hundredths(hundredths.min(U512::from(10_000u64)).low_u64()))
    }

    fn reaches(&self, bar: Percentage) -> Result<bool, ArithmeticError> {
        let Some((numerator, denominator)) = self.fraction()? else {
            return Ok(bar == Percentage::ZERO);
        };
        Ok(mul512(numerator, U512::from(10_000u64))?
            >= mul512(denominator, U512::from(bar.hundredths()))?)
    }
}

fn mul512(a: U512, b: U512) -> Result<U512, ArithmeticError> {
    a.checked_mul(b).ok_or(ArithmeticError::Overflow("weighted approval"))
}

pub fn ended_status(metrics: &ProposalMetrics) -> ProposalStatus {
    if metrics.quorum_met && metrics.approval_met {
        ProposalStatus::Succeeded
    } else {
        ProposalStatus::Defeated
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::proposal::{ProposalContext, ProposalId, ProposalTimeline, ProposalType, TransactionSet};
    use serde_json::json;

    pub(crate) fn amt(n: u64) -> Amount {
        Amount::from(n)
    }

    pub(crate) fn hybrid_proposal(
        proposal_type: ProposalType,
        strategy: ProposalStrategy,
        groups: VotingGroups,
        context: ProposalContext,
    ) -> Proposal {
        let base = proposal_type.base_type();
        let data = HybridData {
            base,
            onchain: Box::new(ProposalData::Standard(TransactionSet::default())),
            offchain: Box::new(ProposalData::Standard(TransactionSet::default())),
            voting_groups: groups,
            tiers: None,
            offchain_proposal_id: None,
        };
        Proposal::new(
            ProposalId::new("99").unwrap(),
            proposal_type,
            strategy,
            ProposalData::Hybrid(data),
            ProposalTimeline::new(amt(1), amt(10), amt(20)).unwrap(),
        )
        .unwrap()
        .with_context(context)
    }

    fn standard_hybrid(groups: VotingGroups) -> Proposal {
        hybrid_proposal(
            ProposalType::HybridStandard,
            ProposalStrategy::Hybrid(HybridStrategy::new(BaseType::Standard)),
            groups,
            // delegate quorum 300 -> 1000 eligible delegates
            ProposalContext::new("optimism").with_delegate_quorum(amt(300)),
        )
    }

    fn detail(m: &ProposalMetrics) -> &HybridMetrics {
        match &m.detail {
            MetricsDetail::Hybrid(h) => h,
            other => panic!("unexpected detail {other:?}"),
        }
    }

    // ==================== Eligible populations ====================

    #[test]
    fn test_delegate_population_is_back_derived() {
        let e = Eligible::for_group(GroupName::Delegates, amt(300)).unwrap();
        assert_eq!(e.approximate(), amt(1_000));
        assert_eq!(e.share(amt(300)).unwrap(), Percentage::from_whole(30));

        let odd = Eligible::for_group(GroupName::Delegates, amt(100_000)).unwrap();
        assert_eq!(odd.approximate(), amt(333_333));
        // exactly 30% of 333333.33...
        assert_eq!(odd.share(amt(100_000)).unwrap(), Percentage::from_whole(30));
    }

    #[test]
    fn test_total_population() {
        let total = Eligible::total(amt(300)).unwrap();
        assert_eq!(total.approximate(), amt(1_000 + 100 + 1_000 + 15));
    }

    // ==================== Quorum ====================

    #[test]
    fn test_two_qualifying_groups_never_reach_quorum() {
        let groups = VotingGroups {
            delegates: VotingGroup::new(900, 0, 0),
            apps: VotingGroup::new(100, 0, 0),
            users: VotingGroup::new(10, 0, 0),
            chains: VotingGroup::new(1, 0, 0),
        };
        let m = calculate_metrics(
            &standard_hybrid(groups),
            &HybridStrategy::new(BaseType::Standard),
        )
        .unwrap();
        assert_eq!(detail(&m).qualifying_groups(), 2);
        assert!(!m.quorum_met);
        assert_eq!(m.approval_rate, Percentage::HUNDRED);
        assert!(m.approval_met);
        assert_eq!(ended_status(&m), ProposalStatus::Defeated);
    }

    #[test]
    fn test_minimum_vote_count_applies_to_offchain_groups() {
        // 14 chain votes is 93% participation but under the minimum of 15
        let groups = VotingGroups {
            chains: VotingGroup::new(14, 0, 0),
            ..Default::default()
        };
        let m = calculate_metrics(&standard_hybrid(groups), &HybridStrategy::new(BaseType::Standard)).unwrap();
        let chains = detail(&m).group(GroupName::Chains).unwrap();
        assert!(chains.participation_rate > GROUP_QUORUM);
        assert!(!chains.meets_minimum);
    }

    // ==================== Weighted approval ====================

    #[test]
    fn test_weights_renormalize_over_qualifying_groups() {
        // delegates 60% approval (weight 3), apps 30% (1), users 0% (1); chains do not qualify
        let groups = VotingGroups {
            delegates: VotingGroup::new(300, 200, 0),
            apps: VotingGroup::new(30, 70, 70),
            users: VotingGroup::new(0, 1_000, 1_000),
            chains: VotingGroup::new(0, 0, 0),
        };
        let m = calculate_metrics(&standard_hybrid(groups), &HybridStrategy::new(BaseType::Standard)).unwrap();
        let h = detail(&m);
        assert_eq!(h.qualifying_groups(), 3);
        assert!(m.quorum_met);
        // (60 * 3 + 30 * 1 + 0 * 1) / 5 = 42
        assert_eq!(h.weighted_approval_rate, Percentage::from_whole(42));
        assert!(m.approval_met);
        assert_eq!(ended_status(&m), ProposalStatus::Succeeded);
    }

    #[test]
    fn test_weighted_rate_below_bar_defeats() {
        let groups = VotingGroups {
            delegates: VotingGroup::new(100, 400, 300),
            apps: VotingGroup::new(20, 80, 80),
            users: VotingGroup::new(200, 800, 800),
            chains: VotingGroup::new(0, 0, 0),
        };
        let p = standard_hybrid(groups);
        let m = calculate_metrics(&p, &HybridStrategy::new(BaseType::Standard)).unwrap();
        assert!(m.quorum_met);
        assert_eq!(m.approval_rate, Percentage::from_whole(20));
        assert!(!m.approval_met);
        assert_eq!(p.status(amt(21)).unwrap(), ProposalStatus::Defeated);
    }

    #[test]
    fn test_weighted_rate_exactly_at_bar_is_approved() {
        // delegates 1/3 (weight 3), apps and users 25% each: (1 + 0.25 + 0.25) / 5 = 30%
        let groups = VotingGroups {
            delegates: VotingGroup::new(100, 200, 200),
            apps: VotingGroup::new(25, 75, 75),
            users: VotingGroup::new(250, 750, 750),
            chains: VotingGroup::new(0, 0, 0),
        };
        let m = calculate_metrics(&standard_hybrid(groups), &HybridStrategy::new(BaseType::Standard)).unwrap();
        assert!(m.quorum_met);
        assert_eq!(detail(&m).group(GroupName::Delegates).unwrap().approval_rate, Percentage::from_hundredths(3333));
        assert_eq!(m.approval_rate, Percentage::from_whole(30));
        assert!(m.approval_met);
        assert_eq!(ended_status(&m), ProposalStatus::Succeeded);
    }

    #[test]
    fn test_weighted_rate_just_under_bar() {
        // delegates 99/300 instead of 100/300
        let groups = VotingGroups {
            delegates: VotingGroup::new(99, 201, 200),
            apps: VotingGroup::new(25, 75, 75),
            users: VotingGroup::new(250, 750, 750),
            chains: VotingGroup::new(0, 0, 0),
        };
        let m = calculate_metrics(&standard_hybrid(groups), &HybridStrategy::new(BaseType::Standard)).unwrap();
        assert!(m.quorum_met);
        assert_eq!(m.approval_rate, Percentage::from_hundredths(2980));
        assert!(!m.approval_met);
    }

    #[test]
    fn test_weighted_fraction_with_wide_tallies() {
        let wei = Amount::exp10(27);
        let mut weighted = WeightedApproval::default();
        for w in [3, 1, 1, 1] {
            weighted.add(w, wei, wei * Amount::from(2u64));
        }
        assert_eq!(weighted.rate().unwrap(), Percentage::from_whole(50));
        assert!(weighted.reaches(APPROVAL_THRESHOLD).unwrap());
    }

    #[test]
    fn test_no_qualifying_groups_is_zero() {
        let m = calculate_metrics(
            &standard_hybrid(VotingGroups::default()),
            &HybridStrategy::new(BaseType::Standard),
        )
        .unwrap();
        assert_eq!(m.approval_rate, Percentage::ZERO);
        assert_eq!(m.participation_rate, Percentage::ZERO);
        assert!(!m.quorum_met);
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_data_accepts_both_key_styles() {
        let strategy = HybridStrategy::new(BaseType::Standard);
        let raw = json!({
            "onchain": { "targets": ["0xa"], "values": [0], "signatures": [""], "calldatas": ["0x"] },
            "offchainData": {},
            "votingGroups": {
                "delegates": { "forVotes": "10", "againstVotes": 1 },
                "apps": { "for": 4 }
            },
            "tiers": [60, 50, 40],
            "offchainProposalId": "0xfeed"
        });
        let data = strategy.parse_data(&raw).unwrap();
        assert_eq!(data.voting_groups.delegates.for_votes, amt(10));
        assert_eq!(data.voting_groups.apps.for_votes, amt(4));
        assert_eq!(data.tiers, Some(VetoTiers::new([60, 50, 40])));
        assert_eq!(data.offchain_proposal_id.as_deref(), Some("0xfeed"));
        assert!(strategy.validate(&ProposalData::Hybrid(data)));
    }

    #[test]
    fn test_parse_data_requires_both_sides() {
        let err = HybridStrategy::new(BaseType::Approval)
            .parse_data(&json!({ "onchainData": { "options": [] } }))
            .unwrap_err();
        assert_eq!(
            err,
            ProposalError::invalid_data("HYBRID_APPROVAL", "Missing onchain or offchain data")
        );
    }

    #[test]
    fn test_bad_tiers_are_rejected() {
        let err = HybridStrategy::new(BaseType::Optimistic)
            .parse_data(&json!({ "onchain": {}, "offchain": {}, "tiers": [50, 40] }))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PROPOSAL_DATA");
    }

    #[test]
    fn test_validate_rejects_mismatched_family() {
        let strategy = HybridStrategy::new(BaseType::Approval);
        let data = HybridStrategy::new(BaseType::Standard)
            .parse_data(&json!({ "onchain": {}, "offchain": {} }))
            .unwrap();
        assert!(!strategy.validate(&ProposalData::Hybrid(data)));
    }
}
