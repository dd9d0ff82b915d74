//! Canonical proposal data, one shape per algorithm family.

use crate::core::amount::Amount;
use crate::proposal::value_objects::BaseType;
use serde::Serialize;

/// Parsed proposal payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalData {
    /// Shared by standard, optimistic and snapshot proposals.
    Standard(TransactionSet),
    Approval(ApprovalData),
    Hybrid(HybridData),
}

impl ProposalData {
    pub fn kind(&self) -> &'static str {
        match self {
            ProposalData::Standard(_) => "STANDARD",
            ProposalData::Approval(_) => "APPROVAL",
            ProposalData::Hybrid(h) => h.base.hybrid_label(),
        }
    }

    pub fn as_standard(&self) -> Option<&TransactionSet> {
        match self {
            ProposalData::Standard(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_approval(&self) -> Option<&ApprovalData> {
        match self {
            ProposalData::Approval(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_hybrid(&self) -> Option<&HybridData> {
        match self {
            ProposalData::Hybrid(data) => Some(data),
            _ => None,
        }
    }
}

/// Parallel transaction arrays of a governor proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSet {
    pub targets: Vec<String>,
    pub values: Vec<Amount>,
    pub signatures: Vec<String>,
    pub calldatas: Vec<String>,
}

impl TransactionSet {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
            && self.values.is_empty()
            && self.signatures.is_empty()
            && self.calldatas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// All four arrays have the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.targets.len();
        self.values.len() == n && self.signatures.len() == n && self.calldatas.len() == n
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Transfer,
    Custom,
}

/// One transaction attached to an approval option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub target: String,
    pub value: Amount,
    pub calldata: String,
    pub signature: Option<String>,
    pub token: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Amount>,
}

impl Transaction {
    /// Custom call with no value.
    pub fn custom(target: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Custom,
            target: target.into(),
            value: Amount::zero(),
            calldata: "0x".to_string(),
            signature: None,
            token: None,
            recipient: None,
            amount: None,
        }
    }

    /// Token transfer counted against the approval budget.
    pub fn transfer(target: impl Into<String>, amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            amount: Some(amount),
            ..Self::custom(target)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOption {
    pub title: String,
    pub transactions: Vec<Transaction>,
    pub votes: Amount,
    pub budget_tokens_spent: Option<Amount>,
}

impl ApprovalOption {
    pub fn new(title: impl Into<String>, votes: Amount) -> Self {
        Self {
            title: title.into(),
            transactions: Vec::new(),
            votes,
            budget_tokens_spent: None,
        }
    }

    pub fn with_transaction(mut self, tx: Transaction) -> Self {
        self.transactions.push(tx);
        self
    }

    /// Sum of TRANSFER amounts; missing amounts count as zero.
    pub fn transfer_total(&self) -> Option<Amount> {
        self.transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Transfer)
            .try_fold(Amount::zero(), |acc, tx| {
                acc.checked_add(tx.amount.unwrap_or_default())
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalCriteria {
    Threshold,
    TopChoices,
}

impl ApprovalCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalCriteria::Threshold => "THRESHOLD",
            ApprovalCriteria::TopChoices => "TOP_CHOICES",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalData {
    pub options: Vec<ApprovalOption>,
    pub max_approvals: u64,
    pub criteria: ApprovalCriteria,
    /// Whole percent for THRESHOLD, option count for TOP_CHOICES.
    pub criteria_value: u64,
    pub budget_token: Option<String>,
    pub budget_amount: Option<Amount>,
}

/// The four stakeholder groups of hybrid voting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupName {
    Delegates,
    Apps,
    Users,
    Chains,
}

impl GroupName {
    pub const ALL: [GroupName; 4] = [
        GroupName::Delegates,
        GroupName::Apps,
        GroupName::Users,
        GroupName::Chains,
    ];

    /// Key used in raw `votingGroups` objects.
    pub fn key(&self) -> &'static str {
        match self {
            GroupName::Delegates => "delegates",
            GroupName::Apps => "apps",
            GroupName::Users => "users",
            GroupName::Chains => "chains",
        }
    }

    /// Key used in grouped API results.
    pub fn api_key(&self) -> &'static str {
        match self {
            GroupName::Delegates => "DELEGATES",
            GroupName::Apps => "APP",
            GroupName::Users => "USER",
            GroupName::Chains => "CHAIN",
        }
    }

    /// Voting weight in sixths: delegates carry half, the rest a sixth each.
    pub fn weight_sixths(&self) -> u64 {
        match self {
            GroupName::Delegates => 3,
            GroupName::Apps | GroupName::Users | GroupName::Chains => 1,
        }
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VotingGroup {
    pub for_votes: Amount,
    pub against_votes: Amount,
    pub abstain_votes: Amount,
    pub total_eligible: Amount,
}

impl VotingGroup {
    pub fn new(for_votes: u64, against_votes: u64, abstain_votes: u64) -> Self {
        Self {
            for_votes: Amount::from(for_votes),
            against_votes: Amount::from(against_votes),
            abstain_votes: Amount::from(abstain_votes),
            total_eligible: Amount::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VotingGroups {
    pub delegates: VotingGroup,
    pub apps: VotingGroup,
    pub users: VotingGroup,
    pub chains: VotingGroup,
}

impl VotingGroups {
    pub fn get(&self, name: GroupName) -> &VotingGroup {
        match name {
            GroupName::Delegates => &self.delegates,
            GroupName::Apps => &self.apps,
            GroupName::Users => &self.users,
            GroupName::Chains => &self.chains,
        }
    }

    pub fn get_mut(&mut self, name: GroupName) -> &mut VotingGroup {
        match name {
            GroupName::Delegates => &mut self.delegates,
            GroupName::Apps => &mut self.apps,
            GroupName::Users => &mut self.users,
            GroupName::Chains => &mut self.chains,
        }
    }

    /// Groups in fixed order: delegates, apps, users, chains.
    pub fn iter(&self) -> impl Iterator<Item = (GroupName, &VotingGroup)> {
        GroupName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

/// Veto percentages indexed by how many groups must reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VetoTiers {
    pub two_groups: u64,
    pub three_groups: u64,
    pub four_groups: u64,
}

impl VetoTiers {
    pub const TIERED_DEFAULT: VetoTiers = VetoTiers::new([55, 45, 35]);
    pub const FLAT_DEFAULT: VetoTiers = VetoTiers::new([65, 65, 65]);

    pub const fn new(tiers: [u64; 3]) -> Self {
        Self {
            two_groups: tiers[0],
            three_groups: tiers[1],
            four_groups: tiers[2],
        }
    }

    pub fn as_array(&self) -> [u64; 3] {
        [self.two_groups, self.three_groups, self.four_groups]
    }
}

/// Hybrid payload: an on-chain and an off-chain base payload plus group tallies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridData {
    pub base: BaseType,
    pub onchain: Box<ProposalData>,
    pub offchain: Box<ProposalData>,
    pub voting_groups: VotingGroups,
    pub tiers: Option<VetoTiers>,
    pub offchain_proposal_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_set_alignment() {
        let mut set = TransactionSet::default();
        assert!(set.is_empty());
        assert!(set.is_aligned());
        set.targets.push("0x1".to_string());
        assert!(!set.is_aligned());
        set.values.push(Amount::zero());
        set.signatures.push(String::new());
        set.calldatas.push("0x".to_string());
        assert!(set.is_aligned());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_transfer_total_skips_custom() {
        let option = ApprovalOption::new("Grants", Amount::zero())
            .with_transaction(Transaction::transfer("0xa", Amount::from(40u64)))
            .with_transaction(Transaction::custom("0xb"))
            .with_transaction(Transaction::transfer("0xc", Amount::from(2u64)));
        assert_eq!(option.transfer_total(), Some(Amount::from(42u64)));
    }

    #[test]
    fn test_group_weights_sum_to_one() {
        let total: u64 = GroupName::ALL.iter().map(|g| g.weight_sixths()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_groups_iterate_in_fixed_order() {
        let mut groups = VotingGroups::default();
        groups.get_mut(GroupName::Chains).for_votes = Amount::from(3u64);
        let names: Vec<_> = groups.iter().map(|(name, _)| name).collect();
        assert_eq!(names, GroupName::ALL.to_vec());
        assert_eq!(groups.chains.for_votes, Amount::from(3u64));
    }
}
