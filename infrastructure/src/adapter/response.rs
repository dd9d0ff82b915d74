//! Outbound API shape of an evaluated proposal.
//!
//! Amounts are rendered as decimal strings. Fields the engine cannot know
//! without a block-to-time oracle or transaction indexer (`*Time`,
//! `*TransactionHash`) are always `null`.

use proposal_application::Evaluation;
use proposal_domain::{
    Amount, ApprovalData, GroupName, Proposal, ProposalData, ProposalMetrics, ProposalResults,
    ProposalStatus, ProposalType, TransactionSet, VotingGroup, VotingGroups,
};
use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: String,
    pub proposer: String,
    pub proposal_type: ProposalType,
    #[serde(rename = "markdowntitle")]
    pub markdown_title: String,
    pub description: String,

    pub snapshot_block_number: Value,
    pub created_time: Option<String>,
    pub start_time: Option<String>,
    pub start_block: String,
    pub end_time: Option<String>,
    pub end_block: String,
    pub cancelled_time: Option<String>,
    pub executed_time: Option<String>,
    pub executed_block: Option<String>,
    pub queued_time: Option<String>,

    pub quorum: String,
    pub approval_threshold: String,

    pub proposal_data: Value,
    pub unformatted_proposal_data: Option<Value>,
    pub proposal_results: Value,

    pub status: ProposalStatus,

    pub created_transaction_hash: Option<String>,
    pub cancelled_transaction_hash: Option<String>,
    pub executed_transaction_hash: Option<String>,

    pub offchain_proposal_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ProposalMetrics>,
}

impl ProposalResponse {
    pub fn new(proposal: &Proposal, status: ProposalStatus) -> Self {
        let timeline = proposal.timeline();
        let created = timeline.created_block;
        // Block numbers that fit stay JSON numbers, like the upstream API.
        let snapshot_block_number = if created <= Amount::from(u64::MAX) {
            json!(created.low_u64())
        } else {
            json!(created.to_string())
        };

        Self {
            id: proposal.id().to_string(),
            proposer: proposal.proposer().to_string(),
            proposal_type: proposal.proposal_type(),
            markdown_title: proposal.title().to_string(),
            description: proposal.description().to_string(),
            snapshot_block_number,
            created_time: None,
            start_time: None,
            start_block: timeline.start_block.to_string(),
            end_time: None,
            end_block: timeline.end_block.to_string(),
            cancelled_time: None,
            executed_time: None,
            executed_block: timeline.executed_block.map(|b| b.to_string()),
            queued_time: None,
            quorum: proposal.quorum_votes().to_string(),
            approval_threshold: proposal.approval_threshold().to_string(),
            proposal_data: format_data(proposal.proposal_type(), proposal.data()),
            unformatted_proposal_data: None,
            proposal_results: format_results(proposal.data(), proposal.results()),
            status,
            created_transaction_hash: None,
            cancelled_transaction_hash: None,
            executed_transaction_hash: None,
            offchain_proposal_id: proposal
                .data()
                .as_hybrid()
                .and_then(|h| h.offchain_proposal_id.clone()),
            metrics: None,
        }
    }

    /// Response carrying the evaluation's status and metrics.
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self::new(&evaluation.proposal, evaluation.status).with_metrics(evaluation.metrics.clone())
    }

    pub fn from_evaluations(evaluations: &[Evaluation]) -> Vec<Self> {
        evaluations.iter().map(Self::from_evaluation).collect()
    }

    pub fn with_metrics(mut self, metrics: ProposalMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

fn format_data(proposal_type: ProposalType, data: &ProposalData) -> Value {
    match data {
        ProposalData::Standard(set) => transaction_batch(set),
        ProposalData::Approval(approval) if proposal_type == ProposalType::OffchainApproval => {
            json!({
                "options": [],
                "choices": approval.options.iter().map(|o| o.title.as_str()).collect::<Vec<_>>(),
            })
        }
        ProposalData::Approval(approval) => approval_options(approval),
        // Hybrids are shown through their on-chain half.
        ProposalData::Hybrid(hybrid) => match hybrid.onchain.as_ref() {
            ProposalData::Standard(set) => transaction_batch(set),
            ProposalData::Approval(approval) => approval_options(approval),
            ProposalData::Hybrid(_) => Value::Null,
        },
    }
}

fn transaction_batch(set: &TransactionSet) -> Value {
    json!({
        "options": [{
            "description": "Transaction Batch",
            "targets": set.targets,
            "values": decimal_strings(&set.values),
            "signatures": set.signatures,
            "calldatas": set.calldatas,
        }]
    })
}

fn approval_options(approval: &ApprovalData) -> Value {
    let options: Vec<Value> = approval
        .options
        .iter()
        .map(|option| {
            let txs = &option.transactions;
            json!({
                "description": option.title,
                "targets": txs.iter().map(|tx| tx.target.as_str()).collect::<Vec<_>>(),
                "values": txs.iter().map(|tx| tx.value.to_string()).collect::<Vec<_>>(),
                "signatures": txs.iter().map(|_| "").collect::<Vec<_>>(),
                "calldatas": txs.iter().map(|tx| tx.calldata.as_str()).collect::<Vec<_>>(),
                "budgetTokensSpent": option.budget_tokens_spent.map(|b| b.to_string()),
                "functionArgsName": [],
            })
        })
        .collect();

    json!({
        "options": options,
        "proposalSettings": {
            "maxApprovals": approval.max_approvals,
            "criteria": approval.criteria.as_str(),
            "budgetToken": approval.budget_token.as_deref().unwrap_or_default(),
            "criteriaValue": approval.criteria_value.to_string(),
            "budgetAmount": approval.budget_amount.unwrap_or_default().to_string(),
        }
    })
}

fn format_results(data: &ProposalData, results: &ProposalResults) -> Value {
    match data {
        ProposalData::Standard(_) => tally(
            results.for_votes,
            results.against_votes,
            results.abstain_votes,
        ),
        ProposalData::Approval(approval) => {
            let Value::Object(mut formatted) = tally(
                results.for_votes,
                results.against_votes,
                results.abstain_votes,
            ) else {
                return Value::Null;
            };
            let options: Vec<Value> = approval
                .options
                .iter()
                .map(|o| json!({ "option": o.title, "votes": o.votes.to_string() }))
                .collect();
            formatted.insert("options".to_string(), Value::Array(options));
            formatted.insert("criteria".to_string(), json!(approval.criteria.as_str()));
            formatted.insert(
                "criteriaValue".to_string(),
                json!(approval.criteria_value.to_string()),
            );
            Value::Object(formatted)
        }
        ProposalData::Hybrid(hybrid) => grouped_results(&hybrid.voting_groups),
    }
}

fn grouped_results(groups: &VotingGroups) -> Value {
    let formatted: Map<String, Value> = GroupName::ALL
        .iter()
        .map(|name| {
            let VotingGroup {
                for_votes,
                against_votes,
                abstain_votes,
                ..
            } = *groups.get(*name);
            (
                name.api_key().to_string(),
                tally(for_votes, against_votes, abstain_votes),
            )
        })
        .collect();
    Value::Object(formatted)
}

fn tally(for_votes: Amount, against_votes: Amount, abstain_votes: Amount) -> Value {
    json!({
        "for": for_votes.to_string(),
        "against": against_votes.to_string(),
        "abstain": abstain_votes.to_string(),
    })
}

fn decimal_strings(amounts: &[Amount]) -> Vec<String> {
    amounts.iter().map(Amount::to_string).collect()
}
