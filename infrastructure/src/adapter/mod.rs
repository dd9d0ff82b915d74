//! Record adapter: stored proposal rows in, API responses out.
//!
//! [`RecordAdapter`] turns [`RawProposalRecord`]s into [`ProposalPayload`]s
//! for the domain factory. [`ProposalResponse`] renders an evaluated proposal
//! in the outbound API shape.

pub mod data;
pub mod error;
pub mod hybrid;
pub mod record;
pub mod response;
pub mod results;

pub use error::{AdapterError, Result};
pub use record::{RawProposalRecord, load_records, parse_records};
pub use response::ProposalResponse;

use proposal_application::EngineConfig;
use proposal_domain::util::markdown_title;
use proposal_domain::{
    Amount, BaseType, ContextPayload, NumericInput, Proposal, ProposalFactory, ProposalPayload,
    ProposalType, TimelinePayload,
};
use record::{missing, numeric_is_set};
use results::{TallyLayout, transform_results};
use tracing::debug;

/// Converts stored rows under one engine configuration.
#[derive(Debug, Clone, Default)]
pub struct RecordAdapter {
    config: EngineConfig,
}

impl RecordAdapter {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Payload for one row. A row carrying `offchain_proposal` becomes the
    /// hybrid variant of its type.
    pub fn to_payload(&self, record: &RawProposalRecord) -> Result<ProposalPayload> {
        let id = record.record_id();
        let timeline = TimelinePayload {
            created_block: required(record, &record.created_block, "created_block")?,
            start_block: required(record, &record.start_block, "start_block")?,
            end_block: required(record, &record.end_block, "end_block")?,
            queued_block: record.queued_block.clone(),
            executed_block: record.executed_block.clone(),
            cancelled_block: record.cancelled_block.clone(),
        };
        let context = self.context_for(record);
        let votable_supply = self.votable_supply_for(record)?;

        let quorum_votes = match set_value(&record.quorum_votes) {
            Some(quorum) => quorum,
            None => NumericInput::from(self.config.default_quorum(votable_supply)?),
        };
        let approval_threshold = set_value(&record.approval_threshold)
            .unwrap_or_else(|| NumericInput::from(self.config.default_approval_threshold));

        let mut data = data::transform_data(&record.proposal_type, record.decoded_data());
        let raw_results = record.decoded_results();
        let layout = self.tally_layout(record, &timeline, &context)?;
        let mut results = transform_results(raw_results.clone(), &mut data, layout);

        let mut proposal_type = record.proposal_type.clone();
        if let Some(offchain) = record.offchain_proposal.as_deref() {
            if let Ok(onchain_type) = record.proposal_type.parse::<ProposalType>() {
                proposal_type = onchain_type.to_hybrid().as_str().to_string();
            }
            data = hybrid::combine_data(data, &raw_results, offchain);
            results = hybrid::combine_results(raw_results, offchain);
            debug!(
                id = %id,
                offchain = %offchain.record_id(),
                %proposal_type,
                "Combined hybrid record"
            );
        }

        Ok(ProposalPayload {
            id,
            proposal_number: record.proposal_number(),
            proposal_type,
            title: markdown_title(record.description.as_deref().unwrap_or_default()),
            description: record.description.clone().unwrap_or_default(),
            proposer: record.proposer.clone().unwrap_or_default(),
            data,
            results: Some(results),
            timeline,
            quorum_votes,
            approval_threshold,
            votable_supply: NumericInput::from(votable_supply),
            context,
        })
    }

    /// Build the proposal for one row.
    pub fn to_proposal(
        &self,
        factory: &ProposalFactory<'_>,
        record: &RawProposalRecord,
    ) -> Result<Proposal> {
        let payload = self.to_payload(record)?;
        Ok(factory.create_proposal(&payload)?)
    }

    /// Payloads for every row; failures stay per item.
    pub fn to_payloads(&self, records: &[RawProposalRecord]) -> Vec<Result<ProposalPayload>> {
        records.iter().map(|r| self.to_payload(r)).collect()
    }

    /// Proposals for every row; failures stay per item.
    pub fn to_proposals(
        &self,
        factory: &ProposalFactory<'_>,
        records: &[RawProposalRecord],
    ) -> Vec<Result<Proposal>> {
        records.iter().map(|r| self.to_proposal(factory, r)).collect()
    }

    /// Engine context with the row's own knobs taking precedence.
    fn context_for(&self, record: &RawProposalRecord) -> ContextPayload {
        let config = &self.config;
        let numeric = |own: &Option<NumericInput>, fallback: Option<Amount>| {
            set_value(own).or_else(|| fallback.map(NumericInput::from))
        };
        ContextPayload {
            tenant: config.tenant.clone(),
            calculation_options: record.calculation_options.or(config.calculation_options),
            delegate_quorum: numeric(&record.delegate_quorum, config.delegate_quorum),
            disapproval_threshold: record
                .disapproval_threshold
                .filter(|t| *t != 0)
                .or(config.disapproval_threshold),
            budget_change_date: numeric(&record.budget_change_date, config.budget_change_date),
            v6_upgrade_block: numeric(&record.v6_upgrade_block, config.v6_upgrade_block),
        }
    }

    fn votable_supply_for(&self, record: &RawProposalRecord) -> Result<Amount> {
        match set_value(&record.votable_supply) {
            Some(own) => Ok(own.to_amount("votable_supply")?),
            None => self
                .config
                .votable_supply
                .ok_or_else(|| missing(record, "votable_supply")),
        }
    }

    fn tally_layout(
        &self,
        record: &RawProposalRecord,
        timeline: &TimelinePayload,
        context: &ContextPayload,
    ) -> Result<TallyLayout> {
        let Ok(proposal_type) = record.proposal_type.parse::<ProposalType>() else {
            return Ok(TallyLayout::Current);
        };
        if proposal_type.base_type() != BaseType::Approval {
            return Ok(TallyLayout::Current);
        }
        let v6_upgrade_block = context
            .v6_upgrade_block
            .as_ref()
            .map(|b| b.to_amount("v6_upgrade_block"))
            .transpose()?;
        Ok(TallyLayout::for_proposal(
            &context.tenant,
            proposal_type.base_type(),
            timeline.start_block.to_amount("start_block")?,
            v6_upgrade_block,
        ))
    }
}

/// The row's own value unless it is absent, `0` or `""`.
fn set_value(value: &Option<NumericInput>) -> Option<NumericInput> {
    value.clone().filter(|n| numeric_is_set(Some(n)))
}

fn required(
    record: &RawProposalRecord,
    value: &Option<NumericInput>,
    field: &'static str,
) -> Result<NumericInput> {
    value.clone().ok_or_else(|| missing(record, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposal_domain::{ApprovalCriteria, GroupName, ProposalData, ProposalError, ProposalStatus};
    use serde_json::{Value, json};

    fn record(value: Value) -> RawProposalRecord {
        serde_json::from_value(value).unwrap()
    }

    fn adapter() -> RecordAdapter {
        RecordAdapter::new(EngineConfig::default().with_votable_supply(Amount::from(1_000_000u64)))
    }

    fn standard_row() -> Value {
        json!({
            "proposal_id": "101",
            "ordinal": 4,
            "proposal_type": "STANDARD",
            "description": "# Upgrade the bridge\n\nDetails",
            "proposer": "0xproposer",
            "proposal_data": "{\"targets\":[\"0xa\"],\"values\":[\"0\"],\"signatures\":[\"\"],\"calldatas\":[\"0x\"]}",
            "proposal_results": { "standard": ["1000", "50000", "200"] },
            "created_block": 90,
            "start_block": "100",
            "end_block": 200,
            "queued_block": null
        })
    }

    // ==================== Payloads ====================

    #[test]
    fn test_standard_row_payload() {
        let payload = adapter().to_payload(&record(standard_row())).unwrap();
        assert_eq!(payload.id, "101");
        assert_eq!(payload.proposal_number.as_deref(), Some("4"));
        assert_eq!(payload.title, "Upgrade the bridge");
        assert_eq!(payload.proposer, "0xproposer");
        assert_eq!(payload.data["targets"], json!(["0xa"]));
        let results = payload.results.as_ref().unwrap();
        assert_eq!(results["forVotes"], "50000");
        assert_eq!(results["againstVotes"], "1000");
        // 4% of the configured supply
        assert_eq!(payload.quorum_votes, NumericInput::from(Amount::from(40_000u64)));
        assert_eq!(payload.approval_threshold, NumericInput::from(Amount::from(5000u64)));
        assert_eq!(payload.context.tenant, "optimism");
    }

    #[test]
    fn test_row_values_take_precedence() {
        let mut row = standard_row();
        row["quorum_votes"] = json!("12345");
        row["approval_threshold"] = json!(7000);
        row["votable_supply"] = json!("500");
        row["calculation_options"] = json!(1);
        let payload = adapter().to_payload(&record(row)).unwrap();
        assert_eq!(payload.quorum_votes, NumericInput::from("12345"));
        assert_eq!(payload.approval_threshold, NumericInput::from(7000u64));
        assert_eq!(payload.votable_supply, NumericInput::from(Amount::from(500u64)));
        assert_eq!(payload.context.calculation_options, Some(1));
    }

    #[test]
    fn test_zero_quorum_falls_back_to_default() {
        let mut row = standard_row();
        row["quorum_votes"] = json!(0);
        let payload = adapter().to_payload(&record(row)).unwrap();
        assert_eq!(payload.quorum_votes, NumericInput::from(Amount::from(40_000u64)));
    }

    #[test]
    fn test_missing_columns() {
        let mut row = standard_row();
        row.as_object_mut().unwrap().remove("start_block");
        let err = adapter().to_payload(&record(row)).unwrap_err();
        assert!(matches!(err, AdapterError::MissingField { field: "start_block", .. }));

        let err = RecordAdapter::default()
            .to_payload(&record(standard_row()))
            .unwrap_err();
        assert!(matches!(err, AdapterError::MissingField { field: "votable_supply", .. }));
        assert_eq!(err.code(), "INVALID_RECORD");
    }

    // ==================== Proposals ====================

    #[test]
    fn test_oversized_row_threshold_is_rejected() {
        let mut row = standard_row();
        row["disapproval_threshold"] = json!(u64::MAX);
        let err = adapter()
            .to_proposal(&ProposalFactory::shared(), &record(row))
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Proposal(ProposalError::InvalidProposalData { .. })
        ));
        assert_eq!(err.code(), "INVALID_PROPOSAL_DATA");
    }

    #[test]
    fn test_standard_row_evaluates() {
        let proposal = adapter()
            .to_proposal(&ProposalFactory::shared(), &record(standard_row()))
            .unwrap();
        assert_eq!(proposal.proposal_type(), ProposalType::Standard);
        assert_eq!(proposal.results().for_votes, Amount::from(50_000u64));
        assert_eq!(
            proposal.status(Amount::from(201u64)).unwrap(),
            ProposalStatus::Succeeded
        );
    }

    #[test]
    fn test_approval_row_with_option_votes() {
        let row = json!({
            "proposal_id": "202",
            "proposal_type": "APPROVAL",
            "description": "Season 6 grants",
            "proposal_data": [
                [
                    [["0xa"], ["0"], ["0x"], "Grants"],
                    [["0xb"], ["0"], ["0x"], "Tooling"]
                ],
                [2, 0, "", 10, 0]
            ],
            "proposal_results": {
                "standard": ["0", "60000", "0"],
                "approval": [{ "param": "0", "votes": "45000" }, { "param": "1", "votes": "5000" }]
            },
            "created_block": 1,
            "start_block": 10,
            "end_block": 20
        });
        let proposal = adapter()
            .to_proposal(&ProposalFactory::shared(), &record(row))
            .unwrap();
        let ProposalData::Approval(approval) = proposal.data() else {
            panic!("expected approval data");
        };
        assert_eq!(approval.criteria, ApprovalCriteria::Threshold);
        assert_eq!(approval.criteria_value, 10);
        assert_eq!(approval.max_approvals, 2);
        assert_eq!(approval.options[0].votes, Amount::from(45_000u64));
        assert_eq!(approval.options[1].votes, Amount::from(5_000u64));
    }

    #[test]
    fn test_legacy_approval_results_before_upgrade() {
        let row = json!({
            "proposal_id": "203",
            "proposal_type": "APPROVAL",
            "proposal_data": { "options": [{ "title": "Only option" }] },
            "proposal_results": { "standard": ["800", "30"] },
            "created_block": 1,
            "start_block": 10,
            "end_block": 20,
            "v6_upgrade_block": 500
        });
        let payload = adapter().to_payload(&record(row)).unwrap();
        let results = payload.results.unwrap();
        assert_eq!(results["forVotes"], "800");
        assert_eq!(results["againstVotes"], 0);
        assert_eq!(results["abstainVotes"], "30");
    }

    #[test]
    fn test_hybrid_row() {
        let row = json!({
            "proposal_id": "303",
            "proposal_type": "STANDARD",
            "proposal_data": { "targets": ["0xa"], "values": ["0"], "signatures": [""], "calldatas": ["0x"] },
            "proposal_results": { "standard": ["10", "90", "0"] },
            "created_block": 1,
            "start_block": 10,
            "end_block": 20,
            "offchain_proposal": {
                "proposal_id": "0xbeef",
                "proposal_type": "OFFCHAIN_STANDARD",
                "proposal_data": {
                    "targets": ["0xa"], "values": ["0"], "signatures": [""], "calldatas": ["0x"]
                },
                "proposal_results": {
                    "APP": { "for": 150, "against": 10 },
                    "USER": { "for": 900, "against": 100 },
                    "CHAIN": { "for": 14, "against": 1 }
                }
            }
        });
        let proposal = adapter()
            .to_proposal(&ProposalFactory::shared(), &record(row))
            .unwrap();
        assert_eq!(proposal.proposal_type(), ProposalType::HybridStandard);
        let hybrid = proposal.data().as_hybrid().unwrap();
        assert_eq!(hybrid.offchain_proposal_id.as_deref(), Some("0xbeef"));
        let groups = &hybrid.voting_groups;
        assert_eq!(groups.get(GroupName::Delegates).for_votes, Amount::from(90u64));
        assert_eq!(groups.get(GroupName::Apps).for_votes, Amount::from(150u64));
        assert_eq!(groups.get(GroupName::Chains).against_votes, Amount::from(1u64));
        // grouped tallies are summed into the aggregate results
        assert_eq!(proposal.results().for_votes, Amount::from(1154u64));
    }

    #[test]
    fn test_batch_keeps_failures_per_item() {
        let mut broken = standard_row();
        broken["proposal_type"] = json!("RANKED");
        let records = vec![record(standard_row()), record(broken)];
        let built = adapter().to_proposals(&ProposalFactory::shared(), &records);
        assert!(built[0].is_ok());
        let err = built[1].as_ref().unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PROPOSAL_TYPE");

        let payloads = adapter().to_payloads(&records);
        assert!(payloads.iter().all(|p| p.is_ok()));
    }
}
