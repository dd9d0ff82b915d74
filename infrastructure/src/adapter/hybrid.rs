//! Joining an on-chain row with its off-chain twin.
//!
//! The combined data keeps both halves (`onchainData`, `offchainData`) and
//! builds `votingGroups`: delegate tallies from the on-chain results, app,
//! user and chain tallies from the off-chain row. The combined results carry
//! the grouped `DELEGATES`/`APP`/`USER`/`CHAIN` shape the hybrid strategy sums.

use super::data::transform_data;
use super::record::RawProposalRecord;
use super::results::{TallyLayout, delegate_tally};
use serde_json::{Map, Value, json};

const OFFCHAIN_GROUPS: [(&str, &str); 3] = [("apps", "APP"), ("users", "USER"), ("chains", "CHAIN")];

/// Hybrid data from transformed on-chain data, the raw on-chain results and
/// the off-chain twin.
pub fn combine_data(onchain: Value, onchain_results: &Value, offchain: &RawProposalRecord) -> Value {
    let raw_offchain = offchain.decoded_data();
    let offchain_results = offchain.decoded_results();
    let offchain_data = transform_data(&offchain.proposal_type, raw_offchain.clone());

    let mut combined = Map::new();
    combined.insert("onchainData".to_string(), onchain.clone());
    combined.insert("offchainData".to_string(), offchain_data);
    combined.insert("offchainProposalId".to_string(), json!(offchain.record_id()));
    combined.insert(
        "onchain_proposalid".to_string(),
        raw_offchain.get("onchain_proposalid").cloned().unwrap_or(Value::Null),
    );
    if let Value::Object(fields) = onchain {
        combined.extend(fields);
    }
    if let Some(tiers) = raw_offchain.get("tiers") {
        combined.insert("tiers".to_string(), tiers.clone());
    }

    let mut groups = Map::new();
    groups.insert(
        "delegates".to_string(),
        delegate_tally(onchain_results, TallyLayout::Current).unwrap_or_else(|| json!({})),
    );
    for (key, api_key) in OFFCHAIN_GROUPS {
        groups.insert(
            key.to_string(),
            group_tally(&raw_offchain, key)
                .or_else(|| group_tally(&offchain_results, api_key))
                .unwrap_or_else(|| json!({})),
        );
    }
    combined.insert("votingGroups".to_string(), Value::Object(groups));
    Value::Object(combined)
}

/// Grouped hybrid results from the raw on-chain results and the off-chain twin.
pub fn combine_results(onchain_results: Value, offchain: &RawProposalRecord) -> Value {
    let offchain_results = offchain.decoded_results();

    let mut combined = Map::new();
    combined.insert("onchain".to_string(), onchain_results.clone());
    combined.insert(
        "DELEGATES".to_string(),
        delegate_tally(&onchain_results, TallyLayout::Current).unwrap_or_else(|| json!({})),
    );
    for (_, api_key) in OFFCHAIN_GROUPS {
        combined.insert(
            api_key.to_string(),
            group_tally(&offchain_results, api_key).unwrap_or_else(|| json!({})),
        );
    }
    if let Value::Object(fields) = onchain_results {
        combined.extend(fields);
    }
    combined.insert("offchain".to_string(), offchain_results);
    Value::Object(combined)
}

fn group_tally(source: &Value, key: &str) -> Option<Value> {
    source.get(key).filter(|v| v.is_object()).cloned()
}
