//! Stored proposal rows as read from the indexer database.
//!
//! Rows are loosely typed: ids arrive as numbers or strings, `proposal_data`
//! may be an object or a JSON-encoded string, and falsy values (`0`, `""`,
//! `null`) mean "not set" for the optional numeric columns.

use super::error::{AdapterError, Result};
use proposal_domain::NumericInput;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// One row of the proposals table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProposalRecord {
    #[serde(default)]
    pub proposal_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub ordinal: Option<Value>,
    pub proposal_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub proposer: Option<String>,
    #[serde(default)]
    pub proposal_data: Option<Value>,
    #[serde(default)]
    pub proposal_results: Option<Value>,

    #[serde(default)]
    pub created_block: Option<NumericInput>,
    #[serde(default)]
    pub start_block: Option<NumericInput>,
    #[serde(default)]
    pub end_block: Option<NumericInput>,
    #[serde(default)]
    pub queued_block: Option<NumericInput>,
    #[serde(default)]
    pub executed_block: Option<NumericInput>,
    #[serde(default)]
    pub cancelled_block: Option<NumericInput>,

    #[serde(default)]
    pub quorum_votes: Option<NumericInput>,
    #[serde(default)]
    pub approval_threshold: Option<NumericInput>,
    #[serde(default)]
    pub votable_supply: Option<NumericInput>,

    // Per-row tenant knobs; each overrides the engine config when set.
    #[serde(default)]
    pub calculation_options: Option<u8>,
    #[serde(default)]
    pub delegate_quorum: Option<NumericInput>,
    #[serde(default)]
    pub disapproval_threshold: Option<u64>,
    #[serde(default)]
    pub budget_change_date: Option<NumericInput>,
    #[serde(default)]
    pub v6_upgrade_block: Option<NumericInput>,

    /// Off-chain twin; its presence turns the row into a hybrid proposal.
    #[serde(default)]
    pub offchain_proposal: Option<Box<RawProposalRecord>>,
}

impl RawProposalRecord {
    /// `proposal_id`, falling back to `id`. Empty when neither is set.
    pub fn record_id(&self) -> String {
        [&self.proposal_id, &self.id]
            .into_iter()
            .flatten()
            .filter(|v| is_truthy(v))
            .find_map(value_to_string)
            .unwrap_or_default()
    }

    pub fn proposal_number(&self) -> Option<String> {
        self.ordinal.as_ref().and_then(value_to_string)
    }

    /// `proposal_data` decoded to JSON. Undecodable data becomes `{}`.
    pub fn decoded_data(&self) -> Value {
        decode_json_field(self.proposal_data.as_ref(), "proposal_data", &self.record_id())
    }

    /// `proposal_results` decoded to JSON. Undecodable results become `{}`.
    pub fn decoded_results(&self) -> Value {
        decode_json_field(
            self.proposal_results.as_ref(),
            "proposal_results",
            &self.record_id(),
        )
    }
}

/// Read a JSON array of records from `path`.
pub fn load_records(path: &Path) -> Result<Vec<RawProposalRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}

/// Parse a JSON array of records, or a single record object.
pub fn parse_records(content: &str) -> Result<Vec<RawProposalRecord>> {
    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

/// Present and not one of `null`, `false`, `0` or `""`.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub(crate) fn numeric_is_set(input: Option<&NumericInput>) -> bool {
    match input {
        None => false,
        Some(NumericInput::Integer(n)) => *n != 0,
        Some(NumericInput::Text(s)) => !s.is_empty(),
    }
}

/// Array value, or a comma-separated string split into trimmed parts.
pub(crate) fn ensure_array(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_json_field(raw: Option<&Value>, field: &str, id: &str) -> Value {
    match raw {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(Value::String(s)) if s.trim().is_empty() => Value::Object(Default::default()),
        Some(Value::String(s)) => serde_json::from_str(s).unwrap_or_else(|e| {
            warn!(id, "Failed to parse {field}: {e}");
            Value::Object(Default::default())
        }),
        Some(v @ (Value::Object(_) | Value::Array(_))) => v.clone(),
        Some(other) => {
            warn!(id, "{field} is neither object nor string: {other}");
            Value::Object(Default::default())
        }
    }
}

pub(crate) fn missing(record: &RawProposalRecord, field: &'static str) -> AdapterError {
    AdapterError::MissingField {
        id: record.record_id(),
        field,
    }
}
