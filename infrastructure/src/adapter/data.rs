//! Stored `proposal_data` layouts rewritten into the shapes the domain
//! strategies parse.
//!
//! | Family | Stored layout | Domain shape |
//! |--------|---------------|--------------|
//! | Standard | `{targets, values, signatures, calldatas}` | same, arrays |
//! | Approval | `[[option...], [settings...]]` | `{options, maxApprovals, criteria, ...}` |
//! | Optimistic | transaction arrays, often empty | arrays |
//!
//! Malformed rows degrade to an empty payload with a warning; the strategy's
//! own validation then decides whether the proposal can be built.

use super::record::{ensure_array, is_truthy};
use proposal_domain::{BaseType, ProposalType};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

const TRANSACTION_FIELDS: [&str; 4] = ["targets", "values", "signatures", "calldatas"];

/// Rewrite decoded `proposal_data` for the family of `proposal_type`.
///
/// Unknown types keep their data; the factory rejects them later.
pub fn transform_data(proposal_type: &str, data: Value) -> Value {
    match proposal_type.parse::<ProposalType>() {
        Ok(t) => match t.base_type() {
            BaseType::Standard => standard_data(&data),
            BaseType::Approval => approval_data(&data),
            BaseType::Optimistic => transaction_arrays(&data),
        },
        Err(_) => {
            debug!(proposal_type, "Unknown proposal type, keeping raw data");
            data
        }
    }
}

/// All four arrays must be present, otherwise the batch is empty.
fn standard_data(data: &Value) -> Value {
    if TRANSACTION_FIELDS
        .iter()
        .all(|field| data.get(field).is_some_and(is_truthy))
    {
        transaction_arrays(data)
    } else {
        transaction_arrays(&Value::Null)
    }
}

fn transaction_arrays(data: &Value) -> Value {
    let fields: Map<String, Value> = TRANSACTION_FIELDS
        .iter()
        .map(|field| (field.to_string(), Value::Array(ensure_array(data.get(field)))))
        .collect();
    Value::Object(fields)
}

fn empty_approval() -> Value {
    json!({
        "options": [],
        "maxApprovals": 1,
        "criteria": "THRESHOLD",
        "criteriaValue": 0,
        "budgetToken": "",
        "budgetAmount": 0,
    })
}

fn approval_data(data: &Value) -> Value {
    if let Value::Array(parts) = data
        && parts.len() >= 2
    {
        return nested_approval(&parts[0], &parts[1]);
    }

    if data.get("options").is_some_and(Value::is_array) {
        return data.clone();
    }

    // Off-chain approval rows list bare choice titles.
    if let Some(choices) = data.get("choices").and_then(Value::as_array) {
        let mut approval = empty_approval();
        approval["options"] = choices
            .iter()
            .enumerate()
            .map(|(index, choice)| {
                let title = choice
                    .as_str()
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| default_title(index));
                json!({ "title": title, "transactions": [], "votes": 0 })
            })
            .collect();
        return approval;
    }

    let preview: String = data.to_string().chars().take(200).collect();
    warn!("Unexpected approval data format: {preview}");
    empty_approval()
}

fn nested_approval(options: &Value, settings: &Value) -> Value {
    let empty = Vec::new();
    let options = match options {
        Value::Array(items) => items,
        Value::Null => &empty,
        other => {
            warn!("Approval options are not an array: {other}");
            return empty_approval();
        }
    };
    let settings = settings.as_array().unwrap_or(&empty);
    let setting = |i: usize| settings.get(i).filter(|v| is_truthy(v));

    let criteria = match setting(1) {
        Some(v) if v.as_u64() == Some(1) || v.as_str() == Some("1") => "TOP_CHOICES",
        _ => "THRESHOLD",
    };

    json!({
        "options": options.iter().enumerate().map(|(i, o)| approval_option(i, o)).collect::<Vec<_>>(),
        "maxApprovals": setting(0).cloned().unwrap_or(json!(1)),
        "criteria": criteria,
        "budgetToken": setting(2).cloned().unwrap_or(json!("")),
        "criteriaValue": setting(3).cloned().unwrap_or(json!(0)),
        "budgetAmount": setting(4).cloned().unwrap_or(json!(0)),
    })
}

/// `[targets, values, calldatas, description]`, optionally preceded by
/// `budgetTokensSpent`.
fn approval_option(index: usize, raw: &Value) -> Value {
    let parts = match raw.as_array() {
        Some(parts) if parts.len() >= 4 => parts,
        _ => {
            warn!(index, "Approval option has invalid format: {raw}");
            return json!({ "title": default_title(index), "transactions": [], "votes": 0 });
        }
    };
    let (budget_spent, rest) = if parts.len() == 4 {
        (None, &parts[..])
    } else {
        (Some(&parts[0]), &parts[1..])
    };

    let targets = ensure_array(rest.first());
    let values = ensure_array(rest.get(1));
    let calldatas = ensure_array(rest.get(2));
    let transactions: Vec<Value> = targets
        .into_iter()
        .enumerate()
        .map(|(i, target)| {
            let pick = |items: &[Value], fallback: &str| {
                items
                    .get(i)
                    .filter(|v| is_truthy(v))
                    .cloned()
                    .unwrap_or_else(|| json!(fallback))
            };
            json!({
                "type": "CUSTOM",
                "target": target,
                "value": pick(&values, "0"),
                "calldata": pick(&calldatas, "0x"),
                "signature": "",
            })
        })
        .collect();

    let title = rest
        .get(3)
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_title(index));

    json!({
        "title": title,
        "transactions": transactions,
        "votes": 0,
        "budgetTokensSpent": budget_spent.filter(|v| is_truthy(v)).cloned().unwrap_or(json!(0)),
    })
}

fn default_title(index: usize) -> String {
    format!("Option {}", index + 1)
}
