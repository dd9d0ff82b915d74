//! Stored `proposal_results` layouts.
//!
//! The indexer stores governor tallies as `{"standard": [against, for, abstain]}`
//! and approval option votes as `{"approval": [{"param": "0", "votes": "12"}]}`.
//! Approval proposals on the optimism governor that started before the v6
//! upgrade used a two-slot `[for, abstain]` layout.

use super::record::is_truthy;
use proposal_domain::{Amount, BaseType};
use serde_json::{Map, Value, json};

/// Which positions of the `standard` array hold which tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyLayout {
    /// `[against, for, abstain]`
    Current,
    /// `[for, abstain]`, no against bucket.
    LegacyApproval,
}

impl TallyLayout {
    /// Legacy layout applies to optimism approval proposals started before
    /// the v6 governor upgrade.
    pub fn for_proposal(
        tenant: &str,
        base: BaseType,
        start_block: Amount,
        v6_upgrade_block: Option<Amount>,
    ) -> Self {
        match v6_upgrade_block {
            Some(upgrade)
                if tenant == "optimism"
                    && base == BaseType::Approval
                    && !upgrade.is_zero()
                    && start_block < upgrade =>
            {
                TallyLayout::LegacyApproval
            }
            _ => TallyLayout::Current,
        }
    }

    /// `(for, against, abstain)` read from a `standard` array.
    pub fn read(&self, standard: &[Value]) -> (Value, Value, Value) {
        let slot = |i: usize| {
            standard
                .get(i)
                .filter(|v| is_truthy(v))
                .cloned()
                .unwrap_or(json!(0))
        };
        match self {
            TallyLayout::Current => (slot(1), slot(0), slot(2)),
            TallyLayout::LegacyApproval => (slot(0), json!(0), slot(1)),
        }
    }
}

/// `{for, against, abstain}` from the `standard` array of stored results,
/// `None` when the results carry no such array.
pub fn delegate_tally(raw: &Value, layout: TallyLayout) -> Option<Value> {
    let standard = raw.get("standard")?.as_array()?;
    let (for_votes, against, abstain) = layout.read(standard);
    Some(json!({ "for": for_votes, "against": against, "abstain": abstain }))
}

/// Rewrite stored results into `forVotes`/`againstVotes`/`abstainVotes`.
///
/// For approval data, option votes from the `approval` array are written
/// into `data.options[i].votes`, matched by the option index as a string.
/// Results already in domain shape pass through.
pub fn transform_results(raw: Value, data: &mut Value, layout: TallyLayout) -> Value {
    if let Some(entries) = raw.get("approval").and_then(Value::as_array) {
        fill_option_votes(data, entries);
    }

    let Some(standard) = raw.get("standard").and_then(Value::as_array) else {
        return raw;
    };
    let (for_votes, against, abstain) = layout.read(standard);

    let mut results = match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    results.insert("forVotes".to_string(), for_votes);
    results.insert("againstVotes".to_string(), against);
    results.insert("abstainVotes".to_string(), abstain);
    Value::Object(results)
}

fn fill_option_votes(data: &mut Value, entries: &[Value]) {
    let Some(options) = data.get_mut("options").and_then(Value::as_array_mut) else {
        return;
    };
    for (index, option) in options.iter_mut().enumerate() {
        let param = index.to_string();
        let votes = entries
            .iter()
            .find(|entry| match entry.get("param") {
                Some(Value::String(p)) => *p == param,
                Some(Value::Number(n)) => n.to_string() == param,
                _ => false,
            })
            .and_then(|entry| entry.get("votes"))
            .filter(|v| is_truthy(v))
            .cloned()
            .unwrap_or(json!(0));
        if let Some(option) = option.as_object_mut() {
            option.insert("votes".to_string(), votes);
        }
    }
}
