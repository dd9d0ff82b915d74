//! Behavior shared by every strategy: the lifecycle state machine, raw field
//! parsing and result-shape detection.

use crate::core::amount::{Amount, amount_or_zero, checked_sum, first_amount, parse_amount_str};
use crate::core::error::{AmountError, ArithmeticError, ProposalError};
use crate::proposal::{GroupName, Proposal, ProposalResults, ProposalStatus};
use serde_json::Value;

/// Where a proposal sits on its timeline before tallies are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    Settled(ProposalStatus),
    /// Voting closed; the strategy decides from its metrics.
    Ended,
}

/// Checked in fixed order; the first match wins.
pub fn timeline_state(proposal: &Proposal, current_block: Amount) -> TimelineState {
    if proposal.is_cancelled() {
        return TimelineState::Settled(ProposalStatus::Cancelled);
    }
    if proposal.is_executed() {
        return TimelineState::Settled(ProposalStatus::Executed);
    }
    if proposal.is_queued() {
        return TimelineState::Settled(ProposalStatus::Queued);
    }
    if proposal.is_active(current_block) {
        return TimelineState::Settled(ProposalStatus::Active);
    }
    if current_block < proposal.timeline().start_block {
        return TimelineState::Settled(ProposalStatus::Pending);
    }
    if proposal.has_ended(current_block) {
        return TimelineState::Ended;
    }
    TimelineState::Settled(ProposalStatus::Pending)
}

/// Wrap an arithmetic failure with the proposal id and calculation name.
pub(crate) fn calculation_error<'a>(
    proposal: &'a Proposal,
    calculation: &'static str,
) -> impl Fn(ArithmeticError) -> ProposalError + 'a {
    move |cause| ProposalError::Calculation {
        id: proposal.id().to_string(),
        calculation,
        cause,
    }
}

pub(crate) fn invalid<E: std::fmt::Display>(label: &str) -> impl Fn(E) -> ProposalError + '_ {
    move |e| ProposalError::invalid_data(label, e.to_string())
}

/// Tenant-selected votes that count toward quorum.
pub fn participation_votes(proposal: &Proposal) -> Result<Amount, ArithmeticError> {
    proposal
        .context()
        .participation_rule()
        .count_results(proposal.results())
}

/// Absent and falsy values mean "not set".
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Array field that may also arrive as a comma-separated string.
pub fn parse_string_array(
    value: Option<&Value>,
    field: &str,
    label: &str,
) -> Result<Vec<String>, ProposalError> {
    if is_blank(value) {
        return Ok(Vec::new());
    }
    match value {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()),
        Some(Value::String(s)) if s.contains(',') => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok(if s.is_empty() { Vec::new() } else { vec![s.to_string()] })
        }
        _ => Err(ProposalError::invalid_data(
            label,
            format!("Invalid {field} format"),
        )),
    }
}

pub fn parse_amount_array(
    value: Option<&Value>,
    field: &str,
    label: &str,
) -> Result<Vec<Amount>, ProposalError> {
    parse_string_array(value, field, label)?
        .iter()
        .map(|v| parse_amount_str(v, field).map_err(invalid(label)))
        .collect()
}

/// Small integer setting where absent or zero falls back to `default`.
pub(crate) fn small_number(
    value: Option<&Value>,
    field: &str,
    default: u64,
) -> Result<u64, AmountError> {
    let n = amount_or_zero(value, field)?;
    if n.is_zero() {
        return Ok(default);
    }
    if n > Amount::from(u64::MAX) {
        return Err(AmountError::TooLarge {
            field: field.to_string(),
        });
    }
    Ok(n.low_u64())
}

/// Whether `data` describes a hybrid proposal or links to an off-chain twin.
pub fn is_hybrid_data(data: &Value) -> bool {
    ["onchainData", "offchainData", "votingGroups", "onchain_proposalid"]
        .iter()
        .any(|key| !is_blank(data.get(key)))
}

/// Default tally lookup: `forVotes` / `for_votes` and friends. A missing
/// total is the sum of the three buckets.
pub fn standard_results(raw: &Value) -> Result<ProposalResults, ParseFailure> {
    let for_votes = first_amount(raw, &["forVotes", "for_votes"])?;
    let against_votes = first_amount(raw, &["againstVotes", "against_votes"])?;
    let abstain_votes = first_amount(raw, &["abstainVotes", "abstain_votes"])?;
    let total_votes = first_amount(raw, &["totalVotes", "total_votes"])?;

    let mut results = ProposalResults::from_tallies(for_votes, against_votes, abstain_votes)?;
    if !total_votes.is_zero() {
        results.total_votes = total_votes;
    }
    Ok(results)
}

/// Sum hybrid tallies from either the grouped API shape
/// (`DELEGATES`/`APP`/`USER`/`CHAIN`) or a `votingGroups` object, falling
/// back to [`standard_results`].
pub fn combine_hybrid_results(
    raw: &Value,
    data: Option<&Value>,
) -> Result<ProposalResults, ParseFailure> {
    if GroupName::ALL.iter().any(|g| !is_blank(raw.get(g.api_key()))) {
        let groups: Vec<&Value> = GroupName::ALL
            .iter()
            .filter_map(|g| raw.get(g.api_key()))
            .collect();
        return sum_groups(&groups, ["for", "forVotes"], ["against", "againstVotes"], [
            "abstain",
            "abstainVotes",
        ]);
    }

    let voting_groups = raw
        .get("votingGroups")
        .filter(|v| !is_blank(Some(*v)))
        .or_else(|| {
            data.and_then(|d| d.get("votingGroups"))
                .filter(|v| !is_blank(Some(*v)))
        });
    if let Some(Value::Object(groups)) = voting_groups {
        let groups: Vec<&Value> = groups.values().collect();
        return sum_groups(&groups, ["forVotes", "for"], ["againstVotes", "against"], [
            "abstainVotes",
            "abstain",
        ]);
    }

    standard_results(raw)
}

fn sum_groups(
    groups: &[&Value],
    for_keys: [&str; 2],
    against_keys: [&str; 2],
    abstain_keys: [&str; 2],
) -> Result<ProposalResults, ParseFailure> {
    let mut fors = Vec::with_capacity(groups.len());
    let mut againsts = Vec::with_capacity(groups.len());
    let mut abstains = Vec::with_capacity(groups.len());
    for group in groups {
        fors.push(first_amount(group, &for_keys)?);
        againsts.push(first_amount(group, &against_keys)?);
        abstains.push(first_amount(group, &abstain_keys)?);
    }
    Ok(ProposalResults::from_tallies(
        checked_sum(fors, "for votes")?,
        checked_sum(againsts, "against votes")?,
        checked_sum(abstains, "abstain votes")?,
    )?)
}

/// Result-parsing entry point for the non-hybrid strategies.
pub fn parse_results(
    raw: &Value,
    data: Option<&Value>,
    label: &str,
) -> Result<ProposalResults, ProposalError> {
    let parsed = match data {
        Some(d) if is_hybrid_data(d) => combine_hybrid_results(raw, data),
        _ => standard_results(raw),
    };
    parsed.map_err(invalid(label))
}

/// Failure while reading raw tallies.
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_array_shapes() {
        let label = "STANDARD";
        assert_eq!(
            parse_string_array(Some(&json!(["0xa", "0xb"])), "targets", label).unwrap(),
            vec!["0xa", "0xb"]
        );
        assert_eq!(
            parse_string_array(Some(&json!("0xa, 0xb,")), "targets", label).unwrap(),
            vec!["0xa", "0xb"]
        );
        assert_eq!(
            parse_string_array(Some(&json!(" 0xa ")), "targets", label).unwrap(),
            vec!["0xa"]
        );
        assert!(parse_string_array(None, "targets", label).unwrap().is_empty());
        let err = parse_string_array(Some(&json!({ "a": 1 })), "targets", label).unwrap_err();
        assert_eq!(err, ProposalError::invalid_data("STANDARD", "Invalid targets format"));
    }

    #[test]
    fn test_parse_amount_array_rejects_garbage() {
        assert_eq!(
            parse_amount_array(Some(&json!([1, "2"])), "values", "STANDARD").unwrap(),
            vec![Amount::from(1u64), Amount::from(2u64)]
        );
        let err = parse_amount_array(Some(&json!(["x"])), "values", "STANDARD").unwrap_err();
        assert_eq!(err.code(), "INVALID_PROPOSAL_DATA");
    }

    #[test]
    fn test_standard_results_key_fallback() {
        let r = standard_results(&json!({ "for_votes": "7", "againstVotes": 3 })).unwrap();
        assert_eq!(r.for_votes, Amount::from(7u64));
        assert_eq!(r.against_votes, Amount::from(3u64));
        assert_eq!(r.total_votes, Amount::from(10u64));

        let explicit = standard_results(&json!({ "forVotes": 1, "totalVotes": 99 })).unwrap();
        assert_eq!(explicit.total_votes, Amount::from(99u64));
    }

    #[test]
    fn test_hybrid_detection() {
        assert!(is_hybrid_data(&json!({ "votingGroups": {} })));
        assert!(is_hybrid_data(&json!({ "onchain_proposalid": "12" })));
        assert!(!is_hybrid_data(&json!({ "onchainData": null, "targets": [] })));
    }

    #[test]
    fn test_grouped_api_results_are_summed() {
        let raw = json!({
            "DELEGATES": { "for": "100", "against": "10", "abstain": "1" },
            "APP": { "for": 5, "against": 1 },
            "USER": { "forVotes": 20 },
            "CHAIN": {}
        });
        let r = combine_hybrid_results(&raw, None).unwrap();
        assert_eq!(r.for_votes, Amount::from(125u64));
        assert_eq!(r.against_votes, Amount::from(11u64));
        assert_eq!(r.abstain_votes, Amount::from(1u64));
        assert_eq!(r.total_votes, Amount::from(137u64));
    }

    #[test]
    fn test_voting_groups_from_data_are_summed() {
        let data = json!({
            "votingGroups": {
                "delegates": { "forVotes": 10, "againstVotes": 2 },
                "apps": { "forVotes": 3, "abstainVotes": 4 }
            }
        });
        let r = parse_results(&json!({}), Some(&data), "STANDARD").unwrap();
        assert_eq!(r.for_votes, Amount::from(13u64));
        assert_eq!(r.against_votes, Amount::from(2u64));
        assert_eq!(r.abstain_votes, Amount::from(4u64));
    }

    #[test]
    fn test_small_number_defaults() {
        assert_eq!(small_number(None, "maxApprovals", 1).unwrap(), 1);
        assert_eq!(small_number(Some(&json!(0)), "maxApprovals", 1).unwrap(), 1);
        assert_eq!(small_number(Some(&json!("3")), "maxApprovals", 1).unwrap(), 3);
    }
}
