//! Approval (multi-choice) voting with optional budget allocation.

use super::base::{calculation_error, invalid, is_blank, small_number};
use crate::core::amount::{Amount, amount_or_zero, checked_mul, checked_sum};
use crate::core::error::{ArithmeticError, ProposalError};
use crate::core::percentage::{Percentage, safe_percentage};
use crate::proposal::{
    ApprovalCriteria, ApprovalData, ApprovalMetrics, ApprovalOption, BudgetUtilization,
    MetricsDetail, Proposal, ProposalData, ProposalMetrics, ProposalStatus, Transaction,
    TransactionKind,
};
use serde_json::Value;

const LABEL: &str = "APPROVAL";

pub fn parse_data(raw: &Value) -> Result<ApprovalData, ProposalError> {
    let Some(Value::Array(raw_options)) = raw.get("options") else {
        return Err(ProposalError::invalid_data(
            LABEL,
            "Missing or invalid options array",
        ));
    };

    let options = raw_options
        .iter()
        .enumerate()
        .map(|(index, opt)| parse_option(index, opt))
        .collect::<Result<Vec<_>, _>>()?;

    let criteria = match raw.get("criteria").and_then(Value::as_str) {
        Some("TOP_CHOICES") => ApprovalCriteria::TopChoices,
        _ => ApprovalCriteria::Threshold,
    };

    let budget_amount =
        amount_or_zero(raw.get("budgetAmount"), "budgetAmount").map_err(invalid(LABEL))?;

    Ok(ApprovalData {
        options,
        max_approvals: small_number(raw.get("maxApprovals"), "maxApprovals", 1)
            .map_err(invalid(LABEL))?,
        criteria,
        criteria_value: small_number(raw.get("criteriaValue"), "criteriaValue", 0)
            .map_err(invalid(LABEL))?,
        budget_token: optional_string(raw.get("budgetToken")),
        budget_amount: (!budget_amount.is_zero()).then_some(budget_amount),
    })
}

fn parse_option(index: usize, raw: &Value) -> Result<ApprovalOption, ProposalError> {
    let title = match raw.get("title") {
        Some(Value::String(t)) if !t.is_empty() => t.clone(),
        _ => {
            return Err(ProposalError::invalid_data(
                LABEL,
                format!("Option at index {index} missing title"),
            ));
        }
    };

    let transactions = match raw.get("transactions") {
        Some(Value::Array(txs)) => txs
            .iter()
            .enumerate()
            .map(|(i, tx)| parse_transaction(i, tx))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    let budget_tokens_spent = if is_blank(raw.get("budgetTokensSpent")) {
        None
    } else {
        Some(amount_or_zero(raw.get("budgetTokensSpent"), "budgetTokensSpent").map_err(invalid(LABEL))?)
    };

    Ok(ApprovalOption {
        title,
        transactions,
        votes: amount_or_zero(raw.get("votes"), "votes").map_err(invalid(LABEL))?,
        budget_tokens_spent,
    })
}

fn parse_transaction(index: usize, raw: &Value) -> Result<Transaction, ProposalError> {
    let Some(target) = optional_string(raw.get("target")) else {
        return Err(ProposalError::invalid_data(
            LABEL,
            format!("Transaction at index {index} missing target"),
        ));
    };

    let amount = if is_blank(raw.get("amount")) {
        None
    } else {
        Some(amount_or_zero(raw.get("amount"), "amount").map_err(invalid(LABEL))?)
    };

    Ok(Transaction {
        kind: match raw.get("type").and_then(Value::as_str) {
            Some("TRANSFER") => TransactionKind::Transfer,
            _ => TransactionKind::Custom,
        },
        target,
        value: amount_or_zero(raw.get("value"), "value").map_err(invalid(LABEL))?,
        calldata: optional_string(raw.get("calldata")).unwrap_or_else(|| "0x".to_string()),
        signature: optional_string(raw.get("signature")),
        token: optional_string(raw.get("token")),
        recipient: optional_string(raw.get("recipient")),
        amount,
    })
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn validate(data: &ProposalData) -> bool {
    let ProposalData::Approval(data) = data else {
        return false;
    };
    if data.options.is_empty() {
        return false;
    }
    if data.options.iter().any(|o| o.title.trim().is_empty()) {
        return false;
    }
    if data.max_approvals < 1 {
        return false;
    }
    match data.criteria {
        ApprovalCriteria::TopChoices => data.criteria_value >= 1,
        ApprovalCriteria::Threshold => data.criteria_value <= 100,
    }
}

/// Options ordered by votes, highest first; ties keep input order.
pub fn rank_options(options: &[ApprovalOption]) -> Vec<&ApprovalOption> {
    let mut ranked: Vec<&ApprovalOption> = options.iter().collect();
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
    ranked
}

/// Winning options under the proposal's criteria, in ranked order.
pub fn select_winners<'a>(
    data: &'a ApprovalData,
    total_votes: Amount,
) -> Result<Vec<&'a ApprovalOption>, ArithmeticError> {
    let ranked = rank_options(&data.options);
    match data.criteria {
        ApprovalCriteria::TopChoices => {
            let n = usize::try_from(data.criteria_value).unwrap_or(usize::MAX);
            Ok(ranked.into_iter().take(n).collect())
        }
        ApprovalCriteria::Threshold => {
            let mut winners = Vec::new();
            for option in ranked {
                if meets_threshold(option.votes, total_votes, data.criteria_value)? {
                    winners.push(option);
                }
            }
            Ok(winners)
        }
    }
}

/// `votes / total >= threshold%`, exact. With no votes cast the share is zero.
fn meets_threshold(votes: Amount, total: Amount, threshold: u64) -> Result<bool, ArithmeticError> {
    if total.is_zero() {
        return Ok(threshold == 0);
    }
    let lhs = checked_mul(votes, Amount::from(100u64), "option share")?;
    let rhs = checked_mul(Amount::from(threshold), total, "option share")?;
    Ok(lhs >= rhs)
}

fn budget_utilization(
    proposal: &Proposal,
    data: &ApprovalData,
    winners: &[&ApprovalOption],
) -> Result<BudgetUtilization, ArithmeticError> {
    let Some(budget) = data.budget_amount.filter(|b| !b.is_zero()) else {
        return Ok(BudgetUtilization::NoBudget);
    };

    if proposal
        .context()
        .budget_change_date
        .is_some_and(|change| proposal.timeline().created_block < change)
    {
        return Ok(BudgetUtilization::LegacyUnavailable);
    }

    let spent = winners
        .iter()
        .map(|o| o.transfer_total().ok_or(ArithmeticError::Overflow("option transfers")))
        .collect::<Result<Vec<_>, _>>()?;
    let spent = checked_sum(spent, "budget spent")?;
    Ok(BudgetUtilization::Computed(safe_percentage(spent, budget)?))
}

pub fn calculate_metrics(proposal: &Proposal) -> Result<ProposalMetrics, ProposalError> {
    let ProposalData::Approval(data) = proposal.data() else {
        return Err(ProposalError::invalid_data(LABEL, "Proposal data is not approval data"));
    };
    approval_metrics(proposal, data)
}

pub(crate) fn approval_metrics(
    proposal: &Proposal,
    data: &ApprovalData,
) -> Result<ProposalMetrics, ProposalError> {
    let wrap = calculation_error(proposal, "approval metrics");

    let total_votes =
        checked_sum(data.options.iter().map(|o| o.votes), "option votes").map_err(&wrap)?;
    let winners = select_winners(data, total_votes).map_err(&wrap)?;
    let budget = budget_utilization(proposal, data, &winners).map_err(&wrap)?;
    let titles: Vec<String> = winners.iter().map(|o| o.title.clone()).collect();

    Ok(ProposalMetrics {
        quorum_met: total_votes >= proposal.quorum_votes(),
        approval_met: !winners.is_empty(),
        participation_rate: safe_percentage(total_votes, proposal.votable_supply())
            .map_err(&wrap)?,
        approval_rate: Percentage::ZERO,
        detail: MetricsDetail::Approval(ApprovalMetrics {
            top_options: titles.clone(),
            options_meeting_criteria: titles,
            budget_utilization: budget,
            total_option_votes: total_votes,
        }),
    })
}

pub fn ended_status(metrics: &ProposalMetrics) -> ProposalStatus {
    if metrics.quorum_met && metrics.approval_met {
        ProposalStatus::Succeeded
    } else {
        ProposalStatus::Defeated
    }
}
