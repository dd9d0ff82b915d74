//! Console output formatter for evaluation reports

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use proposal_application::{Evaluation, EvaluationReport};
use proposal_domain::{
    ApprovalMetrics, BudgetUtilization, HybridMetrics, MetricsDetail, OptimisticMetrics,
    ProposalStatus, TieredMetrics,
};
use serde_json::{Value, json};

/// Formats evaluation reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Status and every metric per proposal
    pub fn format_full(report: &EvaluationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Proposal Evaluation"));
        output.push('\n');
        if let Some(block) = Self::block(report) {
            output.push_str(&format!("{} {}\n", "Block:".cyan().bold(), block));
        }

        for evaluation in &report.evaluations {
            output.push_str(&Self::format_evaluation(evaluation));
        }

        if !report.failures.is_empty() {
            output.push_str(&Self::section_header("Failures"));
            output.push_str(&Self::failure_lines(report));
        }

        output.push_str(&Self::totals(report));
        output.push_str(&Self::footer());
        output
    }

    /// One line per proposal
    pub fn format_summary(report: &EvaluationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n",
            "=== Proposal Evaluation ===".cyan().bold()
        ));
        if let Some(block) = Self::block(report) {
            output.push_str(&format!("{} {}\n", "Block:".dimmed(), block));
        }
        output.push('\n');

        for evaluation in &report.evaluations {
            let proposal = &evaluation.proposal;
            output.push_str(&format!(
                "{} {} {} {}\n",
                format!("{:<14}", Self::short_id(proposal.id().as_str())).bold(),
                format!("{:<26}", proposal.proposal_type().as_str()).dimmed(),
                Self::status_label(evaluation.status),
                proposal.title()
            ));
        }
        if !report.failures.is_empty() {
            output.push('\n');
            output.push_str(&Self::failure_lines(report));
        }

        output.push_str(&Self::totals(report));
        output
    }

    /// JSON document with the block, proposal responses and failures
    pub fn format_json(report: &EvaluationReport, proposals: &Value) -> String {
        let failures: Vec<Value> = report
            .failures
            .iter()
            .map(|f| {
                json!({
                    "id": f.id,
                    "code": f.error.code(),
                    "message": f.error.to_string(),
                })
            })
            .collect();
        let document = json!({
            "block": Self::block(report),
            "proposals": proposals,
            "failures": failures,
        });
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_evaluation(evaluation: &Evaluation) -> String {
        let proposal = &evaluation.proposal;
        let metrics = &evaluation.metrics;
        let results = proposal.results();
        let timeline = proposal.timeline();
        let mut output = String::new();

        let title = if proposal.title().is_empty() {
            format!("#{}", proposal.id())
        } else {
            format!("#{} {}", Self::short_id(proposal.id().as_str()), proposal.title())
        };
        output.push_str(&Self::section_header(&title));

        output.push_str(&Self::field("Type", proposal.proposal_type().as_str()));
        output.push_str(&format!(
            "  {:<16} {}\n",
            "Status:".cyan(),
            Self::status_label(evaluation.status)
        ));
        if !proposal.proposer().is_empty() {
            output.push_str(&Self::field("Proposer", proposal.proposer()));
        }
        output.push_str(&Self::field(
            "Voting",
            &format!("blocks {} to {}", timeline.start_block, timeline.end_block),
        ));
        output.push_str(&Self::field(
            "Votes",
            &format!(
                "for {} / against {} / abstain {}",
                results.for_votes, results.against_votes, results.abstain_votes
            ),
        ));
        output.push_str(&Self::field(
            "Quorum",
            &format!("{} (needs {})", Self::yes_no(metrics.quorum_met), proposal.quorum_votes()),
        ));
        output.push_str(&Self::field("Approval", &Self::yes_no(metrics.approval_met)));
        output.push_str(&Self::field("Participation", &metrics.participation_rate.to_string()));
        output.push_str(&Self::field("Approval rate", &metrics.approval_rate.to_string()));

        match &metrics.detail {
            MetricsDetail::Standard { participation_votes } => {
                output.push_str(&Self::field("Counted votes", &participation_votes.to_string()));
            }
            MetricsDetail::Approval(approval) => output.push_str(&Self::approval_detail(approval)),
            MetricsDetail::Optimistic(optimistic) => {
                output.push_str(&Self::optimistic_detail(optimistic))
            }
            MetricsDetail::Hybrid(hybrid) => output.push_str(&Self::hybrid_detail(hybrid)),
            MetricsDetail::HybridOptimisticTiered(tiered) => {
                output.push_str(&Self::tiered_detail(tiered, evaluation.status))
            }
        }

        output
    }

    fn approval_detail(approval: &ApprovalMetrics) -> String {
        let mut output = String::new();
        output.push_str(&Self::field("Option votes", &approval.total_option_votes.to_string()));
        output.push_str(&Self::field("Winning", &Self::list(&approval.top_options)));
        output.push_str(&Self::field(
            "Meeting criteria",
            &Self::list(&approval.options_meeting_criteria),
        ));
        let budget = match approval.budget_utilization {
            BudgetUtilization::NoBudget => "no budget".to_string(),
            BudgetUtilization::Computed(p) => p.to_string(),
            BudgetUtilization::LegacyUnavailable => "unavailable (predates budget change)".to_string(),
        };
        output.push_str(&Self::field("Budget used", &budget));
        output
    }

    fn optimistic_detail(optimistic: &OptimisticMetrics) -> String {
        let mut output = String::new();
        output.push_str(&Self::field("Veto threshold", &optimistic.veto_threshold.to_string()));
        output.push_str(&Self::field("Veto progress", &optimistic.veto_progress.to_string()));
        let vetoed = if optimistic.is_vetoed_for_status {
            "yes".red().bold().to_string()
        } else {
            "no".green().to_string()
        };
        output.push_str(&Self::field("Vetoed", &vetoed));
        output
    }

    fn hybrid_detail(hybrid: &HybridMetrics) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n  {:<10} {:>14} {:>10} {:>8}\n",
            "Group".bold(),
            "Participation".bold(),
            "Approval".bold(),
            "Min".bold()
        ));
        for group in &hybrid.groups {
            output.push_str(&format!(
                "  {:<10} {:>14} {:>10} {:>8}\n",
                group.group.key(),
                group.participation_rate.to_string(),
                group.approval_rate.to_string(),
                if group.meets_minimum { "met" } else { "-" }
            ));
        }
        output.push_str(&Self::field(
            "Weighted approval",
            &hybrid.weighted_approval_rate.to_string(),
        ));
        output.push_str(&Self::field(
            "Groups at minimum",
            &format!("{}/{}", hybrid.qualifying_groups(), hybrid.groups.len()),
        ));
        output
    }

    fn tiered_detail(tiered: &TieredMetrics, status: ProposalStatus) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n  {:<10} {:>10}\n", "Group".bold(), "Against".bold()));
        for tally in &tiered.group_tallies {
            output.push_str(&format!(
                "  {:<10} {:>10}\n",
                tally.group.key(),
                tally.veto_percentage.to_string()
            ));
        }
        output.push('\n');
        for tier in &tiered.tiers {
            let marker = if tier.is_triggered { "!".red().bold() } else { " ".normal() };
            output.push_str(&format!(
                "  {} {} groups at {}: {}/{}\n",
                marker,
                tier.required_groups,
                tier.threshold,
                tier.groups_at_threshold,
                tier.required_groups
            ));
        }
        let text = tiered.status_text(status);
        let text = if tiered.veto_triggered { text.red() } else { text.normal() };
        output.push_str(&format!("\n  {}\n", text));
        output
    }

    fn failure_lines(report: &EvaluationReport) -> String {
        report
            .failures
            .iter()
            .map(|f| {
                format!(
                    "{} {} {} {}\n",
                    "x".red().bold(),
                    Self::short_id(&f.id).bold(),
                    format!("[{}]", f.error.code()).red(),
                    f.error
                )
            })
            .collect()
    }

    fn totals(report: &EvaluationReport) -> String {
        let mut output = format!(
            "\n{} {} evaluated",
            "Total:".bold(),
            report.evaluations.len()
        );
        for status in [
            ProposalStatus::Active,
            ProposalStatus::Succeeded,
            ProposalStatus::Defeated,
        ] {
            let count = report.count_status(status);
            if count > 0 {
                output.push_str(&format!(", {} {}", count, status.as_str().to_lowercase()));
            }
        }
        if !report.failures.is_empty() {
            output.push_str(&format!(", {}", format!("{} failed", report.failures.len()).red()));
        }
        output.push('\n');
        output
    }

    /// Status padded for column alignment, colored by outcome.
    pub fn status_label(status: ProposalStatus) -> ColoredString {
        let padded = format!("{:<10}", status.as_str());
        match status {
            ProposalStatus::Succeeded | ProposalStatus::Executed => padded.green().bold(),
            ProposalStatus::Defeated | ProposalStatus::Cancelled => padded.red().bold(),
            ProposalStatus::Active => padded.yellow().bold(),
            ProposalStatus::Pending | ProposalStatus::Queued => padded.cyan(),
        }
    }

    /// Long hex ids shortened to `0x1234…abcd`.
    fn short_id(id: &str) -> String {
        let chars: Vec<char> = id.chars().collect();
        if chars.len() <= 14 {
            return id.to_string();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }

    fn block(report: &EvaluationReport) -> Option<String> {
        report.evaluations.first().map(|e| e.block.to_string())
    }

    fn field(label: &str, value: &str) -> String {
        format!("  {:<16} {}\n", format!("{label}:").cyan(), value)
    }

    fn yes_no(value: bool) -> String {
        if value {
            "met".green().to_string()
        } else {
            "not met".red().to_string()
        }
    }

    fn list(items: &[String]) -> String {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, report: &EvaluationReport) -> String {
        Self::format_full(report)
    }

    fn format_summary(&self, report: &EvaluationReport) -> String {
        Self::format_summary(report)
    }

    fn format_json(&self, report: &EvaluationReport, proposals: &Value) -> String {
        Self::format_json(report, proposals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proposal_application::EvaluationFailure;
    use proposal_domain::{
        Amount, GroupMetrics, GroupName, GroupTally, Percentage, Proposal, ProposalError,
        ProposalFactory, ProposalMetrics, TierStatus, VetoBranch, VetoTiers,
    };

    fn proposal(id: &str) -> Proposal {
        let payload = serde_json::from_value(json!({
            "id": id,
            "type": "STANDARD",
            "title": "Fund the grants program",
            "data": {},
            "results": { "forVotes": 300, "againstVotes": 100 },
            "timeline": { "createdBlock": 1, "startBlock": 10, "endBlock": 20 },
            "quorumVotes": 50,
            "approvalThreshold": 5000,
            "votableSupply": 1000,
            "context": { "tenant": "uniswap" }
        }))
        .unwrap();
        ProposalFactory::shared().create_proposal(&payload).unwrap()
    }

    fn evaluation(id: &str, status: ProposalStatus, detail: MetricsDetail) -> Evaluation {
        Evaluation {
            proposal: proposal(id),
            block: Amount::from(21u64),
            status,
            metrics: ProposalMetrics {
                quorum_met: true,
                approval_met: status == ProposalStatus::Succeeded,
                participation_rate: Percentage::from_whole(40),
                approval_rate: Percentage::from_whole(75),
                detail,
            },
        }
    }

    fn standard_detail() -> MetricsDetail {
        MetricsDetail::Standard {
            participation_votes: Amount::from(400u64),
        }
    }

    fn report() -> EvaluationReport {
        EvaluationReport {
            evaluations: vec![
                evaluation("1", ProposalStatus::Succeeded, standard_detail()),
                evaluation("2", ProposalStatus::Active, standard_detail()),
            ],
            failures: vec![EvaluationFailure {
                id: "3".to_string(),
                error: ProposalError::UnknownProposalType("RANKED".to_string()),
            }],
        }
    }

    fn hybrid_metrics() -> HybridMetrics {
        HybridMetrics {
            groups: GroupName::ALL
                .iter()
                .map(|group| GroupMetrics {
                    group: *group,
                    participation_rate: Percentage::from_whole(20),
                    approval_rate: Percentage::from_whole(60),
                    meets_minimum: *group != GroupName::Chains,
                })
                .collect(),
            weighted_approval_rate: Percentage::from_whole(60),
        }
    }

    // ==================== Summary ====================

    #[test]
    fn test_summary_lists_each_proposal() {
        let output = ConsoleFormatter::format_summary(&report());
        assert!(output.contains("Fund the grants program"));
        assert!(output.contains("SUCCEEDED"));
        assert!(output.contains("ACTIVE"));
        assert!(output.contains("STANDARD"));
        assert!(output.contains("21"));
    }

    #[test]
    fn test_summary_reports_failures_and_totals() {
        let output = ConsoleFormatter::format_summary(&report());
        assert!(output.contains("[UNKNOWN_PROPOSAL_TYPE]"));
        assert!(output.contains("2 evaluated"));
        assert!(output.contains("1 succeeded"));
        assert!(output.contains("1 failed"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(ConsoleFormatter::short_id("42"), "42");
        assert_eq!(
            ConsoleFormatter::short_id("0x1234567890abcdef1234"),
            "0x1234…1234"
        );
    }

    // ==================== Full ====================

    #[test]
    fn test_full_standard_metrics() {
        let output = ConsoleFormatter::format_full(&report());
        assert!(output.contains("Proposal Evaluation"));
        assert!(output.contains("40.00%"));
        assert!(output.contains("75.00%"));
        assert!(output.contains("blocks 10 to 20"));
        assert!(output.contains("for 300 / against 100 / abstain 0"));
        assert!(output.contains("Failures"));
    }

    #[test]
    fn test_full_approval_detail() {
        let detail = MetricsDetail::Approval(ApprovalMetrics {
            top_options: vec!["Grants".to_string(), "Audits".to_string()],
            options_meeting_criteria: vec!["Grants".to_string()],
            budget_utilization: BudgetUtilization::Computed(Percentage::from_whole(25)),
            total_option_votes: Amount::from(900u64),
        });
        let report = EvaluationReport {
            evaluations: vec![evaluation("7", ProposalStatus::Succeeded, detail)],
            failures: Vec::new(),
        };
        let output = ConsoleFormatter::format_full(&report);
        assert!(output.contains("Grants, Audits"));
        assert!(output.contains("25.00%"));
        assert!(output.contains("900"));
    }

    #[test]
    fn test_full_legacy_budget() {
        let detail = MetricsDetail::Approval(ApprovalMetrics {
            top_options: Vec::new(),
            options_meeting_criteria: Vec::new(),
            budget_utilization: BudgetUtilization::LegacyUnavailable,
            total_option_votes: Amount::zero(),
        });
        let report = EvaluationReport {
            evaluations: vec![evaluation("7", ProposalStatus::Defeated, detail)],
            failures: Vec::new(),
        };
        assert!(ConsoleFormatter::format_full(&report).contains("predates budget change"));
    }

    #[test]
    fn test_full_hybrid_groups() {
        let report = EvaluationReport {
            evaluations: vec![evaluation(
                "8",
                ProposalStatus::Succeeded,
                MetricsDetail::Hybrid(hybrid_metrics()),
            )],
            failures: Vec::new(),
        };
        let output = ConsoleFormatter::format_full(&report);
        for group in ["delegates", "apps", "users", "chains"] {
            assert!(output.contains(group), "missing {group}");
        }
        assert!(output.contains("3/4"));
    }

    #[test]
    fn test_full_tiered_status_text() {
        let tiered = TieredMetrics {
            hybrid: hybrid_metrics(),
            group_tallies: vec![GroupTally {
                group: GroupName::Apps,
                veto_percentage: Percentage::from_whole(60),
                against_votes: Amount::from(60u64),
            }],
            veto_triggered: false,
            veto_branch: None,
            thresholds: VetoTiers::TIERED_DEFAULT,
            tiers: vec![TierStatus {
                branch: VetoBranch::TwoGroups,
                threshold: Percentage::from_whole(55),
                required_groups: 2,
                groups_at_threshold: 1,
                is_triggered: false,
            }],
        };
        let report = EvaluationReport {
            evaluations: vec![evaluation(
                "9",
                ProposalStatus::Active,
                MetricsDetail::HybridOptimisticTiered(tiered),
            )],
            failures: Vec::new(),
        };
        let output = ConsoleFormatter::format_full(&report);
        assert!(output.contains("60.00% against / 55.00% with 2 groups - Below threshold"));
        assert!(output.contains("2 groups at 55.00%: 1/2"));
    }

    // ==================== JSON ====================

    #[test]
    fn test_json_document() {
        let proposals = json!([{ "id": "1" }, { "id": "2" }]);
        let output = ConsoleFormatter::format_json(&report(), &proposals);
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["block"], "21");
        assert_eq!(parsed["proposals"][1]["id"], "2");
        assert_eq!(parsed["failures"][0]["id"], "3");
        assert_eq!(parsed["failures"][0]["code"], "UNKNOWN_PROPOSAL_TYPE");
    }

    #[test]
    fn test_json_empty_report() {
        let output = ConsoleFormatter::format_json(&EvaluationReport::default(), &json!([]));
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["block"], Value::Null);
        assert_eq!(parsed["failures"], json!([]));
    }
}
