//! Output formatter trait

use proposal_application::EvaluationReport;
use serde_json::Value;

/// Trait for formatting evaluation reports
pub trait OutputFormatter {
    /// Status and every metric per proposal
    fn format_full(&self, report: &EvaluationReport) -> String;

    /// One line per proposal
    fn format_summary(&self, report: &EvaluationReport) -> String;

    /// JSON document wrapping already-serialized proposal responses
    fn format_json(&self, report: &EvaluationReport, proposals: &Value) -> String;
}
