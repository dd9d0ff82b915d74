//! `[output]` section: rendering and the evaluation audit log.

use super::{ConfigIssue, ConfigIssueCode, Severity};
use proposal_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `summary`, `full` or `json`; the CLI `-o` flag wins
    pub format: Option<OutputFormat>,
    pub color: bool,
    /// JSONL file receiving one line per evaluation, used when
    /// `--log-file` is not given
    pub evaluation_log: Option<PathBuf>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            evaluation_log: None,
        }
    }
}

impl FileOutputConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        match &self.evaluation_log {
            Some(path) if path.as_os_str().is_empty() => vec![ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyValue {
                    field: "output.evaluation_log".to_string(),
                },
                message: "output.evaluation_log is empty; no audit log will be written".to_string(),
            }],
            _ => Vec::new(),
        }
    }

    /// Audit log path: the explicit one, else a non-empty configured one.
    pub fn evaluation_log_or(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| {
            self.evaluation_log
                .clone()
                .filter(|path| !path.as_os_str().is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    #[test]
    fn test_output_section() {
        let config: FileConfig = toml::from_str(
            r#"
[output]
format = "json"
color = false
evaluation_log = "logs/evaluations.jsonl"
"#,
        )
        .unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(
            config.output.evaluation_log,
            Some(PathBuf::from("logs/evaluations.jsonl"))
        );
        assert!(config.output.validate().is_empty());
    }

    #[test]
    fn test_evaluation_log_precedence() {
        let output = FileOutputConfig {
            evaluation_log: Some(PathBuf::from("configured.jsonl")),
            ..Default::default()
        };
        assert_eq!(
            output.evaluation_log_or(Some(PathBuf::from("flag.jsonl"))),
            Some(PathBuf::from("flag.jsonl"))
        );
        assert_eq!(output.evaluation_log_or(None), Some(PathBuf::from("configured.jsonl")));
        assert_eq!(FileOutputConfig::default().evaluation_log_or(None), None);
    }

    #[test]
    fn test_empty_evaluation_log_is_ignored_with_warning() {
        let output = FileOutputConfig {
            evaluation_log: Some(PathBuf::new()),
            ..Default::default()
        };
        assert_eq!(output.evaluation_log_or(None), None);
        let issues = output.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
