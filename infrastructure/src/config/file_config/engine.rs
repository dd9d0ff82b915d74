//! Engine configuration from TOML (`[engine]` section)

use super::{ConfigIssue, ConfigIssueCode, Severity};
use proposal_application::EngineConfig;
use proposal_domain::{Amount, AmountError, NumericInput};
use serde::{Deserialize, Serialize};

/// Raw engine configuration from TOML
///
/// Block numbers and token figures may be written as integers or as decimal
/// / `0x` hex strings, since 18-decimal supplies overflow TOML integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Tenant namespace selecting vote-counting rules
    pub tenant: String,
    /// Tenant-specific calculation switch (optimism: 1 counts FOR only)
    pub calculation_options: Option<u8>,
    /// Delegate quorum for hybrid proposals
    pub delegate_quorum: Option<NumericInput>,
    /// Optimistic veto display bar, whole percent of votable supply
    pub disapproval_threshold: Option<u64>,
    /// Block from which approval budgets use the current formula
    pub budget_change_date: Option<NumericInput>,
    /// Governor upgrade block; earlier approval results use the legacy layout
    pub v6_upgrade_block: Option<NumericInput>,
    /// Quorum percent applied when a record carries none
    pub default_quorum_percent: u64,
    /// Approval threshold applied when a record carries none
    pub default_approval_threshold: u64,
    /// Votable supply applied when the caller supplies none
    pub votable_supply: Option<NumericInput>,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            tenant: "optimism".to_string(),
            calculation_options: None,
            delegate_quorum: None,
            disapproval_threshold: None,
            budget_change_date: None,
            v6_upgrade_block: None,
            default_quorum_percent: 4,
            default_approval_threshold: 5000,
            votable_supply: None,
        }
    }
}

fn optional(input: &Option<NumericInput>, field: &str) -> Result<Option<Amount>, AmountError> {
    input.as_ref().map(|v| v.to_amount(field)).transpose()
}

impl FileEngineConfig {
    /// Convert to the application-level [`EngineConfig`].
    pub fn to_engine_config(&self) -> Result<EngineConfig, AmountError> {
        Ok(EngineConfig {
            tenant: self.tenant.clone(),
            calculation_options: self.calculation_options,
            delegate_quorum: optional(&self.delegate_quorum, "engine.delegate_quorum")?,
            disapproval_threshold: self.disapproval_threshold,
            budget_change_date: optional(&self.budget_change_date, "engine.budget_change_date")?,
            v6_upgrade_block: optional(&self.v6_upgrade_block, "engine.v6_upgrade_block")?,
            default_quorum_percent: self.default_quorum_percent,
            default_approval_threshold: Amount::from(self.default_approval_threshold),
            votable_supply: optional(&self.votable_supply, "engine.votable_supply")?,
        })
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.tenant.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyValue {
                    field: "engine.tenant".to_string(),
                },
                message: "engine.tenant is empty, FOR + ABSTAIN votes will count toward quorum"
                    .to_string(),
            });
        }

        if let Some(options) = self.calculation_options
            && (options > 1 || self.tenant != "optimism")
        {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::UnusedValue {
                    field: "engine.calculation_options".to_string(),
                },
                message: format!(
                    "engine.calculation_options = {options} has no effect for tenant '{}'",
                    self.tenant
                ),
            });
        }

        for (field, value) in [
            ("engine.disapproval_threshold", self.disapproval_threshold),
            ("engine.default_quorum_percent", Some(self.default_quorum_percent)),
        ] {
            if let Some(percent) = value
                && percent > 100
            {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::OutOfRange {
                        field: field.to_string(),
                    },
                    message: format!("{field}: {percent}% is above 100%"),
                });
            }
        }

        if self.default_approval_threshold > 10_000 {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::OutOfRange {
                    field: "engine.default_approval_threshold".to_string(),
                },
                message: format!(
                    "engine.default_approval_threshold: {} is above 10000 basis points",
                    self.default_approval_threshold
                ),
            });
        }

        if let Err(e) = self.to_engine_config() {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::InvalidNumber,
                message: e.to_string(),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::super::FileConfig;
    use super::*;

    #[test]
    fn test_engine_section_deserialize() {
        let toml_str = r#"
[engine]
tenant = "scroll"
delegate_quorum = "30000000000000000000000"
disapproval_threshold = 20
v6_upgrade_block = 114615036
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.tenant, "scroll");
        let engine = config.engine.to_engine_config().unwrap();
        assert_eq!(
            engine.delegate_quorum,
            Some(Amount::from(30_000u64) * Amount::exp10(18))
        );
        assert_eq!(engine.v6_upgrade_block, Some(Amount::from(114_615_036u64)));
        assert_eq!(engine.disapproval_threshold, Some(20));
        assert_eq!(engine.default_quorum_percent, 4);
    }

    #[test]
    fn test_bad_number_is_reported() {
        let config = FileEngineConfig {
            votable_supply: Some(NumericInput::from("lots")),
            ..Default::default()
        };
        assert!(config.to_engine_config().is_err());
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::InvalidNumber));
    }

    #[test]
    fn test_calculation_options_outside_optimism_warns() {
        let config = FileEngineConfig {
            tenant: "uniswap".to_string(),
            calculation_options: Some(1),
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);

        let optimism = FileEngineConfig {
            calculation_options: Some(1),
            ..Default::default()
        };
        assert!(optimism.validate().is_empty());
    }

    #[test]
    fn test_percentages_above_hundred_are_errors() {
        let config = FileEngineConfig {
            disapproval_threshold: Some(120),
            default_quorum_percent: 101,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(
            issues.iter().filter(|i| i.severity == Severity::Error).count(),
            2
        );
    }
}
