//! Presentation-level configuration
//!
//! Resolves the output format and color setting from CLI flags and the
//! `[output]` section of the config file.

use crate::cli::commands::OutputFormat as CliOutputFormat;
use proposal_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// CLI flags win over file settings.
    pub fn resolve(
        cli_format: Option<CliOutputFormat>,
        no_color: bool,
        file_format: Option<OutputFormat>,
        file_color: bool,
    ) -> Self {
        Self {
            format: cli_format
                .map(OutputFormat::from)
                .or(file_format)
                .unwrap_or_default(),
            color: file_color && !no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_format_wins() {
        let config = OutputConfig::resolve(
            Some(CliOutputFormat::Json),
            false,
            Some(OutputFormat::Full),
            true,
        );
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.color);
    }

    #[test]
    fn test_file_format_and_color() {
        let config = OutputConfig::resolve(None, false, Some(OutputFormat::Full), false);
        assert_eq!(config.format, OutputFormat::Full);
        assert!(!config.color);
    }

    #[test]
    fn test_no_color_flag() {
        let config = OutputConfig::resolve(None, true, None, true);
        assert_eq!(config.format, OutputFormat::default());
        assert!(!config.color);
    }
}
