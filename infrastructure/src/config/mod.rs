//! Configuration file loading for proposal-engine
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `PROPOSAL_ENGINE_ENGINE__TENANT=scroll` style variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./proposals.toml` or `./.proposals.toml`
//! 4. Global: `$XDG_CONFIG_HOME/proposal-engine/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, FileConfig, FileEngineConfig, FileOutputConfig, Severity,
};
pub use loader::ConfigLoader;
