//! CLI command definitions

use clap::{Parser, ValueEnum};
use proposal_domain::Amount;
use proposal_domain::core::amount::parse_amount_str;
use std::path::PathBuf;

/// Output format for evaluation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per proposal
    Summary,
    /// Status plus every metric
    Full,
    /// API response objects as JSON
    Json,
}

impl From<OutputFormat> for proposal_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => proposal_domain::OutputFormat::Summary,
            OutputFormat::Full => proposal_domain::OutputFormat::Full,
            OutputFormat::Json => proposal_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for proposal-engine
#[derive(Parser, Debug)]
#[command(name = "proposal-engine")]
#[command(author, version, about = "Evaluate DAO governance proposals at a given block")]
#[command(long_about = r#"
Proposal Engine reads stored proposal records, builds each proposal with the
strategy of its type, and reports status and metrics at the current block.

Records are a JSON array of indexer rows (proposal_id, proposal_type,
proposal_data, proposal_results, created/start/end blocks, ...). A row with an
`offchain_proposal` twin is evaluated as the hybrid variant of its type.

Configuration files are loaded from (in priority order):
1. PROPOSAL_ENGINE_* environment variables
2. --config <path>     Explicit config file
3. ./proposals.toml    Project-level config
4. ~/.config/proposal-engine/config.toml   Global config

Example:
  proposal-engine proposals.json --block 120000000
  proposal-engine proposals.json --tenant uniswap --votable-supply 1000000000000000000000000000 -o full
  proposal-engine proposals.json --id 1024 -o json
"#)]
pub struct Cli {
    /// JSON file of stored proposal records
    #[arg(value_name = "RECORDS")]
    pub records: Option<PathBuf>,

    /// Block to evaluate at (defaults to the system clock)
    #[arg(short, long, value_name = "N", value_parser = parse_amount_arg)]
    pub block: Option<Amount>,

    /// Tenant namespace (overrides config)
    #[arg(short, long, value_name = "TENANT")]
    pub tenant: Option<String>,

    /// Votable token supply used when a record has none
    #[arg(long, value_name = "N", value_parser = parse_amount_arg)]
    pub votable_supply: Option<Amount>,

    /// Only evaluate the proposal with this id
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append one JSON line per evaluation to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

fn parse_amount_arg(raw: &str) -> Result<Amount, String> {
    parse_amount_str(raw, "value").map_err(|e| e.to_string())
}
