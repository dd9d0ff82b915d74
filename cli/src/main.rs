//! CLI entrypoint for Proposal Engine
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use proposal_application::{BlockClock, EvaluateProposalsUseCase, EvaluationFailure};
use proposal_domain::{OutputFormat, ProposalError, ProposalFactory};
use proposal_infrastructure::{
    ConfigLoader, FixedBlockClock, JsonlEvaluationLogger, ProposalResponse, RecordAdapter,
    Severity, SystemClock, load_records,
};
use proposal_presentation::{Cli, ConsoleFormatter, OutputConfig};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Proposal Engine");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let issues = file_config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Error => error!("{}", issue.message),
            Severity::Warning => warn!("{}", issue.message),
        }
    }
    if issues.iter().any(|i| i.severity == Severity::Error) {
        bail!("Configuration has errors. Run with --show-config to see which files were loaded.");
    }

    let mut engine = file_config
        .engine
        .to_engine_config()
        .context("Invalid [engine] configuration")?;
    if let Some(tenant) = &cli.tenant {
        engine = engine.with_tenant(tenant.clone());
    }
    if let Some(supply) = cli.votable_supply {
        engine = engine.with_votable_supply(supply);
    }

    let output_config = OutputConfig::resolve(
        cli.output,
        cli.no_color,
        file_config.output.format,
        file_config.output.color,
    );
    if !output_config.color {
        colored::control::set_override(false);
    }

    // === Records ===
    let Some(path) = cli.records.as_deref() else {
        bail!("A records file is required. Use --help for usage.");
    };
    let mut records = load_records(path)
        .with_context(|| format!("Failed to load records from {}", path.display()))?;
    if let Some(id) = &cli.id {
        records.retain(|record| record.record_id() == *id);
        if records.is_empty() {
            return Err(ProposalError::NotFound(id.clone()).into());
        }
    }
    info!(count = records.len(), tenant = %engine.tenant, "Loaded proposal records");

    let adapter = RecordAdapter::new(engine);
    let mut payloads = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (record, outcome) in records.iter().zip(adapter.to_payloads(&records)) {
        match outcome {
            Ok(payload) => payloads.push(payload),
            Err(e) => {
                let id = record.record_id();
                warn!(id = %id, code = e.code(), "Skipping record: {e}");
                rejected.push(EvaluationFailure {
                    id,
                    error: e.into(),
                });
            }
        }
    }

    // === Dependency Injection ===
    let clock: Arc<dyn BlockClock> = match cli.block {
        Some(block) => Arc::new(FixedBlockClock::new(block)),
        None => Arc::new(SystemClock),
    };
    let mut use_case = EvaluateProposalsUseCase::new(clock);
    if let Some(log_path) = file_config.output.evaluation_log_or(cli.log_file.clone()) {
        let logger = JsonlEvaluationLogger::new(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        use_case = use_case.with_logger(Arc::new(logger));
    }

    let mut report = use_case.evaluate_payloads(&ProposalFactory::shared(), &payloads);
    report.failures.extend(rejected);

    // Output results
    let output = match output_config.format {
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Full => ConsoleFormatter::format_full(&report),
        OutputFormat::Json => {
            let proposals =
                serde_json::to_value(ProposalResponse::from_evaluations(&report.evaluations))?;
            ConsoleFormatter::format_json(&report, &proposals)
        }
    };

    println!("{}", output);

    Ok(())
}
