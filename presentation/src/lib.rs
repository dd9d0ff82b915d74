//! Presentation layer for proposal-engine
//!
//! This crate contains CLI definitions, output configuration and the
//! console formatter for evaluation reports.

pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
