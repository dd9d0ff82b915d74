//! Infrastructure layer for proposal-engine
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the stored-record adapter, configuration file
//! loading, block clocks and the JSONL evaluation log.

pub mod adapter;
pub mod clock;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use adapter::{
    AdapterError, ProposalResponse, RawProposalRecord, RecordAdapter, load_records, parse_records,
};
pub use clock::{FixedBlockClock, SystemClock};
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileEngineConfig, FileOutputConfig,
    Severity,
};
pub use logging::JsonlEvaluationLogger;
