//! Application layer for proposal-engine
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EngineConfig;
pub use ports::{
    block_clock::BlockClock,
    evaluation_logger::{EvaluationEvent, EvaluationLogger, NoEvaluationLogger},
};
pub use use_cases::evaluate_proposals::{
    Evaluation, EvaluationFailure, EvaluationReport, EvaluateProposalsUseCase,
};
