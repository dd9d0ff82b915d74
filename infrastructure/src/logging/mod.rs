//! Logging infrastructure: structured evaluation audit logs.
//!
//! Provides [`JsonlEvaluationLogger`], a JSONL file writer that implements
//! the [`EvaluationLogger`](proposal_application::EvaluationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlEvaluationLogger;
