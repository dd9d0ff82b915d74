//! Port for structured evaluation logging.
//!
//! Defines the [`EvaluationLogger`] trait for recording one audit record per
//! evaluated proposal.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! diagnostic messages, while this port captures evaluation outcomes in a
//! machine-readable format (JSONL).

use serde_json::Value;

/// A structured evaluation event for logging.
pub struct EvaluationEvent {
    /// Event type identifier (e.g., "proposal_evaluated", "proposal_failed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl EvaluationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging evaluation events.
///
/// `log` is synchronous and infallible; implementations drop records they
/// cannot write.
pub trait EvaluationLogger: Send + Sync {
    fn log(&self, event: EvaluationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEvaluationLogger;

impl EvaluationLogger for NoEvaluationLogger {
    fn log(&self, _event: EvaluationEvent) {}
}
