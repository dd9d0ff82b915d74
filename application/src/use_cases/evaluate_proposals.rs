//! Evaluate proposals use case
//!
//! Derives status and metrics for proposals at the clock's current block.
//! Each proposal is evaluated independently: a failure on one is reported
//! and the batch continues.
//!
//! ```ignore
//! let use_case = EvaluateProposalsUseCase::new(Arc::new(FixedBlockClock::new(block)))
//!     .with_logger(Arc::new(JsonlEvaluationLogger::new("evaluations.jsonl")?));
//!
//! let report = use_case.evaluate_payloads(&ProposalFactory::shared(), &payloads);
//! for evaluation in &report.evaluations {
//!     println!("{} {}", evaluation.proposal.id(), evaluation.status);
//! }
//! ```

use std::sync::Arc;

use crate::ports::block_clock::BlockClock;
use crate::ports::evaluation_logger::{EvaluationEvent, EvaluationLogger, NoEvaluationLogger};
use proposal_domain::{
    Amount, Proposal, ProposalError, ProposalFactory, ProposalMetrics, ProposalPayload,
    ProposalStatus,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Outcome of evaluating one proposal.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub proposal: Proposal,
    /// Block the status was derived at.
    pub block: Amount,
    pub status: ProposalStatus,
    pub metrics: ProposalMetrics,
}

/// A proposal that could not be built or evaluated.
#[derive(Debug, Clone)]
pub struct EvaluationFailure {
    pub id: String,
    pub error: ProposalError,
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    pub evaluations: Vec<Evaluation>,
    pub failures: Vec<EvaluationFailure>,
}

impl EvaluationReport {
    pub fn total(&self) -> usize {
        self.evaluations.len() + self.failures.len()
    }

    pub fn count_status(&self, status: ProposalStatus) -> usize {
        self.evaluations.iter().filter(|e| e.status == status).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Use case for evaluating proposals
pub struct EvaluateProposalsUseCase {
    clock: Arc<dyn BlockClock>,
    logger: Arc<dyn EvaluationLogger>,
}

impl EvaluateProposalsUseCase {
    pub fn new(clock: Arc<dyn BlockClock>) -> Self {
        Self {
            clock,
            logger: Arc::new(NoEvaluationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn EvaluationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn current_block(&self) -> Amount {
        self.clock.current_block()
    }

    /// Status and metrics of one proposal at the current block.
    pub fn evaluate(&self, proposal: &Proposal) -> Result<Evaluation, ProposalError> {
        let block = self.current_block();
        let outcome = proposal
            .metrics()
            .and_then(|metrics| Ok((proposal.status(block)?, metrics)));

        match outcome {
            Ok((status, metrics)) => {
                debug!(id = %proposal.id(), %status, "Evaluated proposal");
                self.logger.log(EvaluationEvent::new(
                    "proposal_evaluated",
                    json!({
                        "id": proposal.id().as_str(),
                        "proposalType": proposal.proposal_type(),
                        "block": block.to_string(),
                        "status": status.as_str(),
                        "metrics": &metrics,
                    }),
                ));
                Ok(Evaluation {
                    proposal: proposal.clone(),
                    block,
                    status,
                    metrics,
                })
            }
            Err(error) => {
                self.log_failure(proposal.id().as_str(), &error);
                Err(error)
            }
        }
    }

    /// Evaluate every proposal, collecting failures instead of stopping.
    pub fn evaluate_all<'p, I>(&self, proposals: I) -> EvaluationReport
    where
        I: IntoIterator<Item = &'p Proposal>,
    {
        let mut report = EvaluationReport::default();
        for proposal in proposals {
            match self.evaluate(proposal) {
                Ok(evaluation) => report.evaluations.push(evaluation),
                Err(error) => report.failures.push(EvaluationFailure {
                    id: proposal.id().to_string(),
                    error,
                }),
            }
        }
        self.summarize(&report);
        report
    }

    /// Build proposals from payloads and evaluate the ones that build.
    pub fn evaluate_payloads(
        &self,
        factory: &ProposalFactory<'_>,
        payloads: &[ProposalPayload],
    ) -> EvaluationReport {
        let mut report = EvaluationReport::default();
        for (payload, built) in payloads.iter().zip(factory.create_many(payloads)) {
            let outcome = built
                .inspect_err(|error| self.log_failure(&payload.id, error))
                .and_then(|proposal| self.evaluate(&proposal));
            match outcome {
                Ok(evaluation) => report.evaluations.push(evaluation),
                Err(error) => report.failures.push(EvaluationFailure {
                    id: payload.id.clone(),
                    error,
                }),
            }
        }
        self.summarize(&report);
        report
    }

    /// Look up a proposal by id.
    pub fn find<'p>(proposals: &'p [Proposal], id: &str) -> Result<&'p Proposal, ProposalError> {
        proposals
            .iter()
            .find(|p| p.id().as_str() == id)
            .ok_or_else(|| ProposalError::NotFound(id.to_string()))
    }

    /// Evaluate the proposal with the given id.
    pub fn evaluate_by_id(&self, proposals: &[Proposal], id: &str) -> Result<Evaluation, ProposalError> {
        self.evaluate(Self::find(proposals, id)?)
    }

    /// A copy of `proposal` carrying tallies parsed from fresh raw results.
    ///
    /// `raw_data` is the proposal's raw data, consulted for hybrid group
    /// tallies.
    pub fn refresh_results(
        proposal: &Proposal,
        raw_results: &Value,
        raw_data: Option<&Value>,
    ) -> Result<Proposal, ProposalError> {
        let results = proposal.strategy().parse_results(raw_results, raw_data)?;
        Ok(proposal.refreshed(results))
    }

    fn log_failure(&self, id: &str, error: &ProposalError) {
        warn!(id, code = error.code(), "Proposal evaluation failed: {error}");
        self.logger.log(EvaluationEvent::new(
            "proposal_failed",
            json!({
                "id": id,
                "code": error.code(),
                "message": error.to_string(),
            }),
        ));
    }

    fn summarize(&self, report: &EvaluationReport) {
        info!(
            block = %self.current_block(),
            evaluated = report.evaluations.len(),
            failed = report.failures.len(),
            succeeded = report.count_status(ProposalStatus::Succeeded),
            defeated = report.count_status(ProposalStatus::Defeated),
            active = report.count_status(ProposalStatus::Active),
            "Evaluated proposal batch"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TestClock(u64);

    impl BlockClock for TestClock {
        fn current_block(&self) -> Amount {
            Amount::from(self.0)
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<(&'static str, Value)>>,
    }

    impl EvaluationLogger for RecordingLogger {
        fn log(&self, event: EvaluationEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    fn payload(id: &str, for_votes: u64, against_votes: u64) -> ProposalPayload {
        serde_json::from_value(json!({
            "id": id,
            "type": "STANDARD",
            "data": {},
            "results": { "forVotes": for_votes, "againstVotes": against_votes },
            "timeline": { "createdBlock": 1, "startBlock": 10, "endBlock": 20 },
            "quorumVotes": 50,
            "approvalThreshold": 5000,
            "votableSupply": 1000,
            "context": { "tenant": "uniswap" }
        }))
        .unwrap()
    }

    fn proposal(id: &str, for_votes: u64, against_votes: u64) -> Proposal {
        ProposalFactory::shared()
            .create_proposal(&payload(id, for_votes, against_votes))
            .unwrap()
    }

    fn use_case(block: u64) -> EvaluateProposalsUseCase {
        EvaluateProposalsUseCase::new(Arc::new(TestClock(block)))
    }

    // ==================== Single Evaluation ====================

    #[test]
    fn test_evaluate_uses_clock_block() {
        let p = proposal("1", 100, 10);
        assert_eq!(use_case(15).evaluate(&p).unwrap().status, ProposalStatus::Active);
        assert_eq!(use_case(5).evaluate(&p).unwrap().status, ProposalStatus::Pending);

        let done = use_case(21).evaluate(&p).unwrap();
        assert_eq!(done.status, ProposalStatus::Succeeded);
        assert_eq!(done.block, Amount::from(21u64));
        assert!(done.metrics.quorum_met);
    }

    #[test]
    fn test_find_and_not_found() {
        let proposals = vec![proposal("1", 100, 10), proposal("2", 10, 100)];
        let uc = use_case(21);
        assert_eq!(
            uc.evaluate_by_id(&proposals, "2").unwrap().status,
            ProposalStatus::Defeated
        );
        let err = EvaluateProposalsUseCase::find(&proposals, "3").unwrap_err();
        assert_eq!(err, ProposalError::NotFound("3".to_string()));
        assert_eq!(err.code(), "PROPOSAL_NOT_FOUND");
    }

    #[test]
    fn test_refresh_produces_new_proposal() {
        let original = proposal("1", 10, 100);
        let refreshed = EvaluateProposalsUseCase::refresh_results(
            &original,
            &json!({ "forVotes": 500, "againstVotes": 100 }),
            None,
        )
        .unwrap();

        assert_eq!(original.results().for_votes, Amount::from(10u64));
        assert_eq!(refreshed.results().for_votes, Amount::from(500u64));
        assert_eq!(refreshed.id(), original.id());

        let uc = use_case(21);
        assert_eq!(uc.evaluate(&original).unwrap().status, ProposalStatus::Defeated);
        assert_eq!(uc.evaluate(&refreshed).unwrap().status, ProposalStatus::Succeeded);
    }

    // ==================== Batches ====================

    #[test]
    fn test_batch_reports_failures_per_item() {
        let mut bad = payload("3", 1, 1);
        bad.proposal_type = "RANKED".to_string();
        let payloads = vec![payload("1", 100, 10), bad, payload("2", 10, 100)];

        let logger = Arc::new(RecordingLogger::default());
        let report = use_case(21)
            .with_logger(logger.clone())
            .evaluate_payloads(&ProposalFactory::shared(), &payloads);

        assert_eq!(report.total(), 3);
        assert!(!report.is_clean());
        assert_eq!(report.count_status(ProposalStatus::Succeeded), 1);
        assert_eq!(report.count_status(ProposalStatus::Defeated), 1);
        assert_eq!(report.failures[0].id, "3");
        assert_eq!(report.failures[0].error.code(), "UNKNOWN_PROPOSAL_TYPE");

        let events = logger.events.lock().unwrap();
        let kinds: Vec<&str> = events.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec!["proposal_evaluated", "proposal_failed", "proposal_evaluated"]
        );
        assert_eq!(events[0].1["status"], "SUCCEEDED");
        assert_eq!(events[1].1["code"], "UNKNOWN_PROPOSAL_TYPE");
    }

    #[test]
    fn test_evaluate_all_over_built_proposals() {
        let proposals = [proposal("1", 100, 10), proposal("2", 0, 0)];
        let report = use_case(21).evaluate_all(&proposals);
        assert!(report.is_clean());
        assert_eq!(report.count_status(ProposalStatus::Succeeded), 1);
        // zero votes misses the 50-vote quorum
        assert_eq!(report.count_status(ProposalStatus::Defeated), 1);
    }
}
