//! Assessment workflow: validates, calls the predictor, stores the outcome.
//!
//! Submission is split around the predictor call so a caller can run that
//! call elsewhere (the TUI uses a worker thread):
//! 1. [`AssessmentWorkflow::begin`] validates and moves the session to `Submitting`
//! 2. [`AssessmentWorkflow::run`] calls the predictor; touches no session state
//! 3. [`AssessmentWorkflow::complete`] applies the outcome if it is still current
//!
//! [`AssessmentWorkflow::submit`] chains all three on the calling thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::session::{AssessmentPhase, PhaseKind, Session, SubmissionTicket};
use crate::domain::{validate, AssessmentResult, ClinicalRecord, FieldViolation};
use crate::ports::{Predictor, PredictorError};

/// Error type for submission attempts that never reach the predictor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid clinical record: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("An assessment is already in progress")]
    InProgress,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A submission that has been admitted and awaits the predictor.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    ticket: SubmissionTicket,
    record: ClinicalRecord,
}

impl PendingSubmission {
    #[must_use]
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    /// Snapshot of the record as it was when the submission began.
    #[must_use]
    pub fn record(&self) -> &ClinicalRecord {
        &self.record
    }
}

/// What the predictor answered for one submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub ticket: SubmissionTicket,
    /// Record the predictor was given
    pub record: ClinicalRecord,
    pub result: Result<AssessmentResult, PredictorError>,
    pub elapsed: Duration,
}

/// Drives sessions through an assessment.
pub struct AssessmentWorkflow<P: Predictor> {
    predictor: Arc<P>,
}

impl<P: Predictor> Clone for AssessmentWorkflow<P> {
    fn clone(&self) -> Self {
        Self {
            predictor: Arc::clone(&self.predictor),
        }
    }
}

impl<P: Predictor> AssessmentWorkflow<P> {
    /// Create a workflow backed by `predictor`.
    pub fn new(predictor: Arc<P>) -> Self {
        Self { predictor }
    }

    #[must_use]
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Admit a submission.
    ///
    /// Clears the previous result or error and closes the advanced panel.
    ///
    /// # Errors
    /// Returns `WorkflowError::InProgress` while another submission is in
    /// flight and `WorkflowError::Validation` when the record fails the
    /// schema. The session is unchanged in both cases.
    pub fn begin(&self, session: &mut Session) -> Result<PendingSubmission, WorkflowError> {
        if session.kind() == PhaseKind::Submitting {
            return Err(WorkflowError::InProgress);
        }

        let violations = validate(session.record());
        if !violations.is_empty() {
            tracing::info!(
                "Submission blocked: {} invalid field(s) in record {}",
                violations.len(),
                session.record().fingerprint()
            );
            return Err(WorkflowError::Validation(violations));
        }

        let ticket = session.start_submission();
        tracing::info!(
            "Assessment #{} submitting (record {})",
            ticket.sequence(),
            session.record().fingerprint()
        );

        Ok(PendingSubmission {
            ticket,
            record: session.record().clone(),
        })
    }

    /// Call the predictor for an admitted submission.
    ///
    /// May block for as long as the predictor does.
    pub fn run(&self, pending: PendingSubmission) -> SubmissionOutcome {
        let started = Instant::now();
        let result = self.predictor.predict(&pending.record);
        let elapsed = started.elapsed();

        tracing::debug!(
            "Assessment #{} predictor returned after {} ms",
            pending.ticket.sequence(),
            elapsed.as_millis()
        );

        SubmissionOutcome {
            ticket: pending.ticket,
            record: pending.record,
            result,
            elapsed,
        }
    }

    /// Apply an outcome to the session.
    ///
    /// # Returns
    /// `false` when the outcome is stale (the session was reset or moved on)
    /// and was discarded.
    pub fn complete(&self, session: &mut Session, outcome: SubmissionOutcome) -> bool {
        if !session.is_current(outcome.ticket) {
            tracing::debug!(
                "Discarding stale outcome for assessment #{}",
                outcome.ticket.sequence()
            );
            return false;
        }

        match outcome.result {
            Ok(result) => {
                let classification = result.classification();
                tracing::info!(
                    "Assessment #{} complete: prediction={:?}, category={}, {} ms",
                    outcome.ticket.sequence(),
                    result.prediction,
                    classification.category,
                    outcome.elapsed.as_millis()
                );
                session.finish(AssessmentPhase::Success {
                    result,
                    record: outcome.record,
                    response_time: Some(outcome.elapsed),
                });
            }
            Err(e) => {
                tracing::warn!("Assessment #{} failed: {}", outcome.ticket.sequence(), e);
                session.finish(AssessmentPhase::Failed {
                    error: e.to_string(),
                });
            }
        }

        true
    }

    /// Validate, predict and apply in one call.
    ///
    /// # Returns
    /// The phase the session ended in (`Success` or `Failed`).
    ///
    /// # Errors
    /// Same as [`AssessmentWorkflow::begin`]; predictor failures are not
    /// errors here but land the session in `Failed`.
    pub fn submit(&self, session: &mut Session) -> Result<PhaseKind, WorkflowError> {
        let pending = self.begin(session)?;
        let outcome = self.run(pending);
        self.complete(session, outcome);
        Ok(session.kind())
    }
}
