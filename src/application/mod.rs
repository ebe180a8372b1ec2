//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the intake session, the assessment workflow and reporting.

mod reporting;
mod session;
mod workflow;

pub use reporting::ReportService;
pub use session::{AssessmentPhase, PhaseKind, RecordError, Session, SubmissionTicket};
pub use workflow::{AssessmentWorkflow, PendingSubmission, SubmissionOutcome, WorkflowError};
