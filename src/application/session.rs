//! Session: the clinical record being edited and the assessment phase.
//!
//! A session is the single owner of its record. Edits go through the field
//! schema and are all-or-nothing; while a submission is in flight the record
//! is frozen so the snapshot sent to the predictor stays authoritative.

use std::time::Duration;

use crate::domain::schema::UnknownField;
use crate::domain::{AssessmentResult, ClinicalRecord, FieldId, FieldValue, FieldViolation};

/// Identifies one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(u64);

impl SubmissionTicket {
    /// Sequence number of the attempt within its session.
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Where the session is in the assessment lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentPhase {
    Idle,
    Submitting {
        ticket: SubmissionTicket,
    },
    Success {
        result: AssessmentResult,
        /// Record as submitted; later edits do not change it
        record: ClinicalRecord,
        response_time: Option<Duration>,
    },
    Failed {
        error: String,
    },
}

/// Data-free view of [`AssessmentPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Idle,
    Submitting,
    Success,
    Failed,
}

impl AssessmentPhase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::Submitting { .. } => PhaseKind::Submitting,
            Self::Success { .. } => PhaseKind::Success,
            Self::Failed { .. } => PhaseKind::Failed,
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Error type for record edits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    UnknownField(#[from] UnknownField),

    #[error(transparent)]
    Invalid(#[from] FieldViolation),

    #[error("An assessment is in progress; the record cannot be edited until it completes")]
    Busy,
}

/// One intake session.
#[derive(Debug, Clone)]
pub struct Session {
    record: ClinicalRecord,
    phase: AssessmentPhase,
    advanced_panel_open: bool,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a session on the default record.
    #[must_use]
    pub fn new() -> Self {
        Self::with_record(ClinicalRecord::default())
    }

    /// Start a session on an imported record.
    ///
    /// The record is not validated here; submission refuses it if it is invalid.
    #[must_use]
    pub fn with_record(record: ClinicalRecord) -> Self {
        Self {
            record,
            phase: AssessmentPhase::Idle,
            advanced_panel_open: false,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn record(&self) -> &ClinicalRecord {
        &self.record
    }

    #[must_use]
    pub fn phase(&self) -> &AssessmentPhase {
        &self.phase
    }

    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Result of the last successful assessment, if the session is in `Success`.
    #[must_use]
    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.phase {
            AssessmentPhase::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Record the current result was computed from.
    #[must_use]
    pub fn assessed_record(&self) -> Option<&ClinicalRecord> {
        match &self.phase {
            AssessmentPhase::Success { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Whether the record was edited after the current result came back.
    #[must_use]
    pub fn has_unassessed_edits(&self) -> bool {
        self.assessed_record()
            .is_some_and(|assessed| assessed != &self.record)
    }

    /// Measured round trip of the last successful assessment.
    #[must_use]
    pub fn response_time(&self) -> Option<Duration> {
        match &self.phase {
            AssessmentPhase::Success { response_time, .. } => *response_time,
            _ => None,
        }
    }

    /// Message of the last failed assessment, if the session is in `Failed`.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match &self.phase {
            AssessmentPhase::Failed { error } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_advanced_panel_open(&self) -> bool {
        self.advanced_panel_open
    }

    /// Edit a field by wire id or snake-case name.
    ///
    /// # Errors
    /// Returns `RecordError::UnknownField` for an unrecognized name, otherwise
    /// as [`Session::update_field`].
    pub fn update(&mut self, name: &str, raw: &str) -> Result<(), RecordError> {
        let field: FieldId = name.parse()?;
        self.update_field(field, raw)
    }

    /// Parse `raw` per the field's kind and store it.
    ///
    /// # Errors
    /// Returns `RecordError::Busy` while submitting and `RecordError::Invalid`
    /// when the value fails the schema. The record is untouched on error.
    pub fn update_field(&mut self, field: FieldId, raw: &str) -> Result<(), RecordError> {
        self.ensure_editable()?;
        let value = field.spec().coerce(raw)?;
        self.record.set(field, value)?;
        Ok(())
    }

    /// Store an already typed value.
    ///
    /// # Errors
    /// Same as [`Session::update_field`].
    pub fn set_value(&mut self, field: FieldId, value: FieldValue) -> Result<(), RecordError> {
        self.ensure_editable()?;
        self.record.set(field, value)?;
        Ok(())
    }

    /// Restore the default record and return to `Idle`.
    ///
    /// Allowed in every phase. An in-flight submission is orphaned: its
    /// completion no longer matches the session and is dropped.
    pub fn reset(&mut self) {
        self.record = ClinicalRecord::default();
        self.phase = AssessmentPhase::Idle;
        self.advanced_panel_open = false;
    }

    /// Show or hide the advanced analysis panel. Only meaningful in `Success`.
    pub fn toggle_advanced_panel(&mut self) {
        if self.kind() == PhaseKind::Success {
            self.advanced_panel_open = !self.advanced_panel_open;
        }
    }

    fn ensure_editable(&self) -> Result<(), RecordError> {
        match self.phase {
            AssessmentPhase::Submitting { .. } => Err(RecordError::Busy),
            _ => Ok(()),
        }
    }

    /// Enter `Submitting`, dropping any previous result or error.
    pub(crate) fn start_submission(&mut self) -> SubmissionTicket {
        self.next_ticket += 1;
        let ticket = SubmissionTicket(self.next_ticket);
        self.phase = AssessmentPhase::Submitting { ticket };
        self.advanced_panel_open = false;
        ticket
    }

    /// Whether `ticket` is the submission currently in flight.
    pub(crate) fn is_current(&self, ticket: SubmissionTicket) -> bool {
        matches!(self.phase, AssessmentPhase::Submitting { ticket: t } if t == ticket)
    }

    pub(crate) fn finish(&mut self, phase: AssessmentPhase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Prediction, Sex};

    #[test]
    fn test_new_session_is_idle_on_default_record() {
        let session = Session::new();
        assert_eq!(session.kind(), PhaseKind::Idle);
        assert_eq!(session.record(), &ClinicalRecord::default());
        assert!(session.result().is_none());
        assert!(session.last_error().is_none());
        assert!(!session.is_advanced_panel_open());
    }

    #[test]
    fn test_update_by_wire_and_snake_name() {
        let mut session = Session::new();
        session.update("Age", "54").expect("Should accept wire id");
        session.update("resting_bp", "132").expect("Should accept snake name");
        session.update("Sex", "female").expect("Should accept alias");
        session
            .update("ST depression", "1.4")
            .expect("Should accept decimal");

        let record = session.record();
        assert_eq!(record.age, 54);
        assert_eq!(record.resting_bp, 132);
        assert_eq!(record.sex, Sex::Female);
        assert!((record.st_depression - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_update_rejects_without_mutation() {
        let mut session = Session::new();
        let before = session.record().clone();

        let err = session.update("BP", "30").expect_err("Should reject");
        assert!(matches!(
            err,
            RecordError::Invalid(FieldViolation {
                field: FieldId::RestingBp,
                ..
            })
        ));

        assert!(session.update("Age", "sixty").is_err());
        assert!(session.update("ST depression", "1.45").is_err());
        assert!(session.update("Thallium", "5").is_err());
        assert_eq!(session.record(), &before);
    }

    #[test]
    fn test_update_unknown_field() {
        let mut session = Session::new();
        let err = session.update("Heart shape", "round").expect_err("Should reject");
        assert!(matches!(err, RecordError::UnknownField(_)));
    }

    #[test]
    fn test_update_while_submitting_is_busy() {
        let mut session = Session::new();
        session.start_submission();

        let err = session.update("Age", "50").expect_err("Should be busy");
        assert_eq!(err, RecordError::Busy);
        assert_eq!(session.record().age, 65);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::new();
        session.update("Age", "40").expect("Should update");
        let assessed = session.record().clone();
        session.finish(AssessmentPhase::Success {
            result: AssessmentResult::new(Prediction::Absent, 12.0),
            record: assessed,
            response_time: None,
        });
        session.toggle_advanced_panel();

        session.reset();
        let once = (session.kind(), session.record().clone());
        session.reset();

        assert_eq!(once, (PhaseKind::Idle, ClinicalRecord::default()));
        assert_eq!(session.kind(), PhaseKind::Idle);
        assert_eq!(session.record(), &ClinicalRecord::default());
        assert!(session.result().is_none());
        assert!(!session.is_advanced_panel_open());
    }

    #[test]
    fn test_edits_after_result_are_tracked() {
        let mut session = Session::new();
        assert!(!session.has_unassessed_edits());

        session.finish(AssessmentPhase::Success {
            result: AssessmentResult::new(Prediction::Present, 85.0),
            record: ClinicalRecord::default(),
            response_time: None,
        });
        assert!(!session.has_unassessed_edits());

        session.update("Age", "50").expect("Should update in success");
        assert!(session.has_unassessed_edits());
        assert_eq!(
            session.assessed_record().map(|r| r.age),
            Some(ClinicalRecord::default().age)
        );

        session.update("Age", "65").expect("Should update in success");
        assert!(!session.has_unassessed_edits());
    }

    #[test]
    fn test_toggle_panel_only_in_success() {
        let mut session = Session::new();
        session.toggle_advanced_panel();
        assert!(!session.is_advanced_panel_open());

        session.finish(AssessmentPhase::Success {
            result: AssessmentResult::new(Prediction::Present, 85.0),
            record: ClinicalRecord::default(),
            response_time: Some(Duration::from_millis(90)),
        });
        session.toggle_advanced_panel();
        assert!(session.is_advanced_panel_open());
        session.toggle_advanced_panel();
        assert!(!session.is_advanced_panel_open());
    }

    #[test]
    fn test_tickets_are_unique_and_reset_orphans_them() {
        let mut session = Session::new();
        let first = session.start_submission();
        assert!(session.is_current(first));

        session.reset();
        assert!(!session.is_current(first));

        let second = session.start_submission();
        assert_ne!(first, second);
        assert!(session.is_current(second));
        assert!(!session.is_current(first));
    }
}
