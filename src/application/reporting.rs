//! Reporting service: export and print of a successful assessment.

use std::path::PathBuf;
use std::sync::Arc;

use super::session::Session;
use crate::adapters::ReportError;
use crate::domain::{AssessmentExport, AssessmentResult, ClinicalRecord};
use crate::ports::{ReportContext, ReportSink};
use crate::VitalThrobError;

/// Service writing reports for sessions in `Success`.
pub struct ReportService<S: ReportSink> {
    sink: Arc<S>,
}

impl<S> ReportService<S>
where
    S: ReportSink,
    S::Error: Into<ReportError>,
{
    /// Create a new reporting service.
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Export `{formData, result}` for the session's current result.
    ///
    /// `formData` is the record the result was computed from, even if the
    /// form was edited afterwards.
    ///
    /// # Errors
    /// Returns `VitalThrobError::NoResult` outside `Success`, or the sink's
    /// failure.
    pub fn export(&self, session: &Session) -> Result<PathBuf, VitalThrobError> {
        let (result, record) = assessed(session)?;
        let export = AssessmentExport::new(record.clone(), *result);

        self.sink
            .export(&export)
            .map_err(|e| VitalThrobError::Report(e.into()))
    }

    /// Render the printable report for the session's current result.
    ///
    /// # Errors
    /// Returns `VitalThrobError::NoResult` outside `Success`, or the sink's
    /// failure.
    pub fn print(&self, session: &Session) -> Result<PathBuf, VitalThrobError> {
        let (result, record) = assessed(session)?;
        let context = ReportContext {
            record,
            result,
            response_time: session.response_time(),
        };

        self.sink
            .print(&context)
            .map_err(|e| VitalThrobError::Report(e.into()))
    }
}

fn assessed(session: &Session) -> Result<(&AssessmentResult, &ClinicalRecord), VitalThrobError> {
    session
        .result()
        .zip(session.assessed_record())
        .ok_or(VitalThrobError::NoResult)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::report::{EXPORT_FILE_NAME, REPORT_FILE_NAME};
    use crate::adapters::FileReportSink;
    use crate::application::session::AssessmentPhase;
    use crate::domain::{FieldId, Prediction};
    use std::time::Duration;

    fn successful_session() -> Session {
        let mut session = Session::new();
        session.finish(AssessmentPhase::Success {
            result: AssessmentResult::new(Prediction::Present, 55.0),
            record: ClinicalRecord::default(),
            response_time: Some(Duration::from_millis(12)),
        });
        session
    }

    #[test]
    fn test_export_and_print_in_success() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let service = ReportService::new(Arc::new(FileReportSink::new(dir.path())));
        let session = successful_session();

        let exported = service.export(&session).expect("Should export");
        assert!(exported.ends_with(EXPORT_FILE_NAME));

        let printed = service.print(&session).expect("Should print");
        assert!(printed.ends_with(REPORT_FILE_NAME));
        let text = std::fs::read_to_string(printed).expect("Should read report");
        assert!(text.contains("MODERATE (amber)"));
        assert!(text.contains("Response time:  12 ms"));
    }

    #[test]
    fn test_export_uses_assessed_record_after_edits() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let service = ReportService::new(Arc::new(FileReportSink::new(dir.path())));
        let mut session = successful_session();
        session.update("Age", "41").expect("Should edit after result");

        let path = service.export(&session).expect("Should export");
        let written = std::fs::read_to_string(path).expect("Should read export");
        let json: serde_json::Value = serde_json::from_str(&written).expect("Should parse");
        assert_eq!(json["formData"]["Age"], 65);

        let printed = service.print(&session).expect("Should print");
        let text = std::fs::read_to_string(printed).expect("Should read report");
        let age_label = FieldId::Age.spec().label;
        assert!(text.contains(&format!("  {age_label:<28}65\n")));
        assert!(!text.contains(&format!("  {age_label:<28}41\n")));
    }

    #[test]
    fn test_reports_require_success() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let service = ReportService::new(Arc::new(FileReportSink::new(dir.path())));

        let mut session = Session::new();
        assert!(matches!(
            service.export(&session),
            Err(VitalThrobError::NoResult)
        ));

        session.finish(AssessmentPhase::Failed {
            error: "Server error: Internal Server Error".to_string(),
        });
        assert!(matches!(
            service.print(&session),
            Err(VitalThrobError::NoResult)
        ));
        assert!(!dir.path().join(EXPORT_FILE_NAME).exists());
    }
}
