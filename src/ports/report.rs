//! Report sink port: Trait for exporting and printing assessments.
//!
//! Sinks only read the record and result; they never feed back into the
//! session.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{AssessmentExport, AssessmentResult, ClinicalRecord};

/// Everything a printed report shows about one successful assessment.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub record: &'a ClinicalRecord,
    pub result: &'a AssessmentResult,
    /// Round trip to the prediction service, if measured
    pub response_time: Option<Duration>,
}

/// Trait for assessment output sinks.
pub trait ReportSink: Send + Sync {
    /// Error type for sink operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write the `{formData, result}` artifact.
    ///
    /// # Returns
    /// Location of the written artifact.
    ///
    /// # Errors
    /// Returns error if serialization or writing fails.
    fn export(&self, export: &AssessmentExport) -> Result<PathBuf, Self::Error>;

    /// Render a human-readable report for printing.
    ///
    /// # Returns
    /// Location of the rendered report.
    ///
    /// # Errors
    /// Returns error if writing fails.
    fn print(&self, report: &ReportContext<'_>) -> Result<PathBuf, Self::Error>;
}
