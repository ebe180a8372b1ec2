//! File adapter: Implementation of ReportSink.
//!
//! Writes the JSON export and the printable plain-text report into a single
//! output directory. File names are fixed so that a new export replaces the
//! previous one, as a browser download would.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::domain::{
    benchmark, contribution, list_fields, recommendations, AssessmentExport, FieldValue,
    RiskContributions, MODEL_BENCHMARKS, MODEL_CONFIDENCE,
};
use crate::ports::{ReportContext, ReportSink};

/// File name of the JSON export.
pub const EXPORT_FILE_NAME: &str = "cardiac-risk-assessment.json";

/// File name of the printable report.
pub const REPORT_FILE_NAME: &str = "cardiac-risk-report.txt";

const BAR_CELLS: usize = 20;

/// Error type for report output.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes reports into a directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    /// Create a sink writing into `dir` (created on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

impl ReportSink for FileReportSink {
    type Error = ReportError;

    fn export(&self, export: &AssessmentExport) -> Result<PathBuf, Self::Error> {
        let json = serde_json::to_string_pretty(export)?;
        let path = self.write(EXPORT_FILE_NAME, &json)?;
        tracing::info!("Exported assessment {} to {:?}", export.id, path);
        Ok(path)
    }

    fn print(&self, report: &ReportContext<'_>) -> Result<PathBuf, Self::Error> {
        let path = self.write(REPORT_FILE_NAME, &render_text_report(report))?;
        tracing::info!("Rendered printable report to {:?}", path);
        Ok(path)
    }
}

/// Render the printable report.
#[must_use]
pub fn render_text_report(report: &ReportContext<'_>) -> String {
    let mut out = String::new();
    // Formatting into a String only fails if a Display impl does.
    if write_report(&mut out, report).is_err() {
        tracing::warn!("Printable report rendering stopped early");
    }
    out
}

fn write_report(out: &mut String, report: &ReportContext<'_>) -> std::fmt::Result {
    let result = report.result;
    let classification = result.classification();

    writeln!(out, "VitalThrob AI - Cardiovascular Risk Assessment")?;
    writeln!(out, "{}", "=".repeat(46))?;
    writeln!(out, "{}", result.prediction.headline())?;
    writeln!(out, "{}", result.prediction.summary())?;
    writeln!(out)?;

    writeln!(out, "Probability:    {:.1}%", result.probability)?;
    writeln!(
        out,
        "Risk level:     {} ({})",
        classification.category, classification.color
    )?;
    writeln!(
        out,
        "Gauge angle:    {:.1} deg",
        classification.gauge_angle_degrees
    )?;
    writeln!(out, "Confidence:     {MODEL_CONFIDENCE:.1}%")?;
    if let Some(elapsed) = report.response_time {
        writeln!(out, "Response time:  {} ms", elapsed.as_millis())?;
    }

    writeln!(out)?;
    writeln!(out, "Clinical inputs")?;
    for spec in list_fields() {
        let shown = match report.record.get(spec.id) {
            FieldValue::Code(code) => match spec.code_label(code) {
                Some(label) => format!("{label} ({code})"),
                None => code.to_string(),
            },
            other => other.to_string(),
        };
        writeln!(out, "  {:<28}{}", spec.label, shown)?;
    }

    writeln!(out)?;
    writeln!(out, "Key risk factors contribution")?;
    let contributions = RiskContributions::from_record(report.record);
    for (label, score) in contributions.labelled() {
        let width = contribution::bar_width(score);
        writeln!(out, "  {:<16}{:>6.1}%  {}", label, score, text_bar(width / 100.0))?;
    }

    writeln!(out)?;
    writeln!(out, "Model performance comparison")?;
    for model in &MODEL_BENCHMARKS {
        let ratio = benchmark::relative_bar(model, &MODEL_BENCHMARKS);
        writeln!(out, "  {:<20}{:>5.1}%  {}", model.name, model.accuracy, text_bar(ratio))?;
    }

    writeln!(out)?;
    writeln!(out, "Clinical recommendations")?;
    for line in recommendations(classification.category) {
        writeln!(out, "  - {line}")?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "DISCLAIMER: This tool provides indicative estimates and does not replace professional medical evaluation."
    )
}

/// Fixed-width `[##..]` bar for a ratio in `[0, 1]`.
fn text_bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * BAR_CELLS as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_CELLS - filled))
}
