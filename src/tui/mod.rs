//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides the clinical intake interface:
//! - Intake form driven by the field schema
//! - Result view with risk gauge and category chart
//! - Advanced analysis panel

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};
