//! # VitalThrob
//!
//! Clinical intake client for cardiovascular risk assessment.
//!
//! This crate provides:
//! - A validated 13-field clinical record and its editing session
//! - Submission to an external heart disease prediction service
//! - Risk classification, contribution scores and recommendations
//! - Terminal UI and a headless `assess` binary
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (ClinicalRecord, field schema, risk bands)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (reqwest, report files, log sanitizer)
//! - `application`: Session, assessment workflow, reporting
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::{AppConfig, LogMode};
pub use domain::{AssessmentResult, ClinicalRecord, RiskLevel};

/// Result type for VitalThrob operations
pub type Result<T> = std::result::Result<T, VitalThrobError>;

/// Main error type for VitalThrob
#[derive(Debug, thiserror::Error)]
pub enum VitalThrobError {
    #[error("Invalid input: {0}")]
    Record(#[from] application::RecordError),

    #[error("{0}")]
    Workflow(#[from] application::WorkflowError),

    #[error("{0}")]
    Predictor(#[from] ports::PredictorError),

    #[error("Report output failed: {0}")]
    Report(#[from] adapters::ReportError),

    #[error("No successful assessment to report")]
    NoResult,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
