//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the prediction service
//! - `report`: JSON export and printable report files
//! - `sanitize`: clinical-value filtering for logs

pub mod http;
pub mod report;
pub mod sanitize;

pub use http::{HttpPredictor, ServiceStatus, DEFAULT_BASE_URL};
pub use report::{FileReportSink, ReportError};
