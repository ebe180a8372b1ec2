//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (prediction service,
//! report output).

mod predictor;
mod report;

pub use predictor::{Predictor, PredictorError};
pub use report::{ReportContext, ReportSink};
