//! Domain layer: Core business types and logic.
//!
//! Pure Rust types with no I/O. Everything here is deterministic and
//! validated against the field schema.

mod assessment;
pub mod benchmark;
pub mod contribution;
mod recommendation;
mod record;
mod risk;
pub mod schema;

pub use assessment::{AssessmentExport, AssessmentResult, Prediction};
pub use benchmark::{ModelBenchmark, MODEL_BENCHMARKS, MODEL_CONFIDENCE};
pub use contribution::RiskContributions;
pub use recommendation::recommendations;
pub use record::{
    ChestPainType, ClinicalRecord, FormData, RecordImportError, RestingEkg, Sex, StSlope,
    Thallium, VesselsColored, WireValue,
};
pub use risk::{classify, RiskBand, RiskClassification, RiskColor, RiskLevel, RISK_BANDS};
pub use schema::{list_fields, validate, FieldId, FieldKind, FieldSpec, FieldValue, FieldViolation};
