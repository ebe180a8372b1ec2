//! Field schema: the single source of truth for every clinical input.
//!
//! Each field carries its wire identifier (the clinical label the prediction
//! service expects as a JSON key), a display label, and its value domain.
//! The form renders controls from [`list_fields`] and the assessment workflow
//! calls [`validate`] before anything leaves the client.

use std::fmt;
use std::str::FromStr;

use super::record::ClinicalRecord;

/// Tolerance used when checking decimal values against their step.
const STEP_TOLERANCE: f64 = 1e-6;

/// Identifier of one clinical input, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Age,
    Sex,
    ChestPainType,
    RestingBp,
    Cholesterol,
    FastingBloodSugar,
    RestingEkg,
    MaxHeartRate,
    ExerciseAngina,
    StDepression,
    StSlope,
    VesselsColored,
    Thallium,
}

impl FieldId {
    /// All fields in the order the prediction service lists its features.
    pub const ALL: [FieldId; 13] = [
        FieldId::Age,
        FieldId::Sex,
        FieldId::ChestPainType,
        FieldId::RestingBp,
        FieldId::Cholesterol,
        FieldId::FastingBloodSugar,
        FieldId::RestingEkg,
        FieldId::MaxHeartRate,
        FieldId::ExerciseAngina,
        FieldId::StDepression,
        FieldId::StSlope,
        FieldId::VesselsColored,
        FieldId::Thallium,
    ];

    /// JSON key used by the prediction service.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::ChestPainType => "Chest pain type",
            Self::RestingBp => "BP",
            Self::Cholesterol => "Cholesterol",
            Self::FastingBloodSugar => "FBS over 120",
            Self::RestingEkg => "EKG results",
            Self::MaxHeartRate => "Max HR",
            Self::ExerciseAngina => "Exercise angina",
            Self::StDepression => "ST depression",
            Self::StSlope => "Slope of ST",
            Self::VesselsColored => "Number of vessels fluro",
            Self::Thallium => "Thallium",
        }
    }

    /// Snake-case name, accepted as an alternative to the wire name.
    #[must_use]
    pub fn snake_name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::ChestPainType => "chest_pain_type",
            Self::RestingBp => "resting_bp",
            Self::Cholesterol => "cholesterol",
            Self::FastingBloodSugar => "fasting_blood_sugar_high",
            Self::RestingEkg => "resting_ekg",
            Self::MaxHeartRate => "max_heart_rate",
            Self::ExerciseAngina => "exercise_angina",
            Self::StDepression => "st_depression",
            Self::StSlope => "st_slope",
            Self::VesselsColored => "vessels_colored",
            Self::Thallium => "thallium",
        }
    }

    /// Schema entry for this field.
    #[must_use]
    pub fn spec(self) -> &'static FieldSpec {
        // FIELDS is laid out in `ALL` order.
        &FIELDS[self as usize]
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().label)
    }
}

impl FromStr for FieldId {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.wire_name() == name || id.snake_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownField(name.to_string()))
    }
}

/// A field name that matches no schema entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field: {0}")]
pub struct UnknownField(pub String);

/// Value domain of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole number within `[min, max]`.
    Integer { min: i64, max: i64 },
    /// Decimal within `[min, max]` on a `step` grid anchored at `min`.
    Decimal { min: f64, max: f64, step: f64 },
    /// One of an enumerated set of `(code, label)` pairs.
    Coded { codes: &'static [(u8, &'static str)] },
}

/// Description of one clinical input.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub id: FieldId,
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
}

/// A typed field value after parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Code(u8),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v:.1}"),
            Self::Code(v) => write!(f, "{v}"),
        }
    }
}

/// Why a field value was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViolationKind {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a whole number")]
    NotAWholeNumber(String),

    #[error("value {value} must be between {min} and {max}")]
    OutOfRange { value: String, min: String, max: String },

    #[error("value {value} must be a multiple of {step}")]
    OffStep { value: String, step: f64 },

    #[error("'{0}' is not one of the allowed codes")]
    UnknownCode(String),

    #[error("expected a {expected} value")]
    WrongKind { expected: &'static str },
}

/// A single field failing the schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {kind}")]
pub struct FieldViolation {
    pub field: FieldId,
    pub kind: ViolationKind,
}

const SEX_CODES: &[(u8, &str)] = &[(1, "Male"), (0, "Female")];
const CHEST_PAIN_CODES: &[(u8, &str)] = &[
    (1, "Typical angina"),
    (2, "Atypical angina"),
    (3, "Non-anginal pain"),
    (4, "Asymptomatic"),
];
const YES_NO_CODES: &[(u8, &str)] = &[(0, "No"), (1, "Yes")];
const EKG_CODES: &[(u8, &str)] = &[
    (0, "Normal"),
    (1, "ST-T wave abnormality"),
    (2, "Left ventricular hypertrophy"),
];
const SLOPE_CODES: &[(u8, &str)] = &[(1, "Upsloping"), (2, "Flat"), (3, "Downsloping")];
const VESSEL_CODES: &[(u8, &str)] = &[
    (0, "None"),
    (1, "One vessel"),
    (2, "Two vessels"),
    (3, "Three vessels"),
];
const THALLIUM_CODES: &[(u8, &str)] = &[(3, "Normal"), (6, "Fixed defect"), (7, "Reversible defect")];

/// Static field table, indexed by `FieldId as usize`.
static FIELDS: [FieldSpec; 13] = [
    FieldSpec {
        id: FieldId::Age,
        label: "Age",
        hint: "years (20-100)",
        kind: FieldKind::Integer { min: 20, max: 100 },
    },
    FieldSpec {
        id: FieldId::Sex,
        label: "Sex",
        hint: "male / female",
        kind: FieldKind::Coded { codes: SEX_CODES },
    },
    FieldSpec {
        id: FieldId::ChestPainType,
        label: "Chest Pain Type",
        hint: "1-4 (4 = asymptomatic)",
        kind: FieldKind::Coded { codes: CHEST_PAIN_CODES },
    },
    FieldSpec {
        id: FieldId::RestingBp,
        label: "Resting BP",
        hint: "mmHg (80-250)",
        kind: FieldKind::Integer { min: 80, max: 250 },
    },
    FieldSpec {
        id: FieldId::Cholesterol,
        label: "Serum Cholesterol",
        hint: "mg/dL (100-400)",
        kind: FieldKind::Integer { min: 100, max: 400 },
    },
    FieldSpec {
        id: FieldId::FastingBloodSugar,
        label: "Fasting Blood Sugar > 120",
        hint: "no / yes",
        kind: FieldKind::Coded { codes: YES_NO_CODES },
    },
    FieldSpec {
        id: FieldId::RestingEkg,
        label: "Resting EKG",
        hint: "0-2",
        kind: FieldKind::Coded { codes: EKG_CODES },
    },
    FieldSpec {
        id: FieldId::MaxHeartRate,
        label: "Max Heart Rate",
        hint: "bpm (60-220)",
        kind: FieldKind::Integer { min: 60, max: 220 },
    },
    FieldSpec {
        id: FieldId::ExerciseAngina,
        label: "Exercise Angina",
        hint: "no / yes",
        kind: FieldKind::Coded { codes: YES_NO_CODES },
    },
    FieldSpec {
        id: FieldId::StDepression,
        label: "ST Depression",
        hint: "mm (0.0-6.0)",
        kind: FieldKind::Decimal {
            min: 0.0,
            max: 6.0,
            step: 0.1,
        },
    },
    FieldSpec {
        id: FieldId::StSlope,
        label: "Slope of ST",
        hint: "1-3 (3 = downsloping)",
        kind: FieldKind::Coded { codes: SLOPE_CODES },
    },
    FieldSpec {
        id: FieldId::VesselsColored,
        label: "Fluoroscopy Vessels",
        hint: "0-3",
        kind: FieldKind::Coded { codes: VESSEL_CODES },
    },
    FieldSpec {
        id: FieldId::Thallium,
        label: "Thallium Stress Test",
        hint: "3 / 6 / 7",
        kind: FieldKind::Coded { codes: THALLIUM_CODES },
    },
];

/// Every field, in form order.
#[must_use]
pub fn list_fields() -> &'static [FieldSpec] {
    &FIELDS
}

/// Check a record against the schema.
///
/// Returns one violation per non-compliant field, in form order; an empty
/// vector means the record may be submitted.
#[must_use]
pub fn validate(record: &ClinicalRecord) -> Vec<FieldViolation> {
    FIELDS
        .iter()
        .filter_map(|spec| spec.check(record.get(spec.id)).err())
        .collect()
}

impl FieldSpec {
    /// Parse raw user input into a typed value for this field.
    ///
    /// Only the value's shape is checked here; bounds are enforced by [`FieldSpec::check`].
    ///
    /// # Errors
    /// Returns a violation when the text does not parse as this field's kind.
    pub fn parse(&self, raw: &str) -> Result<FieldValue, FieldViolation> {
        let text = raw.trim();
        let kind = match self.kind {
            FieldKind::Integer { .. } => match text.parse::<i64>() {
                Ok(v) => return Ok(FieldValue::Integer(v)),
                Err(_) if text.parse::<f64>().is_ok() => {
                    ViolationKind::NotAWholeNumber(text.to_string())
                }
                Err(_) => ViolationKind::NotANumber(text.to_string()),
            },
            FieldKind::Decimal { .. } => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => return Ok(FieldValue::Decimal(v)),
                _ => ViolationKind::NotANumber(text.to_string()),
            },
            FieldKind::Coded { codes } => match resolve_code(self.id, codes, text) {
                Some(code) => return Ok(FieldValue::Code(code)),
                None => ViolationKind::UnknownCode(text.to_string()),
            },
        };

        Err(FieldViolation { field: self.id, kind })
    }

    /// Check a typed value against this field's domain.
    ///
    /// # Errors
    /// Returns a violation for out-of-range numbers, off-step decimals,
    /// undeclared codes, or a value of the wrong kind.
    pub fn check(&self, value: FieldValue) -> Result<(), FieldViolation> {
        let violation = |kind| FieldViolation { field: self.id, kind };

        match (self.kind, value) {
            (FieldKind::Integer { min, max }, FieldValue::Integer(v)) => {
                if v < min || v > max {
                    return Err(violation(ViolationKind::OutOfRange {
                        value: v.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    }));
                }
                Ok(())
            }
            (FieldKind::Decimal { min, max, step }, FieldValue::Decimal(v)) => {
                if !v.is_finite() || v < min || v > max {
                    return Err(violation(ViolationKind::OutOfRange {
                        value: v.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    }));
                }
                let steps = (v - min) / step;
                if (steps - steps.round()).abs() > STEP_TOLERANCE {
                    return Err(violation(ViolationKind::OffStep {
                        value: v.to_string(),
                        step,
                    }));
                }
                Ok(())
            }
            (FieldKind::Coded { codes }, FieldValue::Code(c)) => {
                if codes.iter().any(|(code, _)| *code == c) {
                    Ok(())
                } else {
                    Err(violation(ViolationKind::UnknownCode(c.to_string())))
                }
            }
            (kind, _) => Err(violation(ViolationKind::WrongKind {
                expected: match kind {
                    FieldKind::Integer { .. } => "whole-number",
                    FieldKind::Decimal { .. } => "decimal",
                    FieldKind::Coded { .. } => "coded",
                },
            })),
        }
    }

    /// Parse and check in one step.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn coerce(&self, raw: &str) -> Result<FieldValue, FieldViolation> {
        let value = self.parse(raw)?;
        self.check(value)?;
        Ok(value)
    }

    /// Label for a code of a coded field.
    #[must_use]
    pub fn code_label(&self, code: u8) -> Option<&'static str> {
        match self.kind {
            FieldKind::Coded { codes } => codes
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, label)| *label),
            _ => None,
        }
    }

    /// The code following (or preceding) `code` in declaration order, wrapping around.
    #[must_use]
    pub fn cycle_code(&self, code: u8, forward: bool) -> Option<u8> {
        let FieldKind::Coded { codes } = self.kind else {
            return None;
        };
        let pos = codes.iter().position(|(c, _)| *c == code).unwrap_or(0);
        let next = if forward {
            (pos + 1) % codes.len()
        } else if pos == 0 {
            codes.len() - 1
        } else {
            pos - 1
        };
        Some(codes[next].0)
    }
}

/// Resolve coded input: the numeric code, the code's label, or one of the
/// aliases the prediction service understands for binary fields.
fn resolve_code(field: FieldId, codes: &[(u8, &str)], text: &str) -> Option<u8> {
    if let Ok(code) = text.parse::<u8>() {
        return Some(code);
    }

    let lower = text.to_ascii_lowercase();
    if let Some((code, _)) = codes.iter().find(|(_, label)| label.eq_ignore_ascii_case(&lower)) {
        return Some(*code);
    }

    match field {
        FieldId::Sex => match lower.as_str() {
            "male" | "m" => Some(1),
            "female" | "f" => Some(0),
            _ => None,
        },
        FieldId::FastingBloodSugar | FieldId::ExerciseAngina => match lower.as_str() {
            "yes" | "y" | "true" => Some(1),
            "no" | "n" | "false" => Some(0),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_indexed_by_id() {
        for (i, spec) in list_fields().iter().enumerate() {
            assert_eq!(spec.id as usize, i);
            assert_eq!(spec.id.spec().id, spec.id);
        }
        assert_eq!(list_fields().len(), FieldId::ALL.len());
    }

    #[test]
    fn test_field_id_from_wire_and_snake_names() {
        assert_eq!("BP".parse::<FieldId>(), Ok(FieldId::RestingBp));
        assert_eq!("Chest pain type".parse::<FieldId>(), Ok(FieldId::ChestPainType));
        assert_eq!("st_depression".parse::<FieldId>(), Ok(FieldId::StDepression));
        assert!("Blood type".parse::<FieldId>().is_err());
    }

    #[test]
    fn test_parse_integer() {
        let spec = FieldId::RestingBp.spec();
        assert_eq!(spec.parse(" 140 "), Ok(FieldValue::Integer(140)));

        let err = spec.parse("140.5").expect_err("fraction should be refused");
        assert!(matches!(err.kind, ViolationKind::NotAWholeNumber(_)));

        let err = spec.parse("high").expect_err("text should be refused");
        assert!(matches!(err.kind, ViolationKind::NotANumber(_)));
    }

    #[test]
    fn test_check_bounds() {
        let spec = FieldId::RestingBp.spec();
        assert!(spec.check(FieldValue::Integer(80)).is_ok());
        assert!(spec.check(FieldValue::Integer(250)).is_ok());

        let err = spec.check(FieldValue::Integer(30)).expect_err("below minimum");
        assert_eq!(err.field, FieldId::RestingBp);
        assert!(matches!(err.kind, ViolationKind::OutOfRange { .. }));
    }

    #[test]
    fn test_decimal_step() {
        let spec = FieldId::StDepression.spec();
        assert!(spec.coerce("4.5").is_ok());
        assert!(spec.coerce("0.3").is_ok());

        let err = spec.coerce("4.55").expect_err("off the 0.1 grid");
        assert!(matches!(err.kind, ViolationKind::OffStep { .. }));

        assert!(spec.coerce("6.1").is_err());
        assert!(spec.coerce("NaN").is_err());
    }

    #[test]
    fn test_coded_aliases() {
        let sex = FieldId::Sex.spec();
        assert_eq!(sex.coerce("female"), Ok(FieldValue::Code(0)));
        assert_eq!(sex.coerce("M"), Ok(FieldValue::Code(1)));
        assert_eq!(sex.coerce("1"), Ok(FieldValue::Code(1)));

        let angina = FieldId::ExerciseAngina.spec();
        assert_eq!(angina.coerce("Yes"), Ok(FieldValue::Code(1)));
        assert_eq!(angina.coerce("false"), Ok(FieldValue::Code(0)));

        let thallium = FieldId::Thallium.spec();
        assert_eq!(thallium.coerce("Reversible defect"), Ok(FieldValue::Code(7)));
        assert!(thallium.coerce("5").is_err());
        assert!(thallium.coerce("maybe").is_err());
    }

    #[test]
    fn test_wrong_kind_is_refused() {
        let spec = FieldId::Age.spec();
        let err = spec.check(FieldValue::Code(1)).expect_err("code for integer field");
        assert!(matches!(err.kind, ViolationKind::WrongKind { .. }));
    }

    #[test]
    fn test_cycle_code_wraps() {
        let thallium = FieldId::Thallium.spec();
        assert_eq!(thallium.cycle_code(7, true), Some(3));
        assert_eq!(thallium.cycle_code(3, false), Some(7));
        assert_eq!(FieldId::Age.spec().cycle_code(1, true), None);
    }

    #[test]
    fn test_validate_default_record() {
        assert!(validate(&ClinicalRecord::default()).is_empty());
    }

    #[test]
    fn test_validate_reports_each_field() {
        let record = ClinicalRecord {
            age: 10,
            resting_bp: 30,
            st_depression: 7.0,
            ..ClinicalRecord::default()
        };

        let fields: Vec<FieldId> = validate(&record).into_iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![FieldId::Age, FieldId::RestingBp, FieldId::StDepression]
        );
    }

    #[test]
    fn test_violation_display_uses_label() {
        let err = FieldId::RestingBp
            .spec()
            .coerce("30")
            .expect_err("below minimum");
        assert_eq!(err.to_string(), "Resting BP: value 30 must be between 80 and 250");
    }
}
