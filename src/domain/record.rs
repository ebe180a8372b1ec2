//! Clinical record for cardiovascular risk assessment.
//!
//! Thirteen features from the UCI heart disease dataset. On the wire the
//! record is a flat JSON object keyed by the clinical labels the prediction
//! service was trained with (see [`FieldId::wire_name`]); coded fields and
//! yes/no flags travel as their numeric codes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use super::schema::{FieldId, FieldValue, FieldViolation, ViolationKind};

/// Declares a clinical code table as an enum with `u8` discriminants.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u8", try_from = "u8")]
        pub enum $name {
            $($variant = $code),+
        }

        impl $name {
            /// Numeric code as used by the dataset.
            #[must_use]
            pub fn code(self) -> u8 {
                self as u8
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(format!(
                        "{} is not a valid {} code",
                        other,
                        stringify!($name)
                    )),
                }
            }
        }
    };
}

coded_enum! {
    /// Biological sex (1 = male, 0 = female).
    Sex { Female = 0, Male = 1 }
}

coded_enum! {
    /// Chest pain presentation.
    ChestPainType {
        TypicalAngina = 1,
        AtypicalAngina = 2,
        NonAnginalPain = 3,
        Asymptomatic = 4,
    }
}

coded_enum! {
    /// Resting electrocardiogram result.
    RestingEkg {
        Normal = 0,
        StTAbnormality = 1,
        LeftVentricularHypertrophy = 2,
    }
}

coded_enum! {
    /// Slope of the peak-exercise ST segment.
    StSlope { Upsloping = 1, Flat = 2, Downsloping = 3 }
}

coded_enum! {
    /// Major vessels colored by fluoroscopy.
    VesselsColored { Zero = 0, One = 1, Two = 2, Three = 3 }
}

coded_enum! {
    /// Thallium stress test result.
    Thallium { Normal = 3, FixedDefect = 6, ReversibleDefect = 7 }
}

/// One patient's clinical inputs.
///
/// `Default` is the documented high-risk example the form opens with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FormData")]
pub struct ClinicalRecord {
    /// Age in years
    #[serde(rename = "Age")]
    pub age: u32,

    #[serde(rename = "Sex")]
    pub sex: Sex,

    #[serde(rename = "Chest pain type")]
    pub chest_pain_type: ChestPainType,

    /// Resting blood pressure in mmHg
    #[serde(rename = "BP")]
    pub resting_bp: u32,

    /// Serum cholesterol in mg/dL
    #[serde(rename = "Cholesterol")]
    pub cholesterol: u32,

    /// Fasting blood sugar above 120 mg/dL
    #[serde(rename = "FBS over 120", serialize_with = "serialize_flag")]
    pub fasting_blood_sugar_high: bool,

    #[serde(rename = "EKG results")]
    pub resting_ekg: RestingEkg,

    /// Maximum heart rate achieved, bpm
    #[serde(rename = "Max HR")]
    pub max_heart_rate: u32,

    #[serde(rename = "Exercise angina", serialize_with = "serialize_flag")]
    pub exercise_angina: bool,

    /// ST depression induced by exercise relative to rest
    #[serde(rename = "ST depression")]
    pub st_depression: f64,

    #[serde(rename = "Slope of ST")]
    pub st_slope: StSlope,

    #[serde(rename = "Number of vessels fluro")]
    pub vessels_colored: VesselsColored,

    #[serde(rename = "Thallium")]
    pub thallium: Thallium,
}

impl Default for ClinicalRecord {
    fn default() -> Self {
        Self {
            age: 65,
            sex: Sex::Male,
            chest_pain_type: ChestPainType::Asymptomatic,
            resting_bp: 180,
            cholesterol: 300,
            fasting_blood_sugar_high: true,
            resting_ekg: RestingEkg::LeftVentricularHypertrophy,
            max_heart_rate: 120,
            exercise_angina: true,
            st_depression: 4.5,
            st_slope: StSlope::Downsloping,
            vessels_colored: VesselsColored::Three,
            thallium: Thallium::ReversibleDefect,
        }
    }
}

impl ClinicalRecord {
    /// Read a field as a typed value.
    #[must_use]
    pub fn get(&self, field: FieldId) -> FieldValue {
        match field {
            FieldId::Age => FieldValue::Integer(i64::from(self.age)),
            FieldId::Sex => FieldValue::Code(self.sex.code()),
            FieldId::ChestPainType => FieldValue::Code(self.chest_pain_type.code()),
            FieldId::RestingBp => FieldValue::Integer(i64::from(self.resting_bp)),
            FieldId::Cholesterol => FieldValue::Integer(i64::from(self.cholesterol)),
            FieldId::FastingBloodSugar => FieldValue::Code(u8::from(self.fasting_blood_sugar_high)),
            FieldId::RestingEkg => FieldValue::Code(self.resting_ekg.code()),
            FieldId::MaxHeartRate => FieldValue::Integer(i64::from(self.max_heart_rate)),
            FieldId::ExerciseAngina => FieldValue::Code(u8::from(self.exercise_angina)),
            FieldId::StDepression => FieldValue::Decimal(self.st_depression),
            FieldId::StSlope => FieldValue::Code(self.st_slope.code()),
            FieldId::VesselsColored => FieldValue::Code(self.vessels_colored.code()),
            FieldId::Thallium => FieldValue::Code(self.thallium.code()),
        }
    }

    /// Write a field after checking it against the schema.
    ///
    /// The record is left untouched when the value is refused.
    ///
    /// # Errors
    /// Returns the schema violation for out-of-domain or wrongly typed values.
    pub fn set(&mut self, field: FieldId, value: FieldValue) -> Result<(), FieldViolation> {
        field.spec().check(value)?;

        let code_error = |code: u8| FieldViolation {
            field,
            kind: ViolationKind::UnknownCode(code.to_string()),
        };

        match (field, value) {
            // Integer bounds are all positive and were checked above.
            (FieldId::Age, FieldValue::Integer(v)) => self.age = v as u32,
            (FieldId::RestingBp, FieldValue::Integer(v)) => self.resting_bp = v as u32,
            (FieldId::Cholesterol, FieldValue::Integer(v)) => self.cholesterol = v as u32,
            (FieldId::MaxHeartRate, FieldValue::Integer(v)) => self.max_heart_rate = v as u32,
            (FieldId::StDepression, FieldValue::Decimal(v)) => self.st_depression = v,
            (FieldId::Sex, FieldValue::Code(c)) => {
                self.sex = Sex::try_from(c).map_err(|_| code_error(c))?;
            }
            (FieldId::ChestPainType, FieldValue::Code(c)) => {
                self.chest_pain_type = ChestPainType::try_from(c).map_err(|_| code_error(c))?;
            }
            (FieldId::FastingBloodSugar, FieldValue::Code(c)) => {
                self.fasting_blood_sugar_high = c == 1;
            }
            (FieldId::RestingEkg, FieldValue::Code(c)) => {
                self.resting_ekg = RestingEkg::try_from(c).map_err(|_| code_error(c))?;
            }
            (FieldId::ExerciseAngina, FieldValue::Code(c)) => {
                self.exercise_angina = c == 1;
            }
            (FieldId::StSlope, FieldValue::Code(c)) => {
                self.st_slope = StSlope::try_from(c).map_err(|_| code_error(c))?;
            }
            (FieldId::VesselsColored, FieldValue::Code(c)) => {
                self.vessels_colored = VesselsColored::try_from(c).map_err(|_| code_error(c))?;
            }
            (FieldId::Thallium, FieldValue::Code(c)) => {
                self.thallium = Thallium::try_from(c).map_err(|_| code_error(c))?;
            }
            (field, _) => {
                return Err(FieldViolation {
                    field,
                    kind: ViolationKind::WrongKind { expected: "matching" },
                })
            }
        }

        Ok(())
    }

    /// `(wire name, value)` pairs in schema order.
    #[must_use]
    pub fn wire_pairs(&self) -> Vec<(&'static str, FieldValue)> {
        FieldId::ALL
            .iter()
            .map(|id| (id.wire_name(), self.get(*id)))
            .collect()
    }

    /// Short SHA-256 fingerprint of the record's values.
    ///
    /// Lets log lines correlate submissions without carrying clinical values.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for (name, value) in self.wire_pairs() {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.to_string().as_bytes());
            hasher.update(b";");
        }
        let result = hasher.finalize();

        result[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

/// A single form value as found in JSON: a number, its text, or a boolean.
///
/// Exports from the web client store edited values as strings, so both
/// shapes are accepted and funnelled through the schema parser.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl WireValue {
    fn into_text(self) -> String {
        match self {
            Self::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s,
            Self::Flag(b) => u8::from(b).to_string(),
        }
    }
}

/// Raw `formData` object keyed by wire name.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, WireValue>);

/// Why a `formData` object could not become a record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordImportError {
    #[error("missing field '{0}'")]
    Missing(&'static str),

    #[error("{0}")]
    Invalid(#[from] FieldViolation),
}

impl TryFrom<FormData> for ClinicalRecord {
    type Error = RecordImportError;

    fn try_from(mut form: FormData) -> Result<Self, Self::Error> {
        let mut record = ClinicalRecord::default();
        for id in FieldId::ALL {
            let raw = form
                .0
                .remove(id.wire_name())
                .ok_or(RecordImportError::Missing(id.wire_name()))?;
            let value = id.spec().parse(&raw.into_text())?;
            record.set(id, value)?;
        }
        Ok(record)
    }
}
