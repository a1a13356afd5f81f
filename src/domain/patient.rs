//! Patient data types for liver cirrhosis risk assessment.
//!
//! `PatientInput` is what a form collaborator submits (loosely typed, any field
//! may be missing). `PatientInput::validate` turns it into a `PatientRecord`,
//! the immutable, fully typed input of the scoring rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recorded gender of the patient.
///
/// Parsing is lenient: unknown non-blank text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
    /// Free-form value that is none of the above
    Unlisted(String),
}

impl Gender {
    /// Parse a submitted gender value. Blank input resolves to `Other`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            "other" | "" => Self::Other,
            _ => Self::Unlisted(trimmed.to_string()),
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Self::Other
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Other => write!(f, "other"),
            Self::Unlisted(s) => write!(f, "{s}"),
        }
    }
}

/// Validated clinical inputs for a single assessment.
///
/// Optional labs are `None` when not measured; absence never contributes to
/// the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years
    pub age: u32,

    pub gender: Gender,

    /// Total bilirubin in mg/dL
    pub bilirubin: f64,

    /// Serum albumin in g/dL
    pub albumin: f64,

    /// Platelet count, x10^3/uL
    pub platelets: u32,

    /// Urine copper (ug/day)
    #[serde(default)]
    pub copper: Option<f64>,

    /// Alkaline phosphatase (U/L)
    #[serde(default)]
    pub alkaline_phosphatase: Option<f64>,

    /// SGOT / AST (U/L)
    #[serde(default)]
    pub sgot: Option<f64>,

    /// Prothrombin time in seconds
    #[serde(default)]
    pub prothrombin: Option<f64>,

    #[serde(default)]
    pub history_of_alcohol: bool,

    #[serde(default)]
    pub hepatitis: bool,

    #[serde(default)]
    pub diabetes: bool,
}

impl PatientRecord {
    /// Re-check a typed record: every lab value must be finite and non-negative.
    ///
    /// # Errors
    /// Returns a `ValidationError` listing every offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let mandatory = [("bilirubin", self.bilirubin), ("albumin", self.albumin)];
        for (field, value) in mandatory {
            check_lab_value(field, value, &mut issues);
        }

        let optional = [
            ("copper", self.copper),
            ("alkaline_phosphatase", self.alkaline_phosphatase),
            ("sgot", self.sgot),
            ("prothrombin", self.prothrombin),
        ];
        for (field, value) in optional {
            if let Some(v) = value {
                check_lab_value(field, v, &mut issues);
            }
        }

        ValidationError::from_issues(issues)
    }
}

fn check_lab_value(field: &'static str, value: f64, issues: &mut Vec<FieldIssue>) {
    if !value.is_finite() {
        issues.push(FieldIssue::NonNumeric {
            field,
            value: value.to_string(),
        });
    } else if value < 0.0 {
        issues.push(FieldIssue::Negative { field, value });
    }
}

/// A single submitted numeric value: either a JSON number or form text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Raw, unvalidated patient data as submitted by a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientInput {
    #[serde(default)]
    pub age: Option<FieldValue>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub bilirubin: Option<FieldValue>,
    #[serde(default)]
    pub albumin: Option<FieldValue>,
    #[serde(default)]
    pub platelets: Option<FieldValue>,
    #[serde(default)]
    pub copper: Option<FieldValue>,
    #[serde(default)]
    pub alkaline_phosphatase: Option<FieldValue>,
    #[serde(default)]
    pub sgot: Option<FieldValue>,
    #[serde(default)]
    pub prothrombin: Option<FieldValue>,
    #[serde(default)]
    pub history_of_alcohol: bool,
    #[serde(default)]
    pub hepatitis: bool,
    #[serde(default)]
    pub diabetes: bool,
}

impl PatientInput {
    /// Validate the submission and build a `PatientRecord`.
    ///
    /// All fields are checked before failing, so the error carries every
    /// problem at once.
    ///
    /// # Errors
    /// Returns `ValidationError` if a mandatory field is missing, or any value
    /// is non-numeric, negative, or (for age/platelets) not a whole number.
    pub fn validate(self) -> Result<PatientRecord, ValidationError> {
        let mut issues = Vec::new();

        let age = required_whole("age", self.age.as_ref(), &mut issues);
        let bilirubin = required("bilirubin", self.bilirubin.as_ref(), &mut issues);
        let albumin = required("albumin", self.albumin.as_ref(), &mut issues);
        let platelets = required_whole("platelets", self.platelets.as_ref(), &mut issues);

        let copper = optional("copper", self.copper.as_ref(), &mut issues);
        let alkaline_phosphatase = optional(
            "alkaline_phosphatase",
            self.alkaline_phosphatase.as_ref(),
            &mut issues,
        );
        let sgot = optional("sgot", self.sgot.as_ref(), &mut issues);
        let prothrombin = optional("prothrombin", self.prothrombin.as_ref(), &mut issues);

        match (age, bilirubin, albumin, platelets) {
            (Some(age), Some(bilirubin), Some(albumin), Some(platelets)) if issues.is_empty() => {
                Ok(PatientRecord {
                    age,
                    gender: self.gender.as_deref().map(Gender::parse).unwrap_or_default(),
                    bilirubin,
                    albumin,
                    platelets,
                    copper,
                    alkaline_phosphatase,
                    sgot,
                    prothrombin,
                    history_of_alcohol: self.history_of_alcohol,
                    hepatitis: self.hepatitis,
                    diabetes: self.diabetes,
                })
            }
            _ => Err(ValidationError { issues }),
        }
    }
}

/// Outcome of reading one field: blank, a usable number, or a recorded issue.
enum Parsed {
    Blank,
    Value(f64),
    Invalid,
}

fn parse_field(field: &'static str, value: Option<&FieldValue>, issues: &mut Vec<FieldIssue>) -> Parsed {
    let number = match value {
        None => return Parsed::Blank,
        Some(FieldValue::Number(n)) => *n,
        Some(FieldValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Parsed::Blank;
            }
            match trimmed.parse::<f64>() {
                Ok(n) => n,
                Err(_) => {
                    issues.push(FieldIssue::NonNumeric {
                        field,
                        value: trimmed.to_string(),
                    });
                    return Parsed::Invalid;
                }
            }
        }
    };

    if !number.is_finite() {
        issues.push(FieldIssue::NonNumeric {
            field,
            value: number.to_string(),
        });
        return Parsed::Invalid;
    }
    if number < 0.0 {
        issues.push(FieldIssue::Negative { field, value: number });
        return Parsed::Invalid;
    }
    Parsed::Value(number)
}

fn required(field: &'static str, value: Option<&FieldValue>, issues: &mut Vec<FieldIssue>) -> Option<f64> {
    match parse_field(field, value, issues) {
        Parsed::Value(v) => Some(v),
        Parsed::Blank => {
            issues.push(FieldIssue::Missing { field });
            None
        }
        Parsed::Invalid => None,
    }
}

fn required_whole(
    field: &'static str,
    value: Option<&FieldValue>,
    issues: &mut Vec<FieldIssue>,
) -> Option<u32> {
    let v = required(field, value, issues)?;
    if v.fract() != 0.0 || v > f64::from(u32::MAX) {
        issues.push(FieldIssue::NotAWholeNumber { field, value: v });
        return None;
    }
    // Range and integrality were checked above.
    Some(v as u32)
}

fn optional(field: &'static str, value: Option<&FieldValue>, issues: &mut Vec<FieldIssue>) -> Option<f64> {
    match parse_field(field, value, issues) {
        Parsed::Value(v) => Some(v),
        Parsed::Blank | Parsed::Invalid => None,
    }
}

/// One problem found with one submitted field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldIssue {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be numeric, got {value:?}")]
    NonNumeric { field: &'static str, value: String },

    #[error("{field} must be a whole number, got {value}")]
    NotAWholeNumber { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

impl FieldIssue {
    /// Name of the field the issue refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::NonNumeric { field, .. }
            | Self::NotAWholeNumber { field, .. }
            | Self::Negative { field, .. } => field,
        }
    }
}

/// Patient data was rejected. Carries every issue found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid patient data: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    fn from_issues(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }

    /// Whether any issue refers to `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field() == field)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> PatientInput {
        PatientInput {
            age: Some(45u32.into()),
            gender: Some("Female".to_string()),
            bilirubin: Some(1.0_f64.into()),
            albumin: Some("4.0".into()),
            platelets: Some(" 200 ".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_builds_record() {
        let record = complete_input().validate().expect("Should validate");
        assert_eq!(record.age, 45);
        assert_eq!(record.gender, Gender::Female);
        assert!((record.albumin - 4.0).abs() < f64::EPSILON);
        assert_eq!(record.platelets, 200);
        assert!(record.copper.is_none());
        assert!(!record.history_of_alcohol);
    }

    #[test]
    fn test_missing_platelets_rejected() {
        let input = PatientInput {
            platelets: None,
            ..complete_input()
        };
        let err = input.validate().expect_err("Should reject");
        assert_eq!(err.issues, vec![FieldIssue::Missing { field: "platelets" }]);
    }

    #[test]
    fn test_blank_mandatory_field_is_missing() {
        let input = PatientInput {
            bilirubin: Some("   ".into()),
            ..complete_input()
        };
        let err = input.validate().expect_err("Should reject");
        assert!(err.mentions("bilirubin"));
    }

    #[test]
    fn test_all_issues_reported_together() {
        let input = PatientInput {
            age: Some("sixty".into()),
            albumin: Some((-1.0_f64).into()),
            platelets: Some(150.5_f64.into()),
            sgot: Some("n/a".into()),
            ..complete_input()
        };
        let err = input.validate().expect_err("Should reject");
        assert_eq!(err.issues.len(), 4);
        assert!(err.mentions("age"));
        assert!(err.mentions("albumin"));
        assert!(err.mentions("platelets"));
        assert!(err.mentions("sgot"));
        assert!(err.to_string().contains("sgot must be numeric"));
    }

    #[test]
    fn test_blank_optional_lab_is_absent_not_zero() {
        let input = PatientInput {
            prothrombin: Some("".into()),
            alkaline_phosphatase: Some("250".into()),
            ..complete_input()
        };
        let record = input.validate().expect("Should validate");
        assert!(record.prothrombin.is_none());
        assert_eq!(record.alkaline_phosphatase, Some(250.0));
    }

    #[test]
    fn test_gender_parsing_is_lenient() {
        assert_eq!(Gender::parse("M"), Gender::Male);
        assert_eq!(Gender::parse(" female "), Gender::Female);
        assert_eq!(Gender::parse(""), Gender::Other);
        assert_eq!(
            Gender::parse("Non-binary"),
            Gender::Unlisted("Non-binary".to_string())
        );
        let input = PatientInput {
            gender: None,
            ..complete_input()
        };
        assert_eq!(input.validate().expect("Should validate").gender, Gender::Other);
    }

    #[test]
    fn test_input_deserializes_numbers_and_text() {
        let json = r#"{
            "age": 65,
            "gender": "male",
            "bilirubin": "2.5",
            "albumin": 3.0,
            "platelets": 100,
            "sgot": null,
            "history_of_alcohol": true
        }"#;
        let input: PatientInput = serde_json::from_str(json).expect("Should parse");
        let record = input.validate().expect("Should validate");
        assert_eq!(record.age, 65);
        assert!((record.bilirubin - 2.5).abs() < f64::EPSILON);
        assert!(record.sgot.is_none());
        assert!(record.history_of_alcohol);
        assert!(!record.diabetes);
    }

    #[test]
    fn test_record_validate_rejects_nan() {
        let mut record = complete_input().validate().expect("Should validate");
        assert!(record.validate().is_ok());

        record.bilirubin = f64::NAN;
        record.sgot = Some(-3.0);
        let err = record.validate().expect_err("Should reject");
        assert!(err.mentions("bilirubin"));
        assert!(err.mentions("sgot"));
    }
}
