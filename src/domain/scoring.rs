//! Weighted-rule scoring of a patient record.
//!
//! The score is an additive sum over an ordered rule table. Each rule carries
//! a score contribution and, for optional labs, a confidence contribution:
//! every corroborating lab that was actually measured raises confidence.

use super::patient::{PatientRecord, ValidationError};

/// Confidence before any optional lab contributes.
pub const BASE_CONFIDENCE: u8 = 90;

/// Upper bound on confidence.
pub const MAX_CONFIDENCE: u8 = 98;

/// Raw score mapped to a risk score of 100.
///
/// Equal to the sum of every score delta in `RULES`, so a record firing
/// every rule normalizes to exactly 100.
pub const NORMALIZATION_DIVISOR: f64 = 15.0;

/// One row of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Stable identifier, used in logs and tests
    pub name: &'static str,
    pub applies: fn(&PatientRecord) -> bool,
    pub score_delta: f64,
    pub confidence_delta: u8,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("score_delta", &self.score_delta)
            .field("confidence_delta", &self.confidence_delta)
            .finish()
    }
}

/// Scoring rules, evaluated in order.
pub static RULES: [Rule; 11] = [
    Rule {
        name: "bilirubin_elevated",
        applies: |r| r.bilirubin > 2.0,
        score_delta: 2.0,
        confidence_delta: 0,
    },
    Rule {
        name: "albumin_low",
        applies: |r| r.albumin < 3.5,
        score_delta: 2.0,
        confidence_delta: 0,
    },
    Rule {
        name: "platelets_low",
        applies: |r| r.platelets < 150,
        score_delta: 1.5,
        confidence_delta: 0,
    },
    Rule {
        name: "alkaline_phosphatase_elevated",
        applies: |r| r.alkaline_phosphatase.is_some_and(|v| v > 200.0),
        score_delta: 1.0,
        confidence_delta: 2,
    },
    Rule {
        name: "sgot_elevated",
        applies: |r| r.sgot.is_some_and(|v| v > 40.0),
        score_delta: 1.0,
        confidence_delta: 2,
    },
    Rule {
        name: "prothrombin_prolonged",
        applies: |r| r.prothrombin.is_some_and(|v| v > 12.0),
        score_delta: 1.5,
        confidence_delta: 2,
    },
    Rule {
        name: "alcohol_history",
        applies: |r| r.history_of_alcohol,
        score_delta: 2.0,
        confidence_delta: 0,
    },
    Rule {
        name: "hepatitis",
        applies: |r| r.hepatitis,
        score_delta: 1.5,
        confidence_delta: 0,
    },
    Rule {
        name: "diabetes",
        applies: |r| r.diabetes,
        score_delta: 1.0,
        confidence_delta: 0,
    },
    Rule {
        name: "age_over_60",
        applies: |r| r.age > 60,
        score_delta: 1.0,
        confidence_delta: 0,
    },
    // Stacks with age_over_60.
    Rule {
        name: "age_over_70",
        applies: |r| r.age > 70,
        score_delta: 0.5,
        confidence_delta: 0,
    },
];

/// Output of the rule evaluation, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScore {
    /// Sum of score deltas of every rule that fired
    pub raw: f64,

    /// `BASE_CONFIDENCE` plus confidence deltas, capped at `MAX_CONFIDENCE`
    pub confidence: u8,

    /// Names of the rules that fired, in table order
    pub triggered: Vec<&'static str>,
}

impl RawScore {
    /// The normalized 0-100 risk score.
    #[must_use]
    pub fn risk_score(&self) -> u8 {
        normalize(self.raw)
    }
}

/// Evaluate the rule table against a record.
///
/// # Errors
/// Returns `ValidationError` if the record holds a non-finite or negative
/// lab value.
pub fn score(record: &PatientRecord) -> Result<RawScore, ValidationError> {
    record.validate()?;

    let mut raw = 0.0;
    let mut confidence_gain: u32 = 0;
    let mut triggered = Vec::new();

    for rule in RULES.iter().filter(|rule| (rule.applies)(record)) {
        raw += rule.score_delta;
        confidence_gain += u32::from(rule.confidence_delta);
        triggered.push(rule.name);
    }

    let confidence = (u32::from(BASE_CONFIDENCE) + confidence_gain).min(u32::from(MAX_CONFIDENCE));

    Ok(RawScore {
        raw,
        // Capped at MAX_CONFIDENCE, fits in u8.
        confidence: confidence as u8,
        triggered,
    })
}

/// Map a raw score onto the 0-100 scale.
#[must_use]
pub fn normalize(raw: f64) -> u8 {
    let scaled = (raw / NORMALIZATION_DIVISOR * 100.0).min(100.0).round();
    scaled.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::Gender;

    fn baseline() -> PatientRecord {
        PatientRecord {
            age: 45,
            gender: Gender::Male,
            bilirubin: 1.0,
            albumin: 4.0,
            platelets: 200,
            copper: None,
            alkaline_phosphatase: None,
            sgot: None,
            prothrombin: None,
            history_of_alcohol: false,
            hepatitis: false,
            diabetes: false,
        }
    }

    fn fires(name: &str, record: &PatientRecord) -> bool {
        let rule = RULES
            .iter()
            .find(|r| r.name == name)
            .expect("Rule should exist");
        (rule.applies)(record)
    }

    #[test]
    fn test_each_rule_in_isolation() {
        let base = baseline();
        for rule in &RULES {
            assert!(!(rule.applies)(&base), "{} fired on baseline", rule.name);
        }

        let cases: Vec<(&str, PatientRecord)> = vec![
            ("bilirubin_elevated", PatientRecord { bilirubin: 2.1, ..baseline() }),
            ("albumin_low", PatientRecord { albumin: 3.4, ..baseline() }),
            ("platelets_low", PatientRecord { platelets: 149, ..baseline() }),
            (
                "alkaline_phosphatase_elevated",
                PatientRecord { alkaline_phosphatase: Some(201.0), ..baseline() },
            ),
            ("sgot_elevated", PatientRecord { sgot: Some(41.0), ..baseline() }),
            ("prothrombin_prolonged", PatientRecord { prothrombin: Some(12.5), ..baseline() }),
            ("alcohol_history", PatientRecord { history_of_alcohol: true, ..baseline() }),
            ("hepatitis", PatientRecord { hepatitis: true, ..baseline() }),
            ("diabetes", PatientRecord { diabetes: true, ..baseline() }),
            ("age_over_60", PatientRecord { age: 61, ..baseline() }),
        ];

        for (name, record) in cases {
            let result = score(&record).expect("Should score");
            assert_eq!(result.triggered, vec![name], "unexpected rules for {name}");
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert!(!fires("bilirubin_elevated", &PatientRecord { bilirubin: 2.0, ..baseline() }));
        assert!(!fires("albumin_low", &PatientRecord { albumin: 3.5, ..baseline() }));
        assert!(!fires("platelets_low", &PatientRecord { platelets: 150, ..baseline() }));
        assert!(!fires(
            "alkaline_phosphatase_elevated",
            &PatientRecord { alkaline_phosphatase: Some(200.0), ..baseline() }
        ));
        assert!(!fires("sgot_elevated", &PatientRecord { sgot: Some(40.0), ..baseline() }));
        assert!(!fires(
            "prothrombin_prolonged",
            &PatientRecord { prothrombin: Some(12.0), ..baseline() }
        ));
        assert!(!fires("age_over_60", &PatientRecord { age: 60, ..baseline() }));
        assert!(!fires("age_over_70", &PatientRecord { age: 70, ..baseline() }));
    }

    #[test]
    fn test_age_rules_stack() {
        let result = score(&PatientRecord { age: 71, ..baseline() }).expect("Should score");
        assert_eq!(result.triggered, vec!["age_over_60", "age_over_70"]);
        assert!((result.raw - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_copper_never_contributes() {
        let result = score(&PatientRecord { copper: Some(500.0), ..baseline() }).expect("Should score");
        assert!(result.triggered.is_empty());
        assert_eq!(result.confidence, BASE_CONFIDENCE);
    }

    #[test]
    fn test_optional_labs_raise_confidence() {
        let record = PatientRecord {
            alkaline_phosphatase: Some(250.0),
            sgot: Some(50.0),
            ..baseline()
        };
        let result = score(&record).expect("Should score");
        assert_eq!(result.confidence, 94);
        assert!((result.raw - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize(0.0), 0);
        assert_eq!(normalize(8.5), 57);
        assert_eq!(normalize(7.5), 50);
        assert_eq!(normalize(15.0), 100);
        assert_eq!(normalize(15.5), 100);
        assert_eq!(normalize(16.0), 100);
    }

    #[test]
    fn test_table_maximum_matches_divisor() {
        let max: f64 = RULES.iter().map(|r| r.score_delta).sum();
        assert!((max - NORMALIZATION_DIVISOR).abs() < f64::EPSILON);
        assert_eq!(normalize(max), 100);
    }

    #[test]
    fn test_confidence_stays_within_bounds() {
        let everything = PatientRecord {
            age: 80,
            bilirubin: 5.0,
            albumin: 2.0,
            platelets: 50,
            alkaline_phosphatase: Some(400.0),
            sgot: Some(90.0),
            prothrombin: Some(20.0),
            history_of_alcohol: true,
            hepatitis: true,
            diabetes: true,
            ..baseline()
        };
        let result = score(&everything).expect("Should score");
        assert_eq!(result.triggered.len(), RULES.len());
        assert!(result.confidence <= MAX_CONFIDENCE);
        assert_eq!(result.risk_score(), 100);
    }

    #[test]
    fn test_invalid_record_rejected() {
        let record = PatientRecord {
            albumin: f64::INFINITY,
            ..baseline()
        };
        let err = score(&record).expect_err("Should reject");
        assert!(err.mentions("albumin"));
    }
}
