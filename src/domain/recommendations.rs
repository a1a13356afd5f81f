//! Recommendation text for an assessment.
//!
//! Output is the fixed baseline block for the risk level followed by the
//! conditional entries that apply to the record, in table order.

use super::assessment::RiskLevel;
use super::patient::PatientRecord;

pub const HIGH_RISK_BASELINE: [&str; 5] = [
    "Immediate medical consultation recommended",
    "Regular liver function monitoring required",
    "Consider liver biopsy and advanced imaging (MRI/CT)",
    "Screen for hepatocellular carcinoma every 6 months",
    "Implement strict alcohol cessation program",
];

pub const MEDIUM_RISK_BASELINE: [&str; 5] = [
    "Schedule follow-up appointment within 3 months",
    "Consider lifestyle modifications",
    "Repeat liver function tests in 3 months",
    "Consider hepatology consultation",
    "Monitor for symptom development",
];

pub const LOW_RISK_BASELINE: [&str; 5] = [
    "Continue regular health maintenance",
    "Annual liver function assessment recommended",
    "Maintain healthy lifestyle habits",
    "Monitor for any symptom changes",
    "Follow up in 12 months",
];

/// A recommendation appended when its predicate holds.
pub struct ConditionalRecommendation {
    pub applies: fn(&PatientRecord) -> bool,
    pub text: &'static str,
}

pub static CONDITIONAL_RECOMMENDATIONS: [ConditionalRecommendation; 6] = [
    ConditionalRecommendation {
        applies: |r| r.bilirubin > 2.0,
        text: "High bilirubin levels detected - further testing recommended",
    },
    ConditionalRecommendation {
        applies: |r| r.albumin < 3.5,
        text: "Low albumin levels - dietary consultation recommended",
    },
    ConditionalRecommendation {
        applies: |r| r.platelets < 150,
        text: "Low platelet count - regular monitoring required",
    },
    ConditionalRecommendation {
        applies: |r| r.history_of_alcohol,
        text: "Consider alcohol cessation program",
    },
    ConditionalRecommendation {
        applies: |r| r.hepatitis,
        text: "Follow up with hepatologist for hepatitis management",
    },
    ConditionalRecommendation {
        applies: |r| r.diabetes,
        text: "Ensure proper diabetes management and monitoring",
    },
];

/// Baseline block for a risk level.
#[must_use]
pub fn baseline(level: RiskLevel) -> &'static [&'static str; 5] {
    match level {
        RiskLevel::High => &HIGH_RISK_BASELINE,
        RiskLevel::Medium => &MEDIUM_RISK_BASELINE,
        RiskLevel::Low => &LOW_RISK_BASELINE,
    }
}

/// Build the ordered recommendation list. Never empty.
#[must_use]
pub fn recommend(level: RiskLevel, record: &PatientRecord) -> Vec<String> {
    baseline(level)
        .iter()
        .copied()
        .chain(
            CONDITIONAL_RECOMMENDATIONS
                .iter()
                .filter(|c| (c.applies)(record))
                .map(|c| c.text),
        )
        .map(String::from)
        .collect()
}
