//! Assessment result types.
//!
//! Represents the output of one cirrhosis risk assessment: the normalized
//! score, its risk band, the confidence, and the recommendations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patient::{PatientRecord, ValidationError};
use super::recommendations::recommend;
use super::scoring::score;

/// Lowest risk score classified as `High`.
pub const HIGH_RISK_THRESHOLD: u8 = 75;

/// Lowest risk score classified as `Medium`.
pub const MEDIUM_RISK_THRESHOLD: u8 = 50;

/// Risk level classification for liver cirrhosis.
///
/// Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Score below 50
    Low,
    /// Score 50 to 74
    Medium,
    /// Score 75 and above
    High,
}

impl RiskLevel {
    /// Classify a normalized risk score. Band lower bounds are inclusive.
    #[must_use]
    pub fn from_score(risk_score: u8) -> Self {
        if risk_score >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if risk_score >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - routine monitoring",
            Self::Medium => "Medium risk - follow-up within 3 months",
            Self::High => "High risk - immediate consultation advised",
        }
    }

    /// Stable lowercase label, used as the storage encoding.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Lab values that were fed to the rules.
///
/// Optional labs stay `None` when not measured. Use `materialized()` at the
/// presentation boundary where absent values must render as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSnapshot {
    pub bilirubin: f64,
    pub albumin: f64,
    pub platelets: u32,
    pub copper: Option<f64>,
    pub alkaline_phosphatase: Option<f64>,
    pub sgot: Option<f64>,
    pub prothrombin: Option<f64>,
}

impl FeatureSnapshot {
    /// Capture the lab values of a record.
    #[must_use]
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            bilirubin: record.bilirubin,
            albumin: record.albumin,
            platelets: record.platelets,
            copper: record.copper,
            alkaline_phosphatase: record.alkaline_phosphatase,
            sgot: record.sgot,
            prothrombin: record.prothrombin,
        }
    }

    /// Render the snapshot for display/export, absent labs as `0.0`.
    ///
    /// Lossy: a zero here can mean "not measured".
    #[must_use]
    pub fn materialized(&self) -> MaterializedFeatures {
        MaterializedFeatures {
            bilirubin: self.bilirubin,
            albumin: self.albumin,
            platelets: self.platelets,
            copper: self.copper.unwrap_or(0.0),
            alkaline_phosphatase: self.alkaline_phosphatase.unwrap_or(0.0),
            sgot: self.sgot.unwrap_or(0.0),
            prothrombin: self.prothrombin.unwrap_or(0.0),
        }
    }
}

/// Presentation form of `FeatureSnapshot` with every field filled in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedFeatures {
    pub bilirubin: f64,
    pub albumin: f64,
    pub platelets: u32,
    pub copper: f64,
    pub alkaline_phosphatase: f64,
    pub sgot: f64,
    pub prothrombin: f64,
}

/// Complete outcome of one assessment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    /// Normalized score, 0-100
    pub risk_score: u8,

    /// Band of `risk_score`
    pub risk_level: RiskLevel,

    /// Confidence, 0-98
    pub confidence: u8,

    /// Baseline block for the level, then conditional entries
    pub recommendations: Vec<String>,

    pub features: FeatureSnapshot,

    pub timestamp: DateTime<Utc>,
}

impl AssessmentResult {
    /// Whether two results agree on everything except the timestamp.
    #[must_use]
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.risk_score == other.risk_score
            && self.risk_level == other.risk_level
            && self.confidence == other.confidence
            && self.recommendations == other.recommendations
            && self.features == other.features
    }
}

/// Score, classify and build recommendations for a record.
///
/// Pure: no ledger interaction, the timestamp is supplied by the caller.
///
/// # Errors
/// Returns `ValidationError` if the record holds invalid lab values.
pub fn evaluate(
    record: &PatientRecord,
    timestamp: DateTime<Utc>,
) -> Result<AssessmentResult, ValidationError> {
    let raw = score(record)?;
    let risk_score = raw.risk_score();
    let risk_level = RiskLevel::from_score(risk_score);

    Ok(AssessmentResult {
        risk_score,
        risk_level,
        confidence: raw.confidence,
        recommendations: recommend(risk_level, record),
        features: FeatureSnapshot::from_record(record),
        timestamp,
    })
}
