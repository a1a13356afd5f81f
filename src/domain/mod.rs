//! Domain layer: Core business types and logic.
//!
//! Pure types and functions with no I/O. Scoring, classification and
//! recommendations are deterministic for a given `PatientRecord`.

pub mod assessment;
mod history;
mod patient;
pub mod recommendations;
pub mod scoring;

pub use assessment::{
    evaluate, AssessmentResult, FeatureSnapshot, MaterializedFeatures, RiskLevel,
};
pub use history::HistoryEntry;
pub use patient::{FieldIssue, FieldValue, Gender, PatientInput, PatientRecord, ValidationError};
