//! History entries: one per successful assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::AssessmentResult;
use super::patient::PatientRecord;

/// Ledger record of a past assessment. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Same instant as `prediction_result.timestamp`
    pub timestamp: DateTime<Utc>,

    pub patient_data: PatientRecord,

    pub prediction_result: AssessmentResult,
}

impl HistoryEntry {
    /// Create an entry with a fresh id.
    #[must_use]
    pub fn new(patient_data: PatientRecord, prediction_result: AssessmentResult) -> Self {
        Self {
            id: uuid_v4(),
            timestamp: prediction_result.timestamp,
            patient_data,
            prediction_result,
        }
    }
}

/// Generate a random UUID v4 string.
///
/// Uses ChaCha20Rng seeded from OS entropy so ids are not predictable.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}
