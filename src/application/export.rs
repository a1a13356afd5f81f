//! Export read model for document renderers.
//!
//! The renderer (PDF or otherwise) lives outside this crate. It receives an
//! `ExportReport`: the current assessment, the history rows and a summary,
//! with feature snapshots materialized (absent labs shown as zero).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AssessmentResult, HistoryEntry, MaterializedFeatures, RiskLevel};

use super::analytics::HistorySummary;

/// The current assessment as printed on a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_description: &'static str,
    pub confidence: u8,
    pub recommendations: Vec<String>,
    pub features: MaterializedFeatures,
    pub timestamp: DateTime<Utc>,
}

impl From<&AssessmentResult> for ExportedAssessment {
    fn from(result: &AssessmentResult) -> Self {
        Self {
            risk_score: result.risk_score,
            risk_level: result.risk_level,
            risk_description: result.risk_level.description(),
            confidence: result.confidence,
            recommendations: result.recommendations.clone(),
            features: result.features.materialized(),
            timestamp: result.timestamp,
        }
    }
}

/// One line of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedHistoryRow {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub age: u32,
    pub gender: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub confidence: u8,
    pub features: MaterializedFeatures,
}

impl From<&HistoryEntry> for ExportedHistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        let result = &entry.prediction_result;
        Self {
            id: entry.id.clone(),
            timestamp: entry.timestamp,
            age: entry.patient_data.age,
            gender: entry.patient_data.gender.to_string(),
            risk_score: result.risk_score,
            risk_level: result.risk_level,
            confidence: result.confidence,
            features: result.features.materialized(),
        }
    }
}

/// One history entry in full, for detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedEntry {
    pub id: String,
    pub age: u32,
    pub gender: String,
    pub assessment: ExportedAssessment,
}

impl From<&HistoryEntry> for ExportedEntry {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            age: entry.patient_data.age,
            gender: entry.patient_data.gender.to_string(),
            assessment: ExportedAssessment::from(&entry.prediction_result),
        }
    }
}

/// A fixed-size slice of history rows, numbered from 1.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage<'a> {
    pub number: usize,
    pub of: usize,
    pub rows: &'a [ExportedHistoryRow],
}

/// The report as serialized, with history rows laid out in pages.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagedReport<'a> {
    generated_at: DateTime<Utc>,
    current: Option<&'a ExportedAssessment>,
    summary: &'a HistorySummary,
    rows_per_page: usize,
    pages: Vec<ReportPage<'a>>,
}

/// Everything a document renderer needs, as one serializable snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub generated_at: DateTime<Utc>,
    pub current: Option<ExportedAssessment>,
    /// Most recent first
    pub history: Vec<ExportedHistoryRow>,
    pub summary: HistorySummary,
}

impl ExportReport {
    /// Build a report. `history` is expected most recent first, as the ledger
    /// lists it.
    #[must_use]
    pub fn build(
        current: Option<&AssessmentResult>,
        history: &[HistoryEntry],
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            current: current.map(ExportedAssessment::from),
            history: history.iter().map(ExportedHistoryRow::from).collect(),
            summary: HistorySummary::from_entries(history),
        }
    }

    /// Split the history rows into pages of `rows_per_page`.
    ///
    /// An empty history still yields one empty page. A size of zero is
    /// treated as one row per page.
    #[must_use]
    pub fn pages(&self, rows_per_page: usize) -> Vec<ReportPage<'_>> {
        let size = rows_per_page.max(1);
        if self.history.is_empty() {
            return vec![ReportPage {
                number: 1,
                of: 1,
                rows: &[],
            }];
        }

        let chunks: Vec<&[ExportedHistoryRow]> = self.history.chunks(size).collect();
        let of = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, rows)| ReportPage {
                number: i + 1,
                of,
                rows,
            })
            .collect()
    }

    /// Serialize the report as pretty-printed JSON, history split into
    /// pages of `rows_per_page`.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json_paged(&self, rows_per_page: usize) -> Result<String, serde_json::Error> {
        let paged = PagedReport {
            generated_at: self.generated_at,
            current: self.current.as_ref(),
            summary: &self.summary,
            rows_per_page: rows_per_page.max(1),
            pages: self.pages(rows_per_page),
        };
        serde_json::to_string_pretty(&paged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{evaluate, Gender, PatientRecord};

    fn entry(sgot: Option<f64>) -> HistoryEntry {
        let record = PatientRecord {
            age: 52,
            gender: Gender::Female,
            bilirubin: 1.8,
            albumin: 3.6,
            platelets: 160,
            copper: None,
            alkaline_phosphatase: None,
            sgot,
            prothrombin: None,
            history_of_alcohol: false,
            hepatitis: true,
            diabetes: false,
        };
        let result = evaluate(&record, Utc::now()).expect("Should evaluate");
        HistoryEntry::new(record, result)
    }

    #[test]
    fn test_report_materializes_absent_labs() {
        let latest = entry(Some(48.0));
        let history = vec![latest.clone(), entry(None)];
        let report = ExportReport::build(Some(&latest.prediction_result), &history, Utc::now());

        let current = report.current.as_ref().expect("Should have current");
        assert!((current.features.sgot - 48.0).abs() < f64::EPSILON);
        assert!(current.features.copper.abs() < f64::EPSILON);
        assert!(report.history[1].features.sgot.abs() < f64::EPSILON);

        // The ledger copy keeps its absent marker.
        assert_eq!(history[1].prediction_result.features.sgot, None);
    }

    #[test]
    fn test_report_rows_follow_history_order() {
        let history = vec![entry(None), entry(Some(10.0)), entry(None)];
        let report = ExportReport::build(None, &history, Utc::now());
        let ids: Vec<&str> = report.history.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<&str> = history.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.history[0].gender, "female");
    }

    #[test]
    fn test_pagination() {
        let history: Vec<HistoryEntry> = (0..5).map(|_| entry(None)).collect();
        let report = ExportReport::build(None, &history, Utc::now());

        let pages = report.pages(2);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].rows.len(), 2);
        assert_eq!(pages[2].rows.len(), 1);
        assert!(pages.iter().all(|p| p.of == 3));
        assert_eq!(pages[2].number, 3);

        let empty = ExportReport::build(None, &[], Utc::now());
        let pages = empty.pages(20);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].rows.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let latest = entry(None);
        let report = ExportReport::build(
            Some(&latest.prediction_result),
            std::slice::from_ref(&latest),
            Utc::now(),
        );
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_paged(20).expect("Should serialize"))
                .expect("Should parse");
        assert_eq!(json["current"]["features"]["copper"], 0.0);
        assert_eq!(json["current"]["riskLevel"], "Low");
        assert_eq!(
            json["current"]["riskDescription"],
            RiskLevel::Low.description()
        );
        assert_eq!(json["pages"][0]["rows"][0]["id"], latest.id.as_str());
        assert_eq!(json["summary"]["total"], 1);
    }

    #[test]
    fn test_json_pages_follow_page_size() {
        let history: Vec<HistoryEntry> = (0..3).map(|_| entry(None)).collect();
        let report = ExportReport::build(None, &history, Utc::now());
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_paged(2).expect("Should serialize"))
                .expect("Should parse");

        assert_eq!(json["rowsPerPage"], 2);
        let pages = json["pages"].as_array().expect("Should have pages");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["number"], 1);
        assert_eq!(pages[0]["of"], 2);
        assert_eq!(pages[0]["rows"].as_array().map(Vec::len), Some(2));
        assert_eq!(pages[1]["rows"][0]["id"], history[2].id.as_str());
        assert!(json["current"].is_null());
    }
}
