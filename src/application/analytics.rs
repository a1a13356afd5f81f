//! Analytics service: aggregate views over assessment history.
//!
//! Everything here is read from the ledger. Scores are never recomputed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::LedgerError;
use crate::domain::{HistoryEntry, RiskLevel};
use crate::ports::HistoryLedger;
use crate::HepaError;

/// Aggregate statistics for a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    /// Mean risk score, 0.0 when there is no history
    pub average_score: f64,
    /// Mean confidence, 0.0 when there is no history
    pub average_confidence: f64,
    pub latest_assessment: Option<DateTime<Utc>>,
}

impl HistorySummary {
    /// Summarize a list of entries (any order).
    #[must_use]
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        if entries.is_empty() {
            return summary;
        }

        let mut score_sum = 0.0;
        let mut confidence_sum = 0.0;
        for entry in entries {
            let result = &entry.prediction_result;
            match result.risk_level {
                RiskLevel::Low => summary.low += 1,
                RiskLevel::Medium => summary.medium += 1,
                RiskLevel::High => summary.high += 1,
            }
            score_sum += f64::from(result.risk_score);
            confidence_sum += f64::from(result.confidence);
        }

        let n = entries.len() as f64;
        summary.average_score = score_sum / n;
        summary.average_confidence = confidence_sum / n;
        summary.latest_assessment = entries.iter().map(|e| e.timestamp).max();
        summary
    }

    /// Share of assessments at `level`, 0.0 to 1.0.
    #[must_use]
    pub fn share(&self, level: RiskLevel) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        };
        count as f64 / self.total as f64
    }
}

/// One point of the score-over-time chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

/// Service for history aggregates.
pub struct AnalyticsService<L>
where
    L: HistoryLedger,
{
    ledger: Arc<L>,
}

impl<L> AnalyticsService<L>
where
    L: HistoryLedger,
    L::Error: Into<LedgerError>,
{
    /// Create a new analytics service.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>, HepaError> {
        self.ledger
            .list()
            .map_err(|e| HepaError::Ledger(e.into()))
    }

    /// Aggregate statistics over the whole history.
    ///
    /// # Errors
    /// Returns error if the ledger read fails.
    pub fn summary(&self) -> Result<HistorySummary, HepaError> {
        let summary = HistorySummary::from_entries(&self.entries()?);
        tracing::debug!(
            "Summarized {} assessments (low={}, medium={}, high={})",
            summary.total,
            summary.low,
            summary.medium,
            summary.high
        );
        Ok(summary)
    }

    /// Risk scores over time, oldest first.
    ///
    /// # Errors
    /// Returns error if the ledger read fails.
    pub fn score_trend(&self) -> Result<Vec<TrendPoint>, HepaError> {
        Ok(self
            .entries()?
            .into_iter()
            .rev()
            .map(|e| TrendPoint {
                timestamp: e.timestamp,
                risk_score: e.prediction_result.risk_score,
                risk_level: e.prediction_result.risk_level,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLedger;
    use crate::application::AssessmentService;
    use crate::domain::{Gender, PatientRecord};

    fn record(bilirubin: f64, albumin: f64, platelets: u32, alcohol: bool) -> PatientRecord {
        PatientRecord {
            age: 65,
            gender: Gender::Female,
            bilirubin,
            albumin,
            platelets,
            copper: None,
            alkaline_phosphatase: None,
            sgot: None,
            prothrombin: None,
            history_of_alcohol: alcohol,
            hepatitis: false,
            diabetes: false,
        }
    }

    fn create_test_services() -> (
        AssessmentService<InMemoryLedger>,
        AnalyticsService<InMemoryLedger>,
    ) {
        let ledger = Arc::new(InMemoryLedger::new());
        (
            AssessmentService::new(ledger.clone()),
            AnalyticsService::new(ledger),
        )
    }

    #[test]
    fn test_empty_summary() {
        let (_, analytics) = create_test_services();
        let summary = analytics.summary().expect("Should summarize");
        assert_eq!(summary, HistorySummary::default());
        assert!(summary.share(RiskLevel::High).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_counts_levels() {
        let (service, analytics) = create_test_services();
        // score 7 (age only) -> Low
        service.assess(&record(1.0, 4.0, 200, false)).expect("Should assess");
        // score 57 -> Medium
        service.assess(&record(2.5, 3.0, 100, true)).expect("Should assess");
        // score 57 -> Medium
        service.assess(&record(2.5, 3.0, 100, true)).expect("Should assess");

        let summary = analytics.summary().expect("Should summarize");
        assert_eq!(summary.total, 3);
        assert_eq!((summary.low, summary.medium, summary.high), (1, 2, 0));
        assert!((summary.average_score - (7.0 + 57.0 + 57.0) / 3.0).abs() < 1e-9);
        assert!((summary.average_confidence - 90.0).abs() < f64::EPSILON);
        assert!((summary.share(RiskLevel::Medium) - 2.0 / 3.0).abs() < 1e-9);
        assert!(summary.latest_assessment.is_some());
    }

    #[test]
    fn test_trend_is_oldest_first() {
        let (service, analytics) = create_test_services();
        service.assess(&record(2.5, 3.0, 100, true)).expect("Should assess");
        service.assess(&record(1.0, 4.0, 200, false)).expect("Should assess");

        let trend = analytics.score_trend().expect("Should build trend");
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].risk_score, 57);
        assert_eq!(trend[1].risk_score, 7);
        assert!(trend[0].timestamp <= trend[1].timestamp);
    }
}
