//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with the ledger port to implement
//! the engine's use cases: assessing, reviewing history, summarizing and
//! exporting.

mod analytics;
mod assessment;
mod export;
mod session;

pub use analytics::{AnalyticsService, HistorySummary, TrendPoint};
pub use assessment::AssessmentService;
pub use export::{
    ExportReport, ExportedAssessment, ExportedEntry, ExportedHistoryRow, ReportPage,
};
pub use session::{AssessmentSession, SessionState};
