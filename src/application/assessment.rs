//! Assessment service: the engine's single entry point.
//!
//! This service coordinates:
//! - Input validation
//! - Scoring, classification and recommendations
//! - Timestamping
//! - Appending the outcome to the history ledger

use std::sync::Arc;

use crate::adapters::LedgerError;
use crate::domain::{evaluate, AssessmentResult, HistoryEntry, PatientInput, PatientRecord};
use crate::ports::{HistoryLedger, HistoryPage};
use crate::HepaError;

/// Service for running risk assessments.
///
/// Each successful `assess` call appends exactly one history entry. Any
/// failure, including a rejected ledger write, leaves the ledger untouched
/// and returns no result.
pub struct AssessmentService<L>
where
    L: HistoryLedger,
{
    ledger: Arc<L>,
}

impl<L> Clone for AssessmentService<L>
where
    L: HistoryLedger,
{
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L> AssessmentService<L>
where
    L: HistoryLedger,
    L::Error: Into<LedgerError>,
{
    /// Create a new assessment service.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Validate a form submission, then assess it.
    ///
    /// # Errors
    /// Returns `HepaError::Validation` for bad input, `HepaError::Ledger` if
    /// the history append fails.
    pub fn assess_input(&self, input: PatientInput) -> Result<AssessmentResult, HepaError> {
        let record = input.validate().map_err(|e| {
            tracing::warn!("Rejected patient submission: {} issue(s)", e.issues.len());
            e
        })?;
        self.assess(&record)
    }

    /// Run one assessment and record it in the ledger.
    ///
    /// # Errors
    /// Returns `HepaError::Validation` if the record holds invalid values,
    /// `HepaError::Ledger` if the history append fails.
    pub fn assess(&self, record: &PatientRecord) -> Result<AssessmentResult, HepaError> {
        tracing::debug!("Step 1: Scoring patient record...");
        let result = evaluate(record, chrono::Utc::now())?;

        tracing::debug!("Step 2: Recording assessment in history...");
        let entry = HistoryEntry::new(record.clone(), result.clone());
        self.ledger.append(&entry).map_err(|e| {
            let e: LedgerError = e.into();
            tracing::warn!("Failed to record assessment: {}", e);
            HepaError::Ledger(e)
        })?;

        tracing::info!(
            "Assessment complete: level={}, score={}, confidence={}, entry={}",
            result.risk_level,
            result.risk_score,
            result.confidence,
            entry.id
        );

        Ok(result)
    }

    /// All history entries, most recent first.
    ///
    /// # Errors
    /// Returns error if the ledger read fails.
    pub fn history(&self) -> Result<Vec<HistoryEntry>, HepaError> {
        self.ledger
            .list()
            .map_err(|e| HepaError::Ledger(e.into()))
    }

    /// Look up a history entry by id.
    ///
    /// # Errors
    /// Returns `HepaError::NotFound` if no entry has this id.
    pub fn history_entry(&self, id: &str) -> Result<HistoryEntry, HepaError> {
        self.ledger
            .get(id)
            .map_err(|e| HepaError::Ledger(e.into()))?
            .ok_or_else(|| HepaError::NotFound(id.to_string()))
    }

    /// One page of history, most recent first.
    ///
    /// # Errors
    /// Returns error if the ledger read fails.
    pub fn history_page(&self, offset: usize, limit: usize) -> Result<HistoryPage, HepaError> {
        self.ledger
            .list_paginated(offset, limit)
            .map_err(|e| HepaError::Ledger(e.into()))
    }

    /// Number of recorded assessments.
    ///
    /// # Errors
    /// Returns error if the ledger read fails.
    pub fn history_count(&self) -> Result<usize, HepaError> {
        self.ledger
            .count()
            .map_err(|e| HepaError::Ledger(e.into()))
    }
}
