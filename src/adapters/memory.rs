//! In-memory adapter: Implementation of `HistoryLedger`.
//!
//! Entries live for the lifetime of the process. The vector is kept in
//! insertion order; reads reverse it.

use std::sync::{Mutex, MutexGuard};

use super::LedgerError;
use crate::domain::HistoryEntry;
use crate::ports::{HistoryLedger, HistoryPage};

/// Process-local history ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<HistoryEntry>>, LedgerError> {
        self.entries.lock().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl HistoryLedger for InMemoryLedger {
    type Error = LedgerError;

    fn append(&self, entry: &HistoryEntry) -> Result<(), Self::Error> {
        let mut entries = self.lock()?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(LedgerError::DuplicateId(entry.id.clone()));
        }
        entries.push(entry.clone());
        tracing::debug!("Appended history entry {} ({} total)", entry.id, entries.len());
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryEntry>, Self::Error> {
        let entries = self.lock()?;
        Ok(entries.iter().rev().cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Option<HistoryEntry>, Self::Error> {
        let entries = self.lock()?;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        Ok(self.lock()?.len())
    }

    fn list_paginated(&self, offset: usize, limit: usize) -> Result<HistoryPage, Self::Error> {
        let entries = self.lock()?;
        let items = entries
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(HistoryPage::new(items, entries.len(), offset, limit))
    }
}
