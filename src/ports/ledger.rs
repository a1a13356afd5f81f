//! History ledger port: Trait for the append-only assessment history.
//!
//! This trait abstracts the ledger backend (in-memory or SQLite) from the
//! assessment service.

use crate::domain::HistoryEntry;

/// A page of history entries with pagination metadata.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    /// Entries in this page, most recent first
    pub items: Vec<HistoryEntry>,
    /// Total count of all entries
    pub total_count: usize,
    /// Current page offset
    pub offset: usize,
    /// Page size limit
    pub limit: usize,
    /// Whether there are more pages
    pub has_more: bool,
}

impl HistoryPage {
    /// Create a new history page.
    #[must_use]
    pub fn new(items: Vec<HistoryEntry>, total_count: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset.saturating_add(items.len()) < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    /// Get the next page offset.
    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        if self.has_more {
            Some(self.offset.saturating_add(self.limit))
        } else {
            None
        }
    }

    /// Get the previous page offset.
    #[must_use]
    pub fn prev_offset(&self) -> Option<usize> {
        if self.offset > 0 {
            Some(self.offset.saturating_sub(self.limit))
        } else {
            None
        }
    }
}

/// Append-only store of history entries.
///
/// There is no update or delete. Implementations must serialize `append`
/// so concurrent assessments never interleave a partial write.
pub trait HistoryLedger: Send + Sync {
    /// Error type for ledger operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append an entry. Fails if an entry with the same id exists.
    ///
    /// # Errors
    /// Returns error if the backend rejects the write.
    fn append(&self, entry: &HistoryEntry) -> Result<(), Self::Error>;

    /// All entries, most recent first.
    ///
    /// # Errors
    /// Returns error if the backend read fails.
    fn list(&self) -> Result<Vec<HistoryEntry>, Self::Error>;

    /// Look up an entry by id.
    ///
    /// # Returns
    /// `None` if no entry has this id.
    ///
    /// # Errors
    /// Returns error if the backend read fails.
    fn get(&self, id: &str) -> Result<Option<HistoryEntry>, Self::Error>;

    /// Number of entries.
    ///
    /// # Errors
    /// Returns error if the backend read fails.
    fn count(&self) -> Result<usize, Self::Error>;

    /// One page of entries, most recent first.
    ///
    /// # Arguments
    /// * `offset` - Starting position (0-indexed)
    /// * `limit` - Maximum number of items to return
    ///
    /// # Errors
    /// Returns error if the backend read fails.
    fn list_paginated(&self, offset: usize, limit: usize) -> Result<HistoryPage, Self::Error>;
}
