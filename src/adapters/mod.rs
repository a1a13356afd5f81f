//! Adapters layer: Concrete implementations of ports.
//!
//! - `memory`: process-local ledger
//! - `sqlite`: SQLite-backed ledger
//! - `sanitize`: PII filtering for logs

pub mod memory;
pub mod sanitize;
pub mod sqlite;

/// Error type for ledger backends.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History entry already recorded: {0}")]
    DuplicateId(String),

    #[error("Ledger lock poisoned")]
    LockPoisoned,

    #[error("Corrupt ledger row: {0}")]
    Corrupt(String),
}
