//! SQLite adapter: Implementation of `HistoryLedger`.
//!
//! Provides local persistence for assessment history.
//!
//! Each entry is one row. Patient data and the assessment result are stored
//! as JSON; score, level and timestamp are also kept as plain columns so the
//! table stays queryable by hand. Insertion order is the `seq` column.
//!
//! The table is append-only at the database level: triggers abort any
//! `UPDATE` or `DELETE`.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`, which serializes appends. A
//! poisoned mutex surfaces as `LedgerError::LockPoisoned`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, ErrorCode};

use super::LedgerError;
use crate::domain::HistoryEntry;
use crate::ports::{HistoryLedger, HistoryPage};

/// SQLite integers are signed; anything past `i64::MAX` is clamped so a huge
/// offset still means "past the end" rather than wrapping negative.
fn to_sql_bound(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// SQLite ledger adapter.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open (or create) a ledger database at the given path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.init_schema()?;
        Ok(ledger)
    }

    /// Create an in-memory SQLite ledger.
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LedgerError> {
        self.conn.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), LedgerError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                timestamp TEXT NOT NULL,
                risk_score INTEGER NOT NULL,
                risk_level TEXT NOT NULL,
                confidence INTEGER NOT NULL,
                patient_data TEXT NOT NULL,
                prediction_result TEXT NOT NULL
            );

            CREATE TRIGGER IF NOT EXISTS history_no_update
                BEFORE UPDATE ON history
                BEGIN SELECT RAISE(ABORT, 'history is append-only'); END;

            CREATE TRIGGER IF NOT EXISTS history_no_delete
                BEFORE DELETE ON history
                BEGIN SELECT RAISE(ABORT, 'history is append-only'); END;
            ",
        )?;

        Ok(())
    }

    /// Decode the JSON columns of a row.
    fn decode(id: &str, patient_json: &str, result_json: &str) -> Result<HistoryEntry, LedgerError> {
        let patient_data = serde_json::from_str(patient_json)
            .map_err(|e| LedgerError::Corrupt(format!("{id}: patient data: {e}")))?;
        let prediction_result: crate::domain::AssessmentResult = serde_json::from_str(result_json)
            .map_err(|e| LedgerError::Corrupt(format!("{id}: result: {e}")))?;

        Ok(HistoryEntry {
            id: id.to_string(),
            timestamp: prediction_result.timestamp,
            patient_data,
            prediction_result,
        })
    }

    fn query_entries(
        conn: &Connection,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let mut stmt = conn.prepare(
            r"
            SELECT id, patient_data, prediction_result
            FROM history
            ORDER BY seq DESC
            LIMIT ?1 OFFSET ?2
            ",
        )?;

        let rows = stmt
            .query_map(params![to_sql_bound(limit), to_sql_bound(offset)], |row| {
                let id: String = row.get(0)?;
                let patient_json: String = row.get(1)?;
                let result_json: String = row.get(2)?;
                Ok((id, patient_json, result_json))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|(id, patient, result)| Self::decode(id, patient, result))
            .collect()
    }

    fn count_rows(conn: &Connection) -> Result<usize, LedgerError> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl HistoryLedger for SqliteLedger {
    type Error = LedgerError;

    fn append(&self, entry: &HistoryEntry) -> Result<(), Self::Error> {
        let patient_json = serde_json::to_string(&entry.patient_data)?;
        let result_json = serde_json::to_string(&entry.prediction_result)?;
        let result = &entry.prediction_result;

        let conn = self.lock()?;
        let inserted = conn.execute(
            r"
            INSERT INTO history (
                id, timestamp, risk_score, risk_level, confidence,
                patient_data, prediction_result
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                entry.id,
                entry.timestamp.to_rfc3339(),
                i64::from(result.risk_score),
                result.risk_level.as_str(),
                i64::from(result.confidence),
                patient_json,
                result_json,
            ],
        );

        match inserted {
            Ok(_) => {
                tracing::debug!("Saved history entry {} to storage", entry.id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(LedgerError::DuplicateId(entry.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<HistoryEntry>, Self::Error> {
        let conn = self.lock()?;
        let total = Self::count_rows(&conn)?;
        Self::query_entries(&conn, total, 0)
    }

    fn get(&self, id: &str) -> Result<Option<HistoryEntry>, Self::Error> {
        let conn = self.lock()?;

        let row = conn.query_row(
            "SELECT patient_data, prediction_result FROM history WHERE id = ?1",
            params![id],
            |row| {
                let patient_json: String = row.get(0)?;
                let result_json: String = row.get(1)?;
                Ok((patient_json, result_json))
            },
        );

        match row {
            Ok((patient_json, result_json)) => Self::decode(id, &patient_json, &result_json).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.lock()?;
        Self::count_rows(&conn)
    }

    fn list_paginated(&self, offset: usize, limit: usize) -> Result<HistoryPage, Self::Error> {
        let conn = self.lock()?;
        let total_count = Self::count_rows(&conn)?;
        let items = Self::query_entries(&conn, limit, offset)?;
        Ok(HistoryPage::new(items, total_count, offset, limit))
    }
}
