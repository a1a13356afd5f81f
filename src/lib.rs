//! # Hepascore
//!
//! Rule-based liver cirrhosis risk assessment.
//!
//! This crate provides:
//! - A deterministic weighted-rule scoring of clinical inputs
//! - Low/Medium/High risk classification and recommendations
//! - An append-only ledger of every assessment, with read models for
//!   dashboards and document export
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types and pure rules (Patient, Assessment, History)
//! - `ports`: Trait definitions for the history ledger
//! - `adapters`: Concrete ledgers (in-memory, SQLite) and log sanitization
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Runtime settings for the command-line front end

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{AssessmentResult, HistoryEntry, PatientInput, PatientRecord, RiskLevel};

/// Result type for Hepascore operations
pub type Result<T> = std::result::Result<T, HepaError>;

/// Main error type for Hepascore
#[derive(Debug, thiserror::Error)]
pub enum HepaError {
    #[error(transparent)]
    Validation(#[from] domain::ValidationError),

    #[error("History entry not found: {0}")]
    NotFound(String),

    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] adapters::LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
