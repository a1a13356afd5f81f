//! Runtime configuration for the command-line front end.
//!
//! The engine itself takes no configuration; these settings only choose
//! where the binary keeps its ledger and its logs.

use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "hepascore";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DB_PATH_ENV: &str = "HEPASCORE_DB_PATH";
const LOG_MODE_ENV: &str = "HEPASCORE_LOG_MODE";
const LOG_FILE_ENV: &str = "HEPASCORE_LOG_FILE";
const EXPORT_PAGE_SIZE_ENV: &str = "HEPASCORE_EXPORT_PAGE_SIZE";

const DEFAULT_DB_PATH: &str = "hepascore.db";
const DEFAULT_LOG_FILE: &str = "hepascore.log";
const DEFAULT_EXPORT_PAGE_SIZE: usize = 20;

/// Sentinel database path selecting a throwaway in-memory ledger.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Where log output goes. Stdout is reserved for command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogMode {
    #[default]
    Stderr,
    /// Append to `HEPASCORE_LOG_FILE`
    File,
}

impl LogMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stderr" => Some(Self::Stderr),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub export_page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            log_mode: LogMode::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            export_page_size: DEFAULT_EXPORT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Read settings from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            db_path: non_blank(DB_PATH_ENV).unwrap_or(defaults.db_path),
            log_mode: non_blank(LOG_MODE_ENV)
                .and_then(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: non_blank(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            export_page_size: non_blank(EXPORT_PAGE_SIZE_ENV)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.export_page_size),
        }
    }

    /// Whether the ledger should live only in memory.
    #[must_use]
    pub fn in_memory_ledger(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }
}
