//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the assessment engine and the history backend.

mod ledger;

pub use ledger::{HistoryLedger, HistoryPage};
