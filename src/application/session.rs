//! Request-scoped assessment state.
//!
//! A caller (one form, one request, one user) owns an `AssessmentSession`
//! that remembers its latest result. Nothing here is process-wide, so any
//! number of sessions can share one `AssessmentService`.

use crate::adapters::LedgerError;
use crate::domain::{AssessmentResult, PatientInput};
use crate::ports::HistoryLedger;
use crate::HepaError;

use super::AssessmentService;

/// Where a session stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Nothing assessed yet (or reset)
    #[default]
    Idle,
    /// Holds the latest successful result
    Completed(AssessmentResult),
}

/// Per-caller holder of the current assessment result.
#[derive(Debug, Clone, Default)]
pub struct AssessmentSession {
    state: SessionState,
}

impl AssessmentSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assess a submission and make it the current result.
    ///
    /// On failure the previous state is kept.
    ///
    /// # Errors
    /// Propagates the service error (validation or ledger).
    pub fn submit<L>(
        &mut self,
        service: &AssessmentService<L>,
        input: PatientInput,
    ) -> Result<AssessmentResult, HepaError>
    where
        L: HistoryLedger,
        L::Error: Into<LedgerError>,
    {
        let result = service.assess_input(input)?;
        self.state = SessionState::Completed(result.clone());
        Ok(result)
    }

    /// The current result, if any.
    #[must_use]
    pub fn current(&self) -> Option<&AssessmentResult> {
        match &self.state {
            SessionState::Completed(result) => Some(result),
            SessionState::Idle => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Return to `Idle`. The ledger is not affected.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}
