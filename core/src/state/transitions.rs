use thiserror::Error;

use super::types::SessionStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
    #[error("Cannot transition from terminal state {state:?}")]
    FromTerminalState { state: SessionStatus },
}

pub struct SessionTransition;

impl SessionTransition {
    /// Validate a status change. Only `Pending` may move, and only to a
    /// terminal status.
    pub fn validate(from: SessionStatus, to: SessionStatus) -> Result<(), TransitionError> {
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        if Self::is_terminal(to) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    pub fn is_terminal(status: SessionStatus) -> bool {
        !matches!(status, SessionStatus::Pending)
    }
}
