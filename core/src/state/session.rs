use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::location::Location;

use super::transitions::{SessionTransition, TransitionError};
use super::types::SessionStatus;

/// Snapshot of a session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub location: Location,
    pub status: SessionStatus,
    pub cancelled: bool,
    /// Failure message, set when the session settled `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new(location: Location) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            location,
            status: SessionStatus::Pending,
            cancelled: false,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn transition_to(&mut self, status: SessionStatus) -> Result<(), TransitionError> {
        SessionTransition::validate(self.status, status)?;
        self.status = status;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, SessionStatus::Pending)
    }

    pub fn duration_ms(&self) -> u64 {
        let end_time = self.completed_at.unwrap_or_else(Utc::now);
        (end_time - self.created_at).num_milliseconds().max(0) as u64
    }
}

/// Shared handle to one navigation's session.
///
/// The cancellation token exists from construction, so cancelling is legal
/// before any task of the chain has started.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: String,
    started: Instant,
    token: CancellationToken,
    state: Mutex<SessionState>,
}

impl SessionHandle {
    pub fn new(location: Location) -> Self {
        let state = SessionState::new(location);
        Self {
            inner: Arc::new(SessionInner {
                id: state.session_id.clone(),
                started: Instant::now(),
                token: CancellationToken::new(),
                state: Mutex::new(state),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn location(&self) -> Location {
        self.state().location.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state().status
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.started.elapsed()
    }

    pub fn same_as(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Cancel a pending session. Returns `false` if it had already settled.
    pub fn cancel(&self) -> bool {
        {
            let mut state = self.state();
            if state.transition_to(SessionStatus::Cancelled).is_err() {
                return false;
            }
            state.cancelled = true;
        }
        self.inner.token.cancel();
        true
    }

    pub fn finish(&self) -> Result<(), TransitionError> {
        self.state().transition_to(SessionStatus::Finished)
    }

    pub fn fail(&self, error: impl std::fmt::Display) -> Result<(), TransitionError> {
        let mut state = self.state();
        state.transition_to(SessionStatus::Failed)?;
        state.error = Some(error.to_string());
        Ok(())
    }

    pub fn redirect(&self) -> Result<(), TransitionError> {
        self.state().transition_to(SessionStatus::Redirected)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .finish()
    }
}
