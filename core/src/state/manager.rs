use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::location::Location;

use super::session::SessionHandle;

/// Result of [`SessionManager::begin`].
#[derive(Debug)]
pub struct Supersession {
    pub session: SessionHandle,
    /// The previous session, if it was still pending and has been cancelled.
    pub superseded: Option<SessionHandle>,
}

/// The single active-session slot of one runtime context.
///
/// All operations are synchronous, so installing a session always happens
/// before the caller reaches its first suspension point.
#[derive(Clone, Default)]
pub struct SessionManager {
    active: Arc<Mutex<Option<SessionHandle>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<SessionHandle>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a fresh session for `location`, cancelling a pending predecessor.
    pub fn begin(&self, location: Location) -> Supersession {
        let session = SessionHandle::new(location);
        let previous = self.slot().replace(session.clone());

        let superseded = previous.filter(|prev| prev.cancel());
        if let Some(prev) = &superseded {
            info!(
                superseded = prev.id(),
                session_id = session.id(),
                "navigation superseded a pending preload"
            );
        }

        Supersession {
            session,
            superseded,
        }
    }

    pub fn active(&self) -> Option<SessionHandle> {
        self.slot().clone()
    }

    pub fn is_active(&self, session: &SessionHandle) -> bool {
        self.slot().as_ref().is_some_and(|s| s.same_as(session))
    }

    /// Cancel the active session if it is pending.
    pub fn cancel_active(&self) -> Option<SessionHandle> {
        self.slot().clone().filter(|s| s.cancel())
    }

    /// Clear the slot once `session` has settled, unless a newer one took it.
    pub fn release(&self, session: &SessionHandle) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|s| s.same_as(session)) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionStatus;

    #[test]
    fn test_begin_supersedes_pending_session() {
        let manager = SessionManager::new();

        let first = manager.begin(Location::new("/a"));
        assert!(first.superseded.is_none());
        assert!(manager.is_active(&first.session));

        let second = manager.begin(Location::new("/b"));
        let superseded = second.superseded.expect("first session superseded");
        assert!(superseded.same_as(&first.session));
        assert_eq!(first.session.status(), SessionStatus::Cancelled);
        assert!(manager.is_active(&second.session));
    }

    #[test]
    fn test_settled_predecessor_is_not_superseded() {
        let manager = SessionManager::new();
        let first = manager.begin(Location::new("/a"));
        first.session.finish().unwrap();

        let second = manager.begin(Location::new("/b"));
        assert!(second.superseded.is_none());
        assert_eq!(first.session.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_release_only_clears_own_session() {
        let manager = SessionManager::new();
        let first = manager.begin(Location::new("/a"));
        let second = manager.begin(Location::new("/b"));

        manager.release(&first.session);
        assert!(manager.is_active(&second.session));

        manager.release(&second.session);
        assert!(manager.active().is_none());
    }

    #[test]
    fn test_cancel_active() {
        let manager = SessionManager::new();
        let first = manager.begin(Location::new("/a"));
        let cancelled = manager.cancel_active().expect("pending session cancelled");
        assert!(cancelled.same_as(&first.session));
        assert!(manager.cancel_active().is_none());
    }
}
