//! Action sink and the preload-time dispatch wrapper handed to load tasks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PreloadError;
use crate::events::PreloadEvent;
use crate::location::Location;
use crate::runtime::Environment;
use crate::state::SessionHandle;

/// A navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationAction {
    pub location: Location,

    /// First navigation after the runtime booted.
    #[serde(default)]
    pub initial: bool,

    /// Commit the location change once preloading finished.
    #[serde(default = "default_navigate")]
    pub navigate: bool,

    /// This navigation was produced by a redirect.
    #[serde(default)]
    pub redirect: bool,
}

fn default_navigate() -> bool {
    true
}

impl NavigationAction {
    pub fn to(location: impl Into<Location>) -> Self {
        Self {
            location: location.into(),
            initial: false,
            navigate: default_navigate(),
            redirect: false,
        }
    }

    pub fn initial(location: impl Into<Location>) -> Self {
        Self {
            initial: true,
            ..Self::to(location)
        }
    }

    pub fn redirect_to(location: impl Into<Location>) -> Self {
        Self {
            redirect: true,
            ..Self::to(location)
        }
    }

    /// Preload only; do not commit the location change.
    pub fn preload_only(mut self) -> Self {
        self.navigate = false;
        self
    }
}

/// Everything that flows through a [`Dispatcher`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum Action {
    Navigate(NavigationAction),
    /// Preloading is done; the page may switch to this location.
    LocationChanged(Location),
    Preload(PreloadEvent),
    /// Application actions dispatched by load tasks (partial results etc.).
    Custom(serde_json::Value),
}

pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, action: Action);
}

impl<F> Dispatcher for F
where
    F: Fn(Action) + Send + Sync,
{
    fn dispatch(&self, action: Action) {
        self(action)
    }
}

/// Discards every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl Dispatcher for NullDispatcher {
    fn dispatch(&self, _action: Action) {}
}

/// Dispatcher handed to load tasks while their session preloads.
///
/// Navigation actions are intercepted: on the server they become a
/// [`PreloadError::Redirect`] for the task to propagate; on the client they
/// cancel the current session before being forwarded.
#[derive(Clone)]
pub struct PreloadDispatcher {
    inner: Arc<dyn Dispatcher>,
    env: Environment,
    session: SessionHandle,
}

impl PreloadDispatcher {
    pub fn new(inner: Arc<dyn Dispatcher>, env: Environment, session: SessionHandle) -> Self {
        Self {
            inner,
            env,
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn dispatch(&self, action: Action) -> Result<(), PreloadError> {
        match action {
            Action::Navigate(nav) if self.env.is_server() => {
                debug!(
                    session_id = self.session.id(),
                    target = %nav.location,
                    "load task navigated during server preload"
                );
                Err(PreloadError::Redirect(nav.location))
            }
            Action::Navigate(nav) => {
                if self.session.cancel() {
                    debug!(
                        session_id = self.session.id(),
                        target = %nav.location,
                        "load task navigated, cancelling its session"
                    );
                    self.inner
                        .dispatch(Action::Preload(PreloadEvent::superseded(&self.session)));
                }
                self.inner.dispatch(Action::Navigate(nav));
                Ok(())
            }
            other => {
                self.inner.dispatch(other);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for PreloadDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadDispatcher")
            .field("env", &self.env)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
