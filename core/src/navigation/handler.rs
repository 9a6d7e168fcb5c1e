use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::dispatch::Dispatcher;
use crate::error::PreloadError;
use crate::location::Location;

/// Lets an [`ErrorHandler`] turn a failure into a redirect.
#[derive(Clone, Default)]
pub struct Redirector {
    target: Arc<Mutex<Option<Location>>>,
}

impl Redirector {
    pub fn redirect(&self, location: impl Into<Location>) {
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(location.into());
    }

    pub fn target(&self) -> Option<Location> {
        self.target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Arguments passed to a custom error handler.
pub struct ErrorContext {
    /// Matched route pattern.
    pub path: String,
    pub url: String,
    pub redirect: Redirector,
    pub dispatch: Arc<dyn Dispatcher>,
    pub server: bool,
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorContext")
            .field("path", &self.path)
            .field("url", &self.url)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

/// Application hook for preload failures.
///
/// On the server the handler must either call [`Redirector::redirect`] or
/// return an error (rethrow). Returning `Ok(())` without redirecting is a
/// [`PreloadError::HandlerContractViolation`] there; on the client it
/// settles the navigation as failed.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn handle(&self, error: PreloadError, ctx: ErrorContext) -> Result<(), PreloadError>;
}
